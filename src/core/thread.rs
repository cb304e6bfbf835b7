//! Reply chains and album merging.
//!
//! The reconstructor makes one forward pass over the retained messages in
//! source order, keeping only a table from source id to post index. A reply
//! resolves when its parent was already seen and retained; anything else
//! (forward reference, filtered parent, self reference) degrades to a root
//! post. No message is ever dropped and no pointer graph is built, so cycles
//! cannot occur.
//!
//! Contiguous messages sharing an album id become one post: the first member
//! supplies text, author, timestamps and reply target, later members only add
//! their attachment.
//!
//! After the pass, posts are stably sorted by `create_at`, so ties keep source
//! order, and parent/root links are rewritten to the sorted positions.

use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::core::identity::{ResolvedMessage, ResolvedUser};
use crate::core::render::MarkdownRenderer;
use crate::core::timestamp::TimestampNormalizer;
use crate::message::Attachment;

/// One logical post: a single message or a merged album.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadedPost {
    /// Source id of the first member.
    pub source_id: i64,
    /// Source ids of every member, first member included.
    pub members: Vec<i64>,
    pub author: ResolvedUser,
    /// Wall-clock send time as exported.
    pub local_date: NaiveDateTime,
    /// Epoch milliseconds.
    pub create_at: i64,
    /// Epoch milliseconds of the last edit.
    pub edit_at: Option<i64>,
    /// Rendered markdown body.
    pub message: String,
    /// Importable attachments in member order.
    pub attachments: Vec<Attachment>,
    /// Position of the direct parent in the sorted post list.
    pub parent: Option<usize>,
    /// Position of the top of the reply chain in the sorted post list.
    pub root: Option<usize>,
}

impl ThreadedPost {
    /// Returns `true` if this post replies to another retained post.
    pub fn is_reply(&self) -> bool {
        self.parent.is_some()
    }
}

/// Counters collected during reconstruction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThreadStats {
    /// Replies linked to a retained parent.
    pub replies: usize,
    /// Replies whose parent was not found and became root posts.
    pub broken_threads: usize,
    /// Album members folded into an earlier post.
    pub album_members_merged: usize,
}

/// Posts in emission order plus reconstruction counters.
#[derive(Debug, Clone, Default)]
pub struct Threads {
    pub posts: Vec<ThreadedPost>,
    pub stats: ThreadStats,
}

/// Builds [`ThreadedPost`]s from resolved messages.
#[derive(Debug, Clone)]
pub struct ThreadReconstructor<'a> {
    normalizer: TimestampNormalizer,
    renderer: MarkdownRenderer<'a>,
}

impl<'a> ThreadReconstructor<'a> {
    pub fn new(normalizer: TimestampNormalizer, renderer: MarkdownRenderer<'a>) -> Self {
        Self {
            normalizer,
            renderer,
        }
    }

    /// Runs the forward pass, then orders posts by timestamp.
    pub fn reconstruct(&self, messages: &[ResolvedMessage<'_>]) -> Threads {
        let mut posts: Vec<ThreadedPost> = Vec::with_capacity(messages.len());
        let mut by_source: HashMap<i64, usize> = HashMap::new();
        let mut open_album: Option<(i64, usize)> = None;
        let mut stats = ThreadStats::default();

        for resolved in messages {
            let msg = resolved.message;

            match (msg.album_id, open_album) {
                (Some(album), Some((open, at))) if album == open => {
                    let post = &mut posts[at];
                    if let Some(attachment) = msg.importable_attachment() {
                        post.attachments.push(attachment.clone());
                    }
                    if !msg.entities.is_empty() {
                        tracing::debug!(id = msg.id, album, "dropping caption of later album member");
                    }
                    post.members.push(msg.id);
                    by_source.insert(msg.id, at);
                    stats.album_members_merged += 1;
                    continue;
                }
                _ => {}
            }

            let parent = msg.reply_to.and_then(|id| by_source.get(&id).copied());
            match (msg.reply_to, parent) {
                (Some(_), Some(_)) => stats.replies += 1,
                (Some(reply_to), None) => {
                    tracing::debug!(id = msg.id, reply_to, "parent not retained, posting as root");
                    stats.broken_threads += 1;
                }
                (None, _) => {}
            }
            let root = parent.map(|p| posts[p].root.unwrap_or(p));

            let at = posts.len();
            posts.push(ThreadedPost {
                source_id: msg.id,
                members: vec![msg.id],
                author: resolved.author.clone(),
                local_date: msg.date,
                create_at: self.normalizer.epoch_millis(msg.date),
                edit_at: msg.edited.map(|edited| self.normalizer.epoch_millis(edited)),
                message: self.renderer.render_message(msg),
                attachments: msg.importable_attachment().cloned().into_iter().collect(),
                parent,
                root,
            });
            by_source.insert(msg.id, at);
            open_album = msg.album_id.map(|album| (album, at));
        }

        Threads {
            posts: sort_by_timestamp(posts),
            stats,
        }
    }
}

/// Stable sort by `create_at` with links rewritten to the new positions.
fn sort_by_timestamp(posts: Vec<ThreadedPost>) -> Vec<ThreadedPost> {
    let mut order: Vec<usize> = (0..posts.len()).collect();
    order.sort_by_key(|&i| posts[i].create_at);

    let mut new_position = vec![0; posts.len()];
    for (new, &old) in order.iter().enumerate() {
        new_position[old] = new;
    }

    let mut slots: Vec<Option<ThreadedPost>> = posts.into_iter().map(Some).collect();
    order
        .into_iter()
        .filter_map(|old| slots[old].take())
        .map(|mut post| {
            post.parent = post.parent.map(|p| new_position[p]);
            post.root = post.root.map(|r| new_position[r]);
            post
        })
        .collect()
}
