//! Plain-text conversation transcript.
//!
//! A human-readable companion to the archive, handy for checking a conversion
//! before importing it. Posts appear in emission order:
//!
//! ```text
//! [2021-01-01 10:00:05] @bob:
//! > @alice: Which train are you on?
//! The 10:15
//! [PHOTO: ticket.jpg]
//! ```

use std::fs;
use std::path::Path;

use crate::core::thread::ThreadedPost;
use crate::error::Result;

const LEGEND: &str = "\
CONVERSATION LOG LEGEND
----------------------
Message format: [timestamp] @username: message
Reply format: Messages starting with '>' are replies, multiple '>' indicate reply depth
              Example: '>' = direct reply, '>>' = reply to reply
Attachments: Indicated in brackets with type and filename
  [PHOTO: sunset.jpg]
  [VIDEO: meeting_recap.mp4]
  [FILE: report.pdf]
  [VOICE: message.ogg]
----------------------

";

/// Renders the transcript.
pub fn to_conversation_log(posts: &[ThreadedPost]) -> String {
    let mut log = String::from(LEGEND);

    for post in posts {
        log.push_str(&format!(
            "[{}] @{}:\n",
            post.local_date.format("%Y-%m-%d %H:%M:%S"),
            post.author.username
        ));

        if let Some(parent) = post.parent.and_then(|p| posts.get(p)) {
            let first_line = post_text(parent).lines().next().unwrap_or_default().to_string();
            log.push_str(&format!(
                "{} @{}: {first_line}\n",
                ">".repeat(reply_depth(posts, post)),
                parent.author.username
            ));
        }

        log.push_str(&post_text(post));
        log.push_str("\n\n");
    }

    log
}

/// Writes the transcript to `path`.
pub fn write_conversation_log(posts: &[ThreadedPost], path: &Path) -> Result<()> {
    fs::write(path, to_conversation_log(posts))?;
    tracing::info!(path = %path.display(), posts = posts.len(), "conversation log written");
    Ok(())
}

/// Message body followed by one bracketed line per attachment.
fn post_text(post: &ThreadedPost) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(1 + post.attachments.len());
    if !post.message.is_empty() {
        lines.push(post.message.clone());
    }
    for attachment in &post.attachments {
        lines.push(format!("[{}: {}]", attachment.kind.label(), attachment.file_name()));
    }
    lines.join("\n")
}

/// Number of parent hops up to the root, bounded by the post count.
fn reply_depth(posts: &[ThreadedPost], post: &ThreadedPost) -> usize {
    let mut depth = 0;
    let mut current = post;
    while let Some(parent) = current.parent.and_then(|p| posts.get(p)) {
        depth += 1;
        if depth >= posts.len() {
            break;
        }
        current = parent;
    }
    depth
}
