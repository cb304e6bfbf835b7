//! Record emission.
//!
//! Turns threaded posts into the ordered manifest: the version line, the
//! header records the configured [`ChatType`] needs, then one post per
//! threaded post.
//!
//! | `chat_type` | headers | post variant |
//! |-------------|---------|--------------|
//! | `channel` | team, channel, users | `post` |
//! | `post` | none | `post` |
//! | `direct_chat` | direct_channel, users | `direct_post` |

use crate::config::{ChatType, ImportTarget, MigrationConfig};
use crate::core::attachments::Relocation;
use crate::core::records::{
    AttachmentRef, ChannelMembership, ChannelRecord, DirectChannelRecord, OPEN_TYPE, OutputRecord,
    PostRecord, TeamMembership, TeamRecord, UserRecord,
};
use crate::core::thread::ThreadedPost;
use crate::error::{MigrateError, Result};

/// Where the posts go.
#[derive(Debug, Clone)]
enum Destination<'a> {
    Channel(&'a ImportTarget),
    FlatPosts(&'a ImportTarget),
    Direct(Vec<String>),
}

/// Emits manifest records for one configuration.
#[derive(Debug, Clone)]
pub struct RecordEmitter<'a> {
    destination: Destination<'a>,
    usernames: Vec<&'a str>,
}

impl<'a> RecordEmitter<'a> {
    /// Fails with [`MigrateError::InvalidConfig`] when a team-channel mode has
    /// no `import_into`.
    pub fn new(config: &'a MigrationConfig) -> Result<Self> {
        let usernames = config.usernames();
        let target = || {
            config.import_into.as_ref().ok_or_else(|| {
                MigrateError::invalid_config(format!(
                    "chat_type '{}' needs 'import_into'",
                    config.chat_type
                ))
            })
        };
        let destination = match config.chat_type {
            ChatType::Channel => Destination::Channel(target()?),
            ChatType::Post => Destination::FlatPosts(target()?),
            ChatType::DirectChat => {
                Destination::Direct(usernames.iter().map(|u| (*u).to_string()).collect())
            }
        };
        Ok(Self {
            destination,
            usernames,
        })
    }

    /// Header records between the version line and the first post.
    pub fn header_records(&self) -> Vec<OutputRecord> {
        match &self.destination {
            Destination::Channel(target) => {
                let mut headers = vec![
                    OutputRecord::Team {
                        team: TeamRecord {
                            name: target.team.clone(),
                            display_name: target.team.clone(),
                            kind: OPEN_TYPE.to_string(),
                        },
                    },
                    OutputRecord::Channel {
                        channel: ChannelRecord {
                            team: target.team.clone(),
                            name: target.channel.clone(),
                            display_name: target.channel.clone(),
                            kind: OPEN_TYPE.to_string(),
                        },
                    },
                ];
                headers.extend(self.user_records(Some(target)));
                headers
            }
            Destination::FlatPosts(_) => Vec::new(),
            Destination::Direct(members) => {
                let mut headers = vec![OutputRecord::DirectChannel {
                    direct_channel: DirectChannelRecord {
                        members: members.clone(),
                    },
                }];
                headers.extend(self.user_records(None));
                headers
            }
        }
    }

    /// Id of the first post: the version line and headers come before it.
    pub fn first_post_id(&self) -> i64 {
        1 + self.header_records().len() as i64
    }

    /// Emits the whole manifest in line order.
    ///
    /// `posts` must already be in emission order and `relocation` must have
    /// been planned with [`first_post_id`](Self::first_post_id).
    pub fn emit(&self, posts: &[ThreadedPost], relocation: &Relocation) -> Vec<OutputRecord> {
        let headers = self.header_records();
        let first_post_id = 1 + headers.len() as i64;

        let mut records = Vec::with_capacity(1 + headers.len() + posts.len());
        records.push(OutputRecord::version());
        records.extend(headers);

        for (index, post) in posts.iter().enumerate() {
            let body = self.post_body(post, first_post_id, index, relocation.paths_for(index));
            records.push(match self.destination {
                Destination::Direct(_) => OutputRecord::DirectPost { direct_post: body },
                Destination::Channel(_) | Destination::FlatPosts(_) => {
                    OutputRecord::Post { post: body }
                }
            });
        }

        tracing::debug!(records = records.len(), posts = posts.len(), "emitted records");
        records
    }

    fn post_body(
        &self,
        post: &ThreadedPost,
        first_post_id: i64,
        index: usize,
        paths: &[String],
    ) -> PostRecord {
        let (team, channel, channel_members) = match &self.destination {
            Destination::Channel(target) | Destination::FlatPosts(target) => {
                (Some(target.team.clone()), Some(target.channel.clone()), None)
            }
            Destination::Direct(members) => (None, None, Some(members.clone())),
        };
        let id_of = |position: usize| first_post_id + position as i64;

        PostRecord {
            id: id_of(index),
            team,
            channel,
            channel_members,
            user: post.author.username.clone(),
            message: post.message.clone(),
            create_at: post.create_at,
            edit_at: post.edit_at,
            attachments: paths
                .iter()
                .map(|path| AttachmentRef { path: path.clone() })
                .collect(),
            parent_id: post.parent.map(id_of),
            root_id: post.root.map(id_of),
        }
    }

    fn user_records(&self, target: Option<&ImportTarget>) -> Vec<OutputRecord> {
        self.usernames
            .iter()
            .map(|username| OutputRecord::User {
                user: UserRecord {
                    username: (*username).to_string(),
                    teams: target
                        .map(|t| TeamMembership {
                            name: t.team.clone(),
                            channels: vec![ChannelMembership {
                                name: t.channel.clone(),
                            }],
                        })
                        .into_iter()
                        .collect(),
                },
            })
            .collect()
    }
}
