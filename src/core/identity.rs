//! Sender and mention resolution.
//!
//! Every retained message must come from a sender listed in the `users`
//! mapping; an unmapped sender aborts the run with
//! [`MigrateError::UnresolvedUser`]. Mentions are softer: a `@token` without a
//! `mentions` entry, or a mention-by-name of an unmapped user, stays literal
//! text.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::MigrationConfig;
use crate::error::{MigrateError, Result};
use crate::message::{MessageKind, RawMessage};

/// A source sender mapped to its destination username.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ResolvedUser {
    /// Source identifier, e.g. `user123`.
    pub source_id: String,
    /// Destination username, without `@`.
    pub username: String,
}

/// A retained message paired with its resolved author.
#[derive(Debug, Clone)]
pub struct ResolvedMessage<'m> {
    pub message: &'m RawMessage,
    pub author: ResolvedUser,
}

/// Resolves identities against the configured `users` and `mentions` maps.
#[derive(Debug, Clone)]
pub struct IdentityResolver<'a> {
    users: &'a BTreeMap<String, String>,
    mentions: &'a BTreeMap<String, String>,
}

impl<'a> IdentityResolver<'a> {
    pub fn new(config: &'a MigrationConfig) -> Self {
        Self {
            users: &config.users,
            mentions: &config.mentions,
        }
    }

    /// Resolves the sender of a message.
    ///
    /// # Errors
    ///
    /// [`MigrateError::UnresolvedUser`] when the message has no sender or the
    /// sender is not in `users`.
    pub fn resolve_sender(&self, msg: &RawMessage) -> Result<ResolvedUser> {
        let sender_id = msg.sender_id.as_deref().unwrap_or_default();
        match self.users.get(sender_id) {
            Some(username) => Ok(ResolvedUser {
                source_id: sender_id.to_string(),
                username: username.clone(),
            }),
            None => Err(MigrateError::unresolved_user(
                if sender_id.is_empty() {
                    "<none>"
                } else {
                    sender_id
                },
                msg.id,
            )),
        }
    }

    /// Resolves the author of every retained message, in source order.
    ///
    /// Service events and unknown entries are not retained and are skipped
    /// here. The first unmapped sender aborts the whole run.
    pub fn resolve_all<'m>(&self, messages: &'m [RawMessage]) -> Result<Vec<ResolvedMessage<'m>>> {
        let mut resolved = Vec::with_capacity(messages.len());
        for message in messages {
            match &message.kind {
                MessageKind::Message => {
                    let author = self.resolve_sender(message)?;
                    resolved.push(ResolvedMessage { message, author });
                }
                MessageKind::Service { action } => {
                    tracing::debug!(id = message.id, action = ?action, "skipping service message");
                }
                MessageKind::Unknown(kind) => {
                    tracing::debug!(id = message.id, kind = %kind, "skipping entry of unknown type");
                }
            }
        }
        Ok(resolved)
    }

    /// Destination mention for a mention-by-name entity (`user_id` is numeric).
    pub fn mention_for_user_id(&self, user_id: i64) -> Option<String> {
        self.users
            .get(&format!("user{user_id}"))
            .map(|username| format!("@{username}"))
    }

    /// Destination mention for a plain `@token`.
    ///
    /// The leading `@` is optional in `token`.
    pub fn mention_for_token(&self, token: &str) -> Option<String> {
        let bare = token.trim_start_matches('@');
        self.mentions
            .get(bare)
            .map(|target| format!("@{}", target.trim_start_matches('@')))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn config() -> MigrationConfig {
        MigrationConfig::new()
            .with_user("user123", "abc")
            .with_mention("tg_handle", "abc")
            .with_mention("all", "@channel")
    }

    fn msg(sender: Option<&str>) -> RawMessage {
        let date = NaiveDate::from_ymd_opt(2022, 3, 15)
            .unwrap()
            .and_hms_opt(6, 6, 11)
            .unwrap();
        let msg = RawMessage::new(42, date);
        match sender {
            Some(s) => msg.with_sender(s),
            None => msg,
        }
    }

    #[test]
    fn test_resolve_known_sender() {
        let config = config();
        let resolver = IdentityResolver::new(&config);
        let user = resolver.resolve_sender(&msg(Some("user123"))).unwrap();
        assert_eq!(user.username, "abc");
        assert_eq!(user.source_id, "user123");
    }

    #[test]
    fn test_resolve_unknown_sender_fails() {
        let config = config();
        let resolver = IdentityResolver::new(&config);
        let err = resolver.resolve_sender(&msg(Some("user999"))).unwrap_err();
        assert!(err.is_unresolved_user());
        assert!(err.to_string().contains("user999"));
    }

    #[test]
    fn test_resolve_missing_sender_fails() {
        let config = config();
        let resolver = IdentityResolver::new(&config);
        let err = resolver.resolve_sender(&msg(None)).unwrap_err();
        assert!(err.to_string().contains("<none>"));
    }

    #[test]
    fn test_resolve_all_skips_non_messages() {
        let config = config();
        let resolver = IdentityResolver::new(&config);
        let messages = vec![
            msg(Some("user123")),
            msg(None).with_kind(MessageKind::Service {
                action: Some("pin_message".into()),
            }),
            msg(None).with_kind(MessageKind::Unknown("poll_v2".into())),
        ];
        let resolved = resolver.resolve_all(&messages).unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].author.username, "abc");
    }

    #[test]
    fn test_resolve_all_fails_fast() {
        let config = config();
        let resolver = IdentityResolver::new(&config);
        let messages = vec![msg(Some("user123")), msg(Some("user404"))];
        let err = resolver.resolve_all(&messages).unwrap_err();
        assert!(err.is_unresolved_user());
    }

    #[test]
    fn test_mention_by_user_id() {
        let config = config();
        let resolver = IdentityResolver::new(&config);
        assert_eq!(resolver.mention_for_user_id(123), Some("@abc".into()));
        assert_eq!(resolver.mention_for_user_id(999), None);
    }

    #[test]
    fn test_mention_by_token() {
        let config = config();
        let resolver = IdentityResolver::new(&config);
        assert_eq!(resolver.mention_for_token("@tg_handle"), Some("@abc".into()));
        assert_eq!(resolver.mention_for_token("tg_handle"), Some("@abc".into()));
        assert_eq!(resolver.mention_for_token("@all"), Some("@channel".into()));
        assert_eq!(resolver.mention_for_token("@stranger"), None);
    }
}
