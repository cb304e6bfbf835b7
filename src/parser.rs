//! Telegram export parser.
//!
//! Decodes a Telegram Desktop `result.json` into an [`Export`]: the chat's
//! type and name plus every entry of its message list as a typed
//! [`RawMessage`], in source order.
//!
//! # Example
//!
//! ```rust
//! use tg2mm::parser::{SourceChatType, TelegramParser};
//!
//! # fn main() -> tg2mm::Result<()> {
//! let export = TelegramParser::new().parse_str(r#"{
//!     "name": "Team chat",
//!     "type": "private_supergroup",
//!     "messages": [
//!         {"id": 1, "type": "message", "date": "2022-03-15T06:06:11",
//!          "from_id": "user123", "text": "Morning!"}
//!     ]
//! }"#)?;
//!
//! assert_eq!(export.chat_type, SourceChatType::PrivateSupergroup);
//! assert_eq!(export.messages.len(), 1);
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::RawMessage;
use crate::error::{MigrateError, Result};
use crate::parsing::telegram::TelegramExport;

/// File name Telegram Desktop gives the JSON export.
pub const EXPORT_FILE_NAME: &str = "result.json";

/// The chat types Telegram Desktop writes into the export's `type` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceChatType {
    PersonalChat,
    BotChat,
    SavedMessages,
    PrivateGroup,
    PrivateSupergroup,
    PublicSupergroup,
    PrivateChannel,
    PublicChannel,
    /// A type this crate does not know yet.
    Other(String),
}

impl SourceChatType {
    /// Returns `true` for one-to-one conversations.
    pub fn is_direct(&self) -> bool {
        matches!(
            self,
            SourceChatType::PersonalChat | SourceChatType::BotChat | SourceChatType::SavedMessages
        )
    }
}

impl fmt::Display for SourceChatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceChatType::PersonalChat => write!(f, "personal_chat"),
            SourceChatType::BotChat => write!(f, "bot_chat"),
            SourceChatType::SavedMessages => write!(f, "saved_messages"),
            SourceChatType::PrivateGroup => write!(f, "private_group"),
            SourceChatType::PrivateSupergroup => write!(f, "private_supergroup"),
            SourceChatType::PublicSupergroup => write!(f, "public_supergroup"),
            SourceChatType::PrivateChannel => write!(f, "private_channel"),
            SourceChatType::PublicChannel => write!(f, "public_channel"),
            SourceChatType::Other(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for SourceChatType {
    fn from(s: &str) -> Self {
        match s {
            "personal_chat" => SourceChatType::PersonalChat,
            "bot_chat" => SourceChatType::BotChat,
            "saved_messages" => SourceChatType::SavedMessages,
            "private_group" => SourceChatType::PrivateGroup,
            "private_supergroup" => SourceChatType::PrivateSupergroup,
            "public_supergroup" => SourceChatType::PublicSupergroup,
            "private_channel" => SourceChatType::PrivateChannel,
            "public_channel" => SourceChatType::PublicChannel,
            other => SourceChatType::Other(other.to_string()),
        }
    }
}

/// A parsed export document.
#[derive(Debug, Clone)]
pub struct Export {
    /// Chat title, if exported.
    pub name: Option<String>,
    /// Chat type as declared by the export.
    pub chat_type: SourceChatType,
    /// Telegram chat id, if exported.
    pub id: Option<i64>,
    /// Every message-list entry in source order.
    pub messages: Vec<RawMessage>,
}

/// Parser for Telegram JSON exports.
///
/// Telegram exports chats as JSON with the following structure:
/// ```json
/// {
///   "name": "Chat Name",
///   "type": "private_supergroup",
///   "messages": [
///     {
///       "id": 12345,
///       "type": "message",
///       "date": "2022-03-15T06:06:11",
///       "from": "Sender Name",
///       "from_id": "user123",
///       "text": "Hello" | ["Hello", {"type": "link", "text": "url"}],
///       "reply_to_message_id": 12344,
///       "photo": "photos/photo_1.jpg"
///     }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TelegramParser;

impl TelegramParser {
    pub fn new() -> Self {
        Self
    }

    /// Returns the human-readable name of this parser.
    pub fn name(&self) -> &'static str {
        "Telegram"
    }

    /// Reads and parses an export file.
    pub fn parse(&self, path: &Path) -> Result<Export> {
        let content = fs::read_to_string(path)?;
        self.parse_str(&content)
            .map_err(|e| e.with_export_path(path))
    }

    /// Parses an export document held in memory.
    ///
    /// Fails with [`MigrateError::MalformedExport`] when the document is not
    /// JSON, lacks the top-level `type` or `messages` fields, or contains a
    /// message without a readable `id` or `date`.
    pub fn parse_str(&self, content: &str) -> Result<Export> {
        let value: Value =
            serde_json::from_str(content).map_err(|e| MigrateError::malformed_json(e, None))?;

        let Some(root) = value.as_object() else {
            return Err(MigrateError::malformed("top-level value is not an object"));
        };
        for field in ["type", "messages"] {
            if !root.contains_key(field) {
                return Err(MigrateError::malformed(format!(
                    "missing required field `{field}`"
                )));
            }
        }

        let export: TelegramExport =
            serde_json::from_value(value).map_err(|e| MigrateError::malformed_json(e, None))?;

        let messages = export
            .messages
            .into_iter()
            .map(|raw| raw.into_raw_message())
            .collect::<Result<Vec<_>>>()?;

        let chat_type = SourceChatType::from(export.chat_type.as_str());

        tracing::debug!(
            chat_type = %chat_type,
            messages = messages.len(),
            "parsed Telegram export"
        );

        Ok(Export {
            name: export.name,
            chat_type,
            id: export.id,
            messages,
        })
    }
}
