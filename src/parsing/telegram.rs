//! Serde shapes of the Telegram Desktop JSON export.
//!
//! These structs mirror the document as Telegram writes it. They are converted
//! into the typed [`RawMessage`] model by [`TelegramRawMessage::into_raw_message`].

use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{MigrateError, Result};
use crate::message::{Attachment, AttachmentKind, EntityKind, MessageKind, RawMessage, TextEntity};

/// Format of the export's naive `date` and `edited` fields.
pub const TELEGRAM_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Telegram export wrapper.
///
/// `type` and `messages` are required; a document without them is not an
/// export.
#[derive(Debug, Deserialize)]
pub struct TelegramExport {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub chat_type: String,
    pub id: Option<i64>,
    pub messages: Vec<TelegramRawMessage>,
}

/// Raw Telegram message structure for deserialization.
#[derive(Debug, Deserialize)]
pub struct TelegramRawMessage {
    pub id: i64,
    /// `message`, `service`, or something newer
    #[serde(rename = "type")]
    pub msg_type: String,
    /// Local wall-clock time, e.g. `2022-03-15T06:06:11`
    pub date: String,
    /// Unix timestamp as string (newer exports only)
    pub date_unixtime: Option<String>,
    pub edited: Option<String>,
    /// Sender name
    pub from: Option<String>,
    /// Sender id, e.g. `user123456`
    pub from_id: Option<String>,
    /// Actor of a service event
    pub actor: Option<String>,
    pub actor_id: Option<String>,
    pub action: Option<String>,
    /// Message text (can be string or array)
    pub text: Option<Value>,
    pub reply_to_message_id: Option<i64>,
    pub forwarded_from: Option<String>,
    pub photo: Option<String>,
    pub file: Option<String>,
    pub thumbnail: Option<String>,
    pub media_type: Option<String>,
    pub sticker_emoji: Option<String>,
    #[serde(alias = "grouped_id")]
    pub media_group_id: Option<i64>,
}

impl TelegramRawMessage {
    /// Converts the raw entry into the typed model.
    ///
    /// Fails only when the `date` field cannot be read; every other oddity
    /// degrades to a missing optional field.
    pub fn into_raw_message(self) -> Result<RawMessage> {
        let date = parse_naive_date(&self.date).ok_or_else(|| {
            MigrateError::malformed(format!(
                "message {} has an invalid date '{}'",
                self.id, self.date
            ))
        })?;

        let edited = self.edited.as_deref().and_then(|raw| {
            let parsed = parse_naive_date(raw);
            if parsed.is_none() {
                tracing::debug!(message_id = self.id, edited = raw, "ignoring unreadable edit date");
            }
            parsed
        });

        let kind = match self.msg_type.as_str() {
            "message" => MessageKind::Message,
            "service" => MessageKind::Service {
                action: self.action.clone(),
            },
            other => MessageKind::Unknown(other.to_string()),
        };

        let (sender_id, sender_name) = match kind {
            MessageKind::Service { .. } => (
                self.from_id.or(self.actor_id),
                self.from.or(self.actor),
            ),
            _ => (self.from_id, self.from),
        };

        let attachment = match (self.photo, self.file) {
            (Some(photo), _) => Some(Attachment::new(AttachmentKind::Photo, photo)),
            (None, Some(file)) => {
                let kind = AttachmentKind::from_media_type(self.media_type.as_deref());
                let mut attachment = Attachment::new(kind, file);
                attachment.thumbnail = self.thumbnail;
                Some(attachment)
            }
            (None, None) => None,
        };

        Ok(RawMessage {
            id: self.id,
            kind,
            sender_id,
            sender_name,
            date,
            date_unixtime: self.date_unixtime.as_deref().and_then(parse_unix_seconds),
            edited,
            reply_to: self.reply_to_message_id,
            forwarded_from: self.forwarded_from,
            entities: self
                .text
                .as_ref()
                .map(extract_text_entities)
                .unwrap_or_default(),
            sticker_emoji: self.sticker_emoji,
            attachment,
            album_id: self.media_group_id,
        })
    }
}

/// Parses Telegram's naive `YYYY-MM-DDTHH:MM:SS` timestamps.
pub fn parse_naive_date(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, TELEGRAM_DATE_FORMAT).ok()
}

/// Parses a Unix timestamp string such as `"1705314600"`.
pub fn parse_unix_seconds(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok()
}

/// Extracts typed text entities from Telegram's `text` field.
///
/// The `text` field in Telegram exports can be:
/// - A simple string: `"Hello"`
/// - An array with strings and objects: `["Text", {"type": "link", "text": "url"}]`
///
/// Array objects without a string `type` and `text` are skipped.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use tg2mm::message::EntityKind;
/// use tg2mm::parsing::telegram::extract_text_entities;
///
/// let entities = extract_text_entities(&json!([
///     "Check this: ",
///     {"type": "bold", "text": "now"}
/// ]));
/// assert_eq!(entities.len(), 2);
/// assert_eq!(entities[1].kind, EntityKind::Bold);
/// ```
pub fn extract_text_entities(text_value: &Value) -> Vec<TextEntity> {
    match text_value {
        Value::String(s) if s.is_empty() => Vec::new(),
        Value::String(s) => vec![TextEntity::plain(s.clone())],
        Value::Array(arr) => arr
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(TextEntity::plain(s.clone())),
                Value::Object(obj) => entity_from_object(obj),
                other => {
                    tracing::debug!(element = %other, "skipping invalid text element");
                    None
                }
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn entity_from_object(obj: &Map<String, Value>) -> Option<TextEntity> {
    let (Some(kind), Some(text)) = (
        obj.get("type").and_then(Value::as_str),
        obj.get("text").and_then(Value::as_str),
    ) else {
        tracing::debug!(element = ?obj, "skipping text element missing type or text");
        return None;
    };

    let kind = match kind {
        "plain" => EntityKind::Plain,
        "bold" => EntityKind::Bold,
        "italic" => EntityKind::Italic,
        "underline" => EntityKind::Underline,
        "strikethrough" => EntityKind::Strikethrough,
        "code" => EntityKind::Code,
        "pre" => EntityKind::Pre {
            language: obj
                .get("language")
                .and_then(Value::as_str)
                .filter(|l| !l.is_empty())
                .map(ToString::to_string),
        },
        "blockquote" => EntityKind::Blockquote,
        "link" => EntityKind::Link,
        "text_link" => match obj.get("href").and_then(Value::as_str) {
            Some(href) => EntityKind::TextLink {
                href: href.to_string(),
            },
            None => EntityKind::Link,
        },
        "email" => EntityKind::Email,
        "phone" => EntityKind::Phone,
        "hashtag" => EntityKind::Hashtag,
        "cashtag" => EntityKind::Cashtag,
        "bot_command" => EntityKind::BotCommand,
        "bank_card" => EntityKind::BankCard,
        "mention" => EntityKind::Mention,
        "mention_name" => match obj.get("user_id").and_then(Value::as_i64) {
            Some(user_id) => EntityKind::MentionName { user_id },
            None => EntityKind::Plain,
        },
        "spoiler" => EntityKind::Spoiler,
        "custom_emoji" => EntityKind::CustomEmoji,
        other => EntityKind::Other(other.to_string()),
    };

    Some(TextEntity::new(kind, text))
}
