//! Typed model of one Telegram export entry.
//!
//! The export parser turns every entry of the export's `messages` array into a
//! [`RawMessage`]. Nothing is dropped at this stage: service events and entries
//! of unknown type are kept as [`MessageKind::Service`] and
//! [`MessageKind::Unknown`] so later stages decide explicitly what to skip.
//!
//! # Examples
//!
//! ```
//! use chrono::NaiveDate;
//! use tg2mm::message::{RawMessage, TextEntity};
//!
//! let date = NaiveDate::from_ymd_opt(2021, 1, 1)
//!     .unwrap()
//!     .and_hms_opt(10, 0, 0)
//!     .unwrap();
//!
//! let msg = RawMessage::new(10, date)
//!     .with_sender("user1")
//!     .with_entity(TextEntity::plain("Hello"))
//!     .with_reply_to(9);
//!
//! assert!(msg.is_message());
//! assert_eq!(msg.plain_text(), "Hello");
//! ```

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One entry of the export's message list.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMessage {
    /// Source message id. Unique within a chat, non-decreasing in source order.
    pub id: i64,

    /// Entry kind.
    pub kind: MessageKind,

    /// Sender identifier such as `user123456` or `channel987`.
    ///
    /// Absent for most service events.
    pub sender_id: Option<String>,

    /// Sender display name as exported (informational only).
    pub sender_name: Option<String>,

    /// Wall-clock send time without offset or DST information.
    pub date: NaiveDateTime,

    /// Absolute send time written by newer exports (`date_unixtime`).
    ///
    /// Never used for the emitted timestamp; see
    /// [`TimestampNormalizer`](crate::core::timestamp::TimestampNormalizer).
    pub date_unixtime: Option<i64>,

    /// Wall-clock time of the last edit, if any.
    pub edited: Option<NaiveDateTime>,

    /// Source id of the message this one replies to.
    pub reply_to: Option<i64>,

    /// Original author of a forwarded message.
    pub forwarded_from: Option<String>,

    /// Rich-text content in source order.
    pub entities: Vec<TextEntity>,

    /// Emoji shown for sticker messages.
    pub sticker_emoji: Option<String>,

    /// Attached media, if any.
    pub attachment: Option<Attachment>,

    /// Grouped-media identifier shared by the members of an album.
    pub album_id: Option<i64>,
}

/// Discriminates the kinds of export entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    /// A regular user message.
    Message,
    /// A service event (member joined, message pinned, ...).
    Service {
        /// The export's `action` field, e.g. `pin_message`.
        action: Option<String>,
    },
    /// An entry whose `type` this crate does not know, preserved verbatim.
    Unknown(String),
}

/// A span of message text with its formatting kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEntity {
    pub kind: EntityKind,
    pub text: String,
}

impl TextEntity {
    pub fn new(kind: EntityKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// Unformatted text.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(EntityKind::Plain, text)
    }
}

/// Telegram text entity types.
///
/// Unknown types are kept as [`EntityKind::Other`] so their text survives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityKind {
    Plain,
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Code,
    Pre {
        language: Option<String>,
    },
    Blockquote,
    Link,
    TextLink {
        href: String,
    },
    Email,
    Phone,
    Hashtag,
    Cashtag,
    BotCommand,
    BankCard,
    /// A plain `@username` token.
    Mention,
    /// A mention of a user without a public username, by numeric id.
    MentionName {
        user_id: i64,
    },
    Spoiler,
    CustomEmoji,
    Other(String),
}

/// Media attached to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub kind: AttachmentKind,
    /// Path relative to the export directory, as written by Telegram.
    pub path: String,
    /// Inline thumbnail path, if the export has one.
    pub thumbnail: Option<String>,
}

impl Attachment {
    pub fn new(kind: AttachmentKind, path: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            thumbnail: None,
        }
    }

    #[must_use]
    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }

    /// Returns the final path component, or the whole path if it has none.
    pub fn file_name(&self) -> &str {
        self.path
            .rsplit(['/', '\\'])
            .next()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.path)
    }
}

/// Kinds of attached media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    Photo,
    Video,
    Animation,
    Voice,
    VideoMessage,
    Audio,
    Sticker,
    Document,
}

impl AttachmentKind {
    /// Maps the export's `media_type` of a `file` attachment.
    pub fn from_media_type(media_type: Option<&str>) -> Self {
        match media_type {
            Some("video_file") => AttachmentKind::Video,
            Some("animation") => AttachmentKind::Animation,
            Some("voice_message") => AttachmentKind::Voice,
            Some("video_message") => AttachmentKind::VideoMessage,
            Some("audio_file") => AttachmentKind::Audio,
            Some("sticker") => AttachmentKind::Sticker,
            _ => AttachmentKind::Document,
        }
    }

    /// Upper-case label used in transcripts, e.g. `PHOTO`.
    pub fn label(&self) -> &'static str {
        match self {
            AttachmentKind::Photo => "PHOTO",
            AttachmentKind::Video | AttachmentKind::Animation => "VIDEO",
            AttachmentKind::Voice => "VOICE",
            AttachmentKind::VideoMessage => "VIDEO MESSAGE",
            AttachmentKind::Audio => "AUDIO",
            AttachmentKind::Sticker => "STICKER",
            AttachmentKind::Document => "FILE",
        }
    }
}

impl RawMessage {
    /// Creates a regular message with no sender, text or metadata.
    pub fn new(id: i64, date: NaiveDateTime) -> Self {
        Self {
            id,
            kind: MessageKind::Message,
            sender_id: None,
            sender_name: None,
            date,
            date_unixtime: None,
            edited: None,
            reply_to: None,
            forwarded_from: None,
            entities: Vec::new(),
            sticker_emoji: None,
            attachment: None,
            album_id: None,
        }
    }

    // =========================================================================
    // Builder methods
    // =========================================================================

    #[must_use]
    pub fn with_kind(mut self, kind: MessageKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn with_sender(mut self, sender_id: impl Into<String>) -> Self {
        self.sender_id = Some(sender_id.into());
        self
    }

    #[must_use]
    pub fn with_entity(mut self, entity: TextEntity) -> Self {
        self.entities.push(entity);
        self
    }

    #[must_use]
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_entity(TextEntity::plain(text))
    }

    #[must_use]
    pub fn with_reply_to(mut self, reply_to: i64) -> Self {
        self.reply_to = Some(reply_to);
        self
    }

    #[must_use]
    pub fn with_edited(mut self, edited: NaiveDateTime) -> Self {
        self.edited = Some(edited);
        self
    }

    #[must_use]
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    #[must_use]
    pub fn with_album(mut self, album_id: i64) -> Self {
        self.album_id = Some(album_id);
        self
    }

    // =========================================================================
    // Utility methods
    // =========================================================================

    /// Returns `true` for regular user messages.
    pub fn is_message(&self) -> bool {
        self.kind == MessageKind::Message
    }

    /// Concatenated entity text without any formatting.
    pub fn plain_text(&self) -> String {
        self.entities.iter().map(|e| e.text.as_str()).collect()
    }

    /// The attachment to import, excluding stickers.
    pub fn importable_attachment(&self) -> Option<&Attachment> {
        self.attachment
            .as_ref()
            .filter(|a| a.kind != AttachmentKind::Sticker)
    }
}
