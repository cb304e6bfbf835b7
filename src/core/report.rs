//! Warnings and statistics of a finished run.

use std::fmt;

use serde::Serialize;

use crate::config::ChatType;

/// A non-fatal problem. The run continues and the archive is still written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// The referenced file does not exist in the export directory.
    MissingAttachment { message_id: i64, path: String },

    /// Telegram did not download the file when the export was made.
    AttachmentNotExported { message_id: i64 },

    /// The path is absolute or escapes the export directory; never read.
    UnsafeAttachmentPath { message_id: i64, path: String },

    /// `date_unixtime` disagrees with the normalized `date` for some messages.
    TimestampMismatch { count: usize, timezone: String },

    /// The export's chat type does not match the configured `chat_type`.
    ChatTypeMismatch {
        export_type: String,
        configured: ChatType,
    },

    /// The conversation log could not be written; the archive is unaffected.
    ConversationLogFailed { path: String, reason: String },
}

impl Warning {
    /// Returns `true` for warnings about attachment files.
    pub fn is_attachment(&self) -> bool {
        matches!(
            self,
            Warning::MissingAttachment { .. }
                | Warning::AttachmentNotExported { .. }
                | Warning::UnsafeAttachmentPath { .. }
        )
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::MissingAttachment { message_id, path } => {
                write!(f, "message {message_id}: attachment '{path}' not found, posted without it")
            }
            Warning::AttachmentNotExported { message_id } => {
                write!(f, "message {message_id}: attachment was not included in the export")
            }
            Warning::UnsafeAttachmentPath { message_id, path } => {
                write!(f, "message {message_id}: refusing attachment path '{path}'")
            }
            Warning::TimestampMismatch { count, timezone } => write!(
                f,
                "{count} message(s) carry a date_unixtime that disagrees with their date read in \
                 {timezone}; check the `timezone` setting"
            ),
            Warning::ChatTypeMismatch {
                export_type,
                configured,
            } => write!(
                f,
                "export type '{export_type}' does not look like chat_type '{configured}'; \
                 using the configured chat_type"
            ),
            Warning::ConversationLogFailed { path, reason } => {
                write!(f, "conversation log '{path}' not written: {reason}")
            }
        }
    }
}

/// Counters of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConversionStats {
    /// Entries in the export's message list.
    pub source_entries: usize,
    /// Service events and unknown entries that were skipped.
    pub skipped_entries: usize,
    /// Emitted post or direct-post records.
    pub posts: usize,
    /// Replies linked to their parent.
    pub replies: usize,
    /// Replies posted as roots because their parent was not retained.
    pub broken_threads: usize,
    /// Album members folded into an earlier post.
    pub album_members_merged: usize,
    /// Distinct files written to the archive.
    pub attachments_packaged: usize,
    /// Attachment references dropped with a warning.
    pub attachments_skipped: usize,
    /// Lines in the manifest, version line included.
    pub records: usize,
}

/// Terminal result of a successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub stats: ConversionStats,
    pub warnings: Vec<Warning>,
}

impl MigrationReport {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Attachment warnings only.
    pub fn attachment_warnings(&self) -> impl Iterator<Item = &Warning> {
        self.warnings.iter().filter(|w| w.is_attachment())
    }
}
