//! Unified error types for tg2mm.
//!
//! This module provides a single [`MigrateError`] enum covering every fatal
//! failure of a conversion run. Problems the run can survive (a missing media
//! file, for instance) are not errors; they are collected as
//! [`Warning`](crate::core::report::Warning)s on the run's report.
//!
//! # Taxonomy
//!
//! | Variant | When | Effect |
//! |---------|------|--------|
//! | [`MalformedExport`](MigrateError::MalformedExport) | export JSON unusable | abort before any output |
//! | [`UnresolvedUser`](MigrateError::UnresolvedUser) | sender missing from `users` | abort before any output |
//! | [`InvalidConfig`](MigrateError::InvalidConfig) / [`InvalidTimezone`](MigrateError::InvalidTimezone) | configuration rejected | abort before any output |
//! | [`ArchiveWrite`](MigrateError::ArchiveWrite) | I/O fault while packaging | abort, no partial archive left |

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A specialized [`Result`] type for tg2mm operations.
///
/// # Example
///
/// ```rust
/// use tg2mm::error::Result;
/// use tg2mm::RawMessage;
///
/// fn my_function() -> Result<Vec<RawMessage>> {
///     Ok(vec![])
/// }
/// ```
pub type Result<T> = std::result::Result<T, MigrateError>;

/// The error type for all tg2mm operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MigrateError {
    /// The export document cannot be trusted at all.
    ///
    /// This occurs when:
    /// - The file is not valid JSON
    /// - The top-level `type` or `messages` field is missing
    /// - A message has no parseable `date`
    #[error("Malformed Telegram export{}: {reason}", path.as_ref().map(|p| format!(" ({})", p.display())).unwrap_or_default())]
    MalformedExport {
        /// What is wrong with the document
        reason: String,
        /// The export file, if known
        path: Option<PathBuf>,
        /// The underlying JSON error, if any
        #[source]
        source: Option<serde_json::Error>,
    },

    /// A message was sent by an identity that is not in the `users` mapping.
    ///
    /// Importing under a guessed identity is worse than failing the run.
    #[error(
        "Unknown sender '{sender_id}' (message {message_id}); add it to the `users` mapping"
    )]
    UnresolvedUser {
        /// Source-side sender identifier, e.g. `user123456`
        sender_id: String,
        /// Source id of the first offending message
        message_id: i64,
    },

    /// The configuration failed validation.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong
        message: String,
    },

    /// The configured timezone is not a known IANA name.
    #[error("Invalid timezone '{name}'. Please use a valid IANA timezone name")]
    InvalidTimezone {
        /// The rejected timezone name
        name: String,
    },

    /// Writing the output archive failed. No partial file is left behind.
    #[error("Failed to write archive {}: {source}", path.display())]
    ArchiveWrite {
        /// Requested output path
        path: PathBuf,
        /// The underlying failure
        #[source]
        source: ArchiveErrorKind,
    },

    /// An I/O error occurred outside archive writing (reading inputs).
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Kinds of failures while writing the archive.
#[derive(Debug, Error)]
pub enum ArchiveErrorKind {
    /// Filesystem error
    #[error("{0}")]
    Io(#[from] io::Error),
    /// Zip container error
    #[error("{0}")]
    Zip(#[from] zip::result::ZipError),
    /// Record serialization error
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl From<tempfile::PersistError> for ArchiveErrorKind {
    fn from(err: tempfile::PersistError) -> Self {
        ArchiveErrorKind::Io(err.error)
    }
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl MigrateError {
    /// Creates a malformed-export error without an underlying JSON error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        MigrateError::MalformedExport {
            reason: reason.into(),
            path: None,
            source: None,
        }
    }

    /// Creates a malformed-export error from a JSON decoding failure.
    ///
    /// The reason carries serde's message, including line and column.
    pub fn malformed_json(source: serde_json::Error, path: Option<PathBuf>) -> Self {
        MigrateError::MalformedExport {
            reason: format!("not a valid Telegram export document: {source}"),
            path,
            source: Some(source),
        }
    }

    /// Creates an unresolved-user error.
    pub fn unresolved_user(sender_id: impl Into<String>, message_id: i64) -> Self {
        MigrateError::UnresolvedUser {
            sender_id: sender_id.into(),
            message_id,
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        MigrateError::InvalidConfig {
            message: message.into(),
        }
    }

    /// Creates an archive write error.
    pub fn archive_write(path: impl Into<PathBuf>, source: impl Into<ArchiveErrorKind>) -> Self {
        MigrateError::ArchiveWrite {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Attaches the export file path to a malformed-export error.
    #[must_use]
    pub fn with_export_path(self, export_path: impl Into<PathBuf>) -> Self {
        match self {
            MigrateError::MalformedExport {
                reason,
                path: None,
                source,
            } => MigrateError::MalformedExport {
                reason,
                path: Some(export_path.into()),
                source,
            },
            other => other,
        }
    }

    /// Returns `true` if the export document was rejected.
    pub fn is_malformed_export(&self) -> bool {
        matches!(self, MigrateError::MalformedExport { .. })
    }

    /// Returns `true` if a sender was missing from the `users` mapping.
    pub fn is_unresolved_user(&self) -> bool {
        matches!(self, MigrateError::UnresolvedUser { .. })
    }

    /// Returns `true` if the archive could not be written.
    pub fn is_archive_write(&self) -> bool {
        matches!(self, MigrateError::ArchiveWrite { .. })
    }

    /// Returns `true` if the configuration was rejected.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            MigrateError::InvalidConfig { .. } | MigrateError::InvalidTimezone { .. }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
