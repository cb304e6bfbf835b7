//! # tg2mm
//!
//! Converts a Telegram Desktop chat export into a Mattermost bulk-import
//! archive.
//!
//! ## Overview
//!
//! The input is the directory Telegram Desktop writes with "Export chat
//! history" in JSON format: `result.json` plus its media folders. The output
//! is a single zip holding `import.jsonl` (one bulk-import record per line)
//! and every referenced attachment under `data/`.
//!
//! A run goes through a fixed sequence of stages:
//!
//! 1. [`parser`] decodes `result.json` into [`RawMessage`]s
//! 2. [`core::identity`] maps senders and mentions to Mattermost usernames
//! 3. [`core::timestamp`] reads naive export times in the configured timezone
//! 4. [`core::thread`] links replies and merges albums
//! 5. [`core::attachments`] lays out attachment files inside the archive
//! 6. [`core::emitter`] produces the ordered record stream
//! 7. [`core::output`] writes the archive
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use tg2mm::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let config = MigrationConfig::from_path(Path::new("export/config.yaml"))?;
//!     let report = Migrator::new(&config)?
//!         .run(Path::new("export"), Path::new("mattermost_import.zip"))?;
//!
//!     println!("{} posts, {} warnings", report.stats.posts, report.warnings.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Failure policy
//!
//! Malformed exports, unmapped senders and invalid configuration abort the
//! run before anything is written. A missing attachment file only produces a
//! [`Warning`](core::Warning); the post is imported without it. See
//! [`error`] for the full taxonomy.
//!
//! ## Module Structure
//!
//! - [`parser`] - [`TelegramParser`](parser::TelegramParser), [`Export`](parser::Export)
//! - [`parsing`] - serde shapes of the Telegram JSON document
//! - [`message`] - [`RawMessage`] and its parts
//! - [`config`] - [`MigrationConfig`](config::MigrationConfig) and the YAML loader
//! - [`core`] - the conversion pipeline
//! - [`cli`] - CLI types (requires the `cli` feature)
//! - [`error`] - Unified error types ([`MigrateError`], [`Result`])
//! - [`prelude`] - Convenient re-exports

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod message;
pub mod parser;
pub mod parsing;

// Re-export the main types at the crate root for convenience
pub use error::{MigrateError, Result};
pub use message::RawMessage;

/// Convenient re-exports for common usage.
///
/// Import everything you need with a single line:
///
/// ```rust
/// use tg2mm::prelude::*;
/// ```
pub mod prelude {
    // Core message type
    pub use crate::RawMessage;
    pub use crate::message::{Attachment, AttachmentKind, EntityKind, MessageKind, TextEntity};

    // Error types
    pub use crate::error::{MigrateError, Result};

    // Parsing
    pub use crate::parser::{Export, SourceChatType, TelegramParser};

    // Configuration
    pub use crate::config::{ChatType, ImportTarget, MigrationConfig};

    // Pipeline
    pub use crate::core::{
        Conversion, MigrationReport, Migrator, OutputRecord, Warning, migrate,
    };

    // Output
    pub use crate::core::output::{to_conversation_log, to_manifest, write_archive};
}
