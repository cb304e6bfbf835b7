//! Core conversion pipeline.
//!
//! This module contains:
//! - [`identity`] - sender and mention resolution
//! - [`timestamp`] - naive local time to epoch milliseconds
//! - [`render`] - rich-text entities to Mattermost markdown
//! - [`thread`] - reply chains and album merging
//! - [`attachments`] - attachment layout inside the archive
//! - [`records`] - bulk-import record model
//! - [`emitter`] - manifest assembly per chat type
//! - [`output`] - archive and transcript writers
//! - [`report`] - warnings and statistics
//! - [`pipeline`] - the run itself
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use tg2mm::config::MigrationConfig;
//! use tg2mm::core::migrate;
//!
//! # fn main() -> tg2mm::Result<()> {
//! let config = MigrationConfig::new()
//!     .with_user("user123", "alice")
//!     .with_user("user456", "bob");
//! let report = migrate(&config, Path::new("export"), Path::new("mattermost_import.zip"))?;
//! println!("{} posts", report.stats.posts);
//! # Ok(())
//! # }
//! ```

pub mod attachments;
pub mod emitter;
pub mod identity;
pub mod output;
pub mod pipeline;
pub mod records;
pub mod render;
pub mod report;
pub mod thread;
pub mod timestamp;

pub use attachments::{AttachmentRelocator, PackagedAttachment, Relocation};
pub use emitter::RecordEmitter;
pub use identity::{IdentityResolver, ResolvedMessage, ResolvedUser};
pub use pipeline::{Conversion, Migrator, Stage, migrate};
pub use records::OutputRecord;
pub use render::MarkdownRenderer;
pub use report::{ConversionStats, MigrationReport, Warning};
pub use thread::{ThreadReconstructor, ThreadedPost, Threads};
pub use timestamp::TimestampNormalizer;
