//! Output writers.
//!
//! - [`write_archive`] / [`to_manifest`] - the bulk-import zip and its JSONL manifest
//! - [`write_conversation_log`] / [`to_conversation_log`] - plain-text transcript
//!
//! # Example
//!
//! ```rust,no_run
//! # fn main() -> tg2mm::Result<()> {
//! use std::path::Path;
//! use tg2mm::core::output::write_archive;
//! use tg2mm::core::records::OutputRecord;
//!
//! let records = vec![OutputRecord::version()];
//! write_archive(Path::new("mattermost_import.zip"), &records, &[])?;
//! # Ok(())
//! # }
//! ```

mod archive;
mod conversation_log;

pub use archive::{ArchiveSummary, MANIFEST_NAME, to_manifest, write_archive};
pub use conversation_log::{to_conversation_log, write_conversation_log};
