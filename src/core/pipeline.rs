//! The conversion run.
//!
//! A run moves strictly through [`Stage`]s:
//! `Parsed → Resolved → Threaded → Packaged → Emitted → Archived`.
//! Any error aborts the run where it happens. Parsing, identity and
//! configuration errors surface before anything is written. Attachment
//! problems are the one tolerated failure class: they become warnings on the
//! [`MigrationReport`].
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use tg2mm::config::MigrationConfig;
//! use tg2mm::core::pipeline::Migrator;
//!
//! # fn main() -> tg2mm::Result<()> {
//! let config = MigrationConfig::from_path(Path::new("export/config.yaml"))?;
//! let report = Migrator::new(&config)?
//!     .with_conversation_log("conversation.txt")
//!     .run(Path::new("export"), Path::new("mattermost_import.zip"))?;
//!
//! for warning in &report.warnings {
//!     eprintln!("warning: {warning}");
//! }
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::{ChatType, MigrationConfig};
use crate::core::attachments::{AttachmentRelocator, PackagedAttachment};
use crate::core::emitter::RecordEmitter;
use crate::core::identity::IdentityResolver;
use crate::core::output::{write_archive, write_conversation_log};
use crate::core::records::OutputRecord;
use crate::core::render::MarkdownRenderer;
use crate::core::report::{ConversionStats, MigrationReport, Warning};
use crate::core::thread::{ThreadReconstructor, ThreadedPost};
use crate::core::timestamp::TimestampNormalizer;
use crate::error::Result;
use crate::parser::{EXPORT_FILE_NAME, Export, TelegramParser};

/// Steps of a run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Parsed,
    Resolved,
    Threaded,
    Packaged,
    Emitted,
    Archived,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Parsed => "parsed",
            Stage::Resolved => "resolved",
            Stage::Threaded => "threaded",
            Stage::Packaged => "packaged",
            Stage::Emitted => "emitted",
            Stage::Archived => "archived",
        };
        f.write_str(name)
    }
}

/// Everything a run produces before the archive is written.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// Posts in emission order.
    pub posts: Vec<ThreadedPost>,
    /// Manifest lines in order, version line first.
    pub records: Vec<OutputRecord>,
    /// Files to package.
    pub files: Vec<PackagedAttachment>,
    pub report: MigrationReport,
}

/// Runs conversions for one validated configuration.
#[derive(Debug, Clone)]
pub struct Migrator<'a> {
    config: &'a MigrationConfig,
    conversation_log: Option<PathBuf>,
}

impl<'a> Migrator<'a> {
    /// Validates `config` and prepares a migrator.
    pub fn new(config: &'a MigrationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            conversation_log: None,
        })
    }

    /// Also writes a plain-text transcript to `path`.
    #[must_use]
    pub fn with_conversation_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.conversation_log = Some(path.into());
        self
    }

    /// Converts `export_dir/result.json` and writes the archive to `output`.
    ///
    /// The conversation log, if requested, is written after the archive. A
    /// failure there becomes a [`Warning`] rather than an error.
    pub fn run(&self, export_dir: &Path, output: &Path) -> Result<MigrationReport> {
        let export = TelegramParser::new().parse(&export_dir.join(EXPORT_FILE_NAME))?;
        let mut conversion = self.convert(&export, export_dir)?;

        write_archive(output, &conversion.records, &conversion.files)?;
        stage(Stage::Archived);

        if let Some(log_path) = &self.conversation_log {
            if let Err(e) = write_conversation_log(&conversion.posts, log_path) {
                let warning = Warning::ConversationLogFailed {
                    path: log_path.display().to_string(),
                    reason: e.to_string(),
                };
                tracing::warn!("{warning}");
                conversion.report.warnings.push(warning);
            }
        }

        Ok(conversion.report)
    }

    /// Runs every stage except writing the archive.
    ///
    /// Attachment paths in `export` are resolved against `export_dir`.
    pub fn convert(&self, export: &Export, export_dir: &Path) -> Result<Conversion> {
        let config = self.config;
        let mut warnings = Vec::new();
        stage(Stage::Parsed);

        if export.chat_type.is_direct() != (config.chat_type == ChatType::DirectChat) {
            let warning = Warning::ChatTypeMismatch {
                export_type: export.chat_type.to_string(),
                configured: config.chat_type,
            };
            tracing::warn!("{warning}");
            warnings.push(warning);
        }

        let resolver = IdentityResolver::new(config);
        let resolved = resolver.resolve_all(&export.messages)?;
        stage(Stage::Resolved);

        let normalizer = TimestampNormalizer::new(config.timezone);
        let mismatched = resolved
            .iter()
            .filter(|r| normalizer.disagrees_with_unixtime(r.message))
            .count();
        if mismatched > 0 {
            let warning = Warning::TimestampMismatch {
                count: mismatched,
                timezone: config.timezone.name().to_string(),
            };
            tracing::warn!("{warning}");
            warnings.push(warning);
        }

        let threads = ThreadReconstructor::new(normalizer, MarkdownRenderer::new(resolver))
            .reconstruct(&resolved);
        stage(Stage::Threaded);

        let emitter = RecordEmitter::new(config)?;
        let relocation = AttachmentRelocator::new(export_dir)
            .relocate(&threads.posts, emitter.first_post_id());
        stage(Stage::Packaged);

        let records = emitter.emit(&threads.posts, &relocation);
        stage(Stage::Emitted);

        let referenced: usize = threads.posts.iter().map(|p| p.attachments.len()).sum();
        let packaged_refs: usize = relocation.post_paths.iter().map(Vec::len).sum();
        let stats = ConversionStats {
            source_entries: export.messages.len(),
            skipped_entries: export.messages.len() - resolved.len(),
            posts: threads.posts.len(),
            replies: threads.stats.replies,
            broken_threads: threads.stats.broken_threads,
            album_members_merged: threads.stats.album_members_merged,
            attachments_packaged: relocation.files.len(),
            attachments_skipped: referenced - packaged_refs,
            records: records.len(),
        };
        warnings.extend(relocation.warnings);

        tracing::info!(
            posts = stats.posts,
            records = stats.records,
            attachments = stats.attachments_packaged,
            warnings = warnings.len(),
            "conversion complete"
        );

        Ok(Conversion {
            posts: threads.posts,
            records,
            files: relocation.files,
            report: MigrationReport { stats, warnings },
        })
    }
}

/// Converts `export_dir` with `config` and writes the archive to `output`.
pub fn migrate(config: &MigrationConfig, export_dir: &Path, output: &Path) -> Result<MigrationReport> {
    Migrator::new(config)?.run(export_dir, output)
}

fn stage(stage: Stage) {
    tracing::info!(stage = %stage, "stage complete");
}
