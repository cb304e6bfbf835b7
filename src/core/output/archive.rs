//! Bulk-import archive writer.
//!
//! The archive is a zip file holding the manifest (`import.jsonl`, one
//! [`OutputRecord`] per line) followed by every packaged attachment under
//! `data/`. Entries carry a fixed 1980-01-01 timestamp and fixed permissions,
//! so the same input always yields the same bytes.
//!
//! The zip is assembled in a temporary file next to the destination and only
//! renamed into place once it is complete. On any failure the temporary file
//! is removed and no partial archive remains.

use std::fs::File;
use std::io::{self, Seek, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::core::attachments::PackagedAttachment;
use crate::core::records::OutputRecord;
use crate::error::{ArchiveErrorKind, MigrateError, Result};

/// Name of the manifest inside the archive.
pub const MANIFEST_NAME: &str = "import.jsonl";

/// What was written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveSummary {
    /// Manifest lines.
    pub records: usize,
    /// Attachment files.
    pub files: usize,
    /// Size of the finished archive in bytes.
    pub bytes: u64,
}

/// Serializes records as newline-delimited JSON, one record per line.
///
/// # Example
///
/// ```rust
/// use tg2mm::core::output::to_manifest;
/// use tg2mm::core::records::OutputRecord;
///
/// let manifest = to_manifest(&[OutputRecord::version()]).unwrap();
/// assert_eq!(manifest, "{\"type\":\"version\",\"version\":1}\n");
/// ```
pub fn to_manifest(records: &[OutputRecord]) -> serde_json::Result<String> {
    let mut manifest = String::new();
    for record in records {
        manifest.push_str(&record.to_json_line()?);
        manifest.push('\n');
    }
    Ok(manifest)
}

/// Writes the archive to `output_path`, replacing any existing file.
///
/// # Errors
///
/// [`MigrateError::ArchiveWrite`] on any I/O, zip or serialization fault,
/// including an attachment file that disappeared after relocation.
pub fn write_archive(
    output_path: &Path,
    records: &[OutputRecord],
    files: &[PackagedAttachment],
) -> Result<ArchiveSummary> {
    let fail = |source: ArchiveErrorKind| MigrateError::archive_write(output_path, source);

    let dir = match output_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let temp = tempfile::Builder::new()
        .prefix(".tg2mm-")
        .suffix(".zip.partial")
        .tempfile_in(dir)
        .map_err(|e| fail(e.into()))?;

    let temp = write_zip(temp, records, files).map_err(fail)?;
    temp.as_file().sync_all().map_err(|e| fail(e.into()))?;
    let bytes = temp.as_file().metadata().map_err(|e| fail(e.into()))?.len();
    temp.persist(output_path).map_err(|e| fail(e.into()))?;

    tracing::info!(
        path = %output_path.display(),
        records = records.len(),
        files = files.len(),
        bytes,
        "archive written"
    );

    Ok(ArchiveSummary {
        records: records.len(),
        files: files.len(),
        bytes,
    })
}

fn write_zip<W: Write + Seek>(
    writer: W,
    records: &[OutputRecord],
    files: &[PackagedAttachment],
) -> std::result::Result<W, ArchiveErrorKind> {
    let entry = |method: CompressionMethod| {
        SimpleFileOptions::default()
            .compression_method(method)
            .last_modified_time(DateTime::default())
            .unix_permissions(0o644)
    };

    let mut zip = ZipWriter::new(writer);

    zip.start_file(MANIFEST_NAME, entry(CompressionMethod::Deflated))?;
    zip.write_all(to_manifest(records)?.as_bytes())?;

    for file in files {
        tracing::debug!(source = %file.source_path, packaged = %file.packaged_path, "adding attachment");
        let mut source = File::open(&file.source_file)?;
        zip.start_file(
            file.packaged_path.as_str(),
            entry(CompressionMethod::Stored),
        )?;
        io::copy(&mut source, &mut zip)?;
    }

    Ok(zip.finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Read;
    use tempfile::TempDir;
    use zip::ZipArchive;

    fn attachment(dir: &Path, name: &str, content: &[u8]) -> PackagedAttachment {
        let source_file = dir.join(name);
        fs::write(&source_file, content).unwrap();
        PackagedAttachment {
            source_path: name.to_string(),
            source_file,
            packaged_path: format!("data/1/{name}"),
            reference_path: format!("1/{name}"),
        }
    }

    #[test]
    fn test_manifest_first_then_files() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out.zip");
        let files = [attachment(dir.path(), "a.jpg", b"jpeg bytes")];

        let summary = write_archive(&out, &[OutputRecord::version()], &files).unwrap();
        assert_eq!(summary.records, 1);
        assert_eq!(summary.files, 1);
        assert!(summary.bytes > 0);

        let mut archive = ZipArchive::new(File::open(&out).unwrap()).unwrap();
        assert_eq!(archive.len(), 2);
        assert_eq!(archive.by_index(0).unwrap().name(), MANIFEST_NAME);

        let mut manifest = String::new();
        archive
            .by_name(MANIFEST_NAME)
            .unwrap()
            .read_to_string(&mut manifest)
            .unwrap();
        assert_eq!(manifest, "{\"type\":\"version\",\"version\":1}\n");

        let mut content = Vec::new();
        archive
            .by_name("data/1/a.jpg")
            .unwrap()
            .read_to_end(&mut content)
            .unwrap();
        assert_eq!(content, b"jpeg bytes");
    }

    #[test]
    fn test_byte_identical_reruns() {
        let dir = TempDir::new().unwrap();
        let files = [attachment(dir.path(), "a.jpg", b"x")];
        let first = dir.path().join("first.zip");
        let second = dir.path().join("second.zip");

        write_archive(&first, &[OutputRecord::version()], &files).unwrap();
        write_archive(&second, &[OutputRecord::version()], &files).unwrap();

        assert_eq!(fs::read(first).unwrap(), fs::read(second).unwrap());
    }

    #[test]
    fn test_vanished_file_leaves_no_output() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out.zip");
        let files = [PackagedAttachment {
            source_path: "gone.jpg".into(),
            source_file: dir.path().join("gone.jpg"),
            packaged_path: "data/1/gone.jpg".into(),
            reference_path: "1/gone.jpg".into(),
        }];

        let err = write_archive(&out, &[OutputRecord::version()], &files).unwrap_err();
        assert!(err.is_archive_write());
        assert!(!out.exists());
        let leftovers: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_missing_output_directory() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("no/such/dir/out.zip");
        let err = write_archive(&out, &[OutputRecord::version()], &[]).unwrap_err();
        assert!(err.is_archive_write());
    }
}
