//! Attachment relocation.
//!
//! Plans where every attachment of the threaded posts lands inside the
//! archive. Each file is stored as `data/<post id>/<sanitized name>` and the
//! post references it as `<post id>/<sanitized name>`, since the importer
//! resolves attachment paths against the archive's `data/` directory. Paths
//! never collide across posts; within one post a numeric
//! suffix separates equal names. A source path referenced twice maps to the
//! one packaged path it got first.
//!
//! Nothing is copied here. The plan records the on-disk source of every
//! packaged path and the archive packager streams the bytes later.
//!
//! Problems with a single file are collected as [`Warning`]s and the post
//! keeps its text without that attachment reference.

use std::collections::{BTreeSet, HashMap};
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::core::report::Warning;
use crate::core::thread::ThreadedPost;

/// Directory inside the archive that holds attachment files.
pub const DATA_DIR: &str = "data";

/// Prefix Telegram writes instead of a path for files it did not download.
pub const NOT_EXPORTED_PREFIX: &str = "(File not included";

static UNSAFE_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_@=+:.,\-]").expect("valid regex"));

/// One file to be written into the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagedAttachment {
    /// Path as written in the export, relative to the export directory.
    pub source_path: String,
    /// Location of the file on disk.
    pub source_file: PathBuf,
    /// Zip entry name, e.g. `data/5/photo_1.jpg`.
    pub packaged_path: String,
    /// Path the post record references, relative to `data/`, e.g. `5/photo_1.jpg`.
    pub reference_path: String,
}

/// Result of relocating all attachments of a run.
#[derive(Debug, Clone, Default)]
pub struct Relocation {
    /// Distinct files to package, in first-reference order.
    pub files: Vec<PackagedAttachment>,
    /// Reference paths of each post, indexed like the posts.
    pub post_paths: Vec<Vec<String>>,
    pub warnings: Vec<Warning>,
}

impl Relocation {
    /// Reference paths of the post at `index`.
    pub fn paths_for(&self, index: usize) -> &[String] {
        self.post_paths.get(index).map_or(&[][..], Vec::as_slice)
    }
}

/// Maps export-relative attachment paths into the archive layout.
#[derive(Debug, Clone)]
pub struct AttachmentRelocator<'a> {
    export_dir: &'a Path,
}

impl<'a> AttachmentRelocator<'a> {
    pub fn new(export_dir: &'a Path) -> Self {
        Self { export_dir }
    }

    /// Plans packaged paths for every attachment of `posts`.
    ///
    /// The post at index `i` is emitted with id `first_post_id + i`.
    pub fn relocate(&self, posts: &[ThreadedPost], first_post_id: i64) -> Relocation {
        let mut relocation = Relocation {
            post_paths: Vec::with_capacity(posts.len()),
            ..Relocation::default()
        };
        let mut packaged_by_source: HashMap<&str, String> = HashMap::new();

        for (index, post) in posts.iter().enumerate() {
            let post_id = first_post_id + index as i64;
            let mut used_names: BTreeSet<String> = BTreeSet::new();
            let mut paths = Vec::new();

            for attachment in &post.attachments {
                if let Some(thumbnail) = &attachment.thumbnail {
                    tracing::debug!(post_id, thumbnail = %thumbnail, "discarding thumbnail");
                }

                let source = attachment.path.as_str();
                if let Some(packaged) = packaged_by_source.get(source) {
                    paths.push(packaged.clone());
                    continue;
                }

                if let Some(warning) = self.check(post.source_id, source) {
                    tracing::warn!("{warning}");
                    relocation.warnings.push(warning);
                    continue;
                }

                let name = unique_name(sanitize_file_name(attachment.file_name()), &mut used_names);
                let reference_path = format!("{post_id}/{name}");
                let packaged_path = format!("{DATA_DIR}/{reference_path}");
                tracing::debug!(source = %source, packaged = %packaged_path, "relocating attachment");

                packaged_by_source.insert(source, reference_path.clone());
                relocation.files.push(PackagedAttachment {
                    source_path: source.to_string(),
                    source_file: self.export_dir.join(source),
                    packaged_path,
                    reference_path: reference_path.clone(),
                });
                paths.push(reference_path);
            }

            relocation.post_paths.push(paths);
        }

        relocation
    }

    /// Returns the warning that keeps `path` out of the archive, if any.
    fn check(&self, message_id: i64, path: &str) -> Option<Warning> {
        if path.starts_with(NOT_EXPORTED_PREFIX) {
            return Some(Warning::AttachmentNotExported { message_id });
        }
        if !is_safe_relative_path(path) {
            return Some(Warning::UnsafeAttachmentPath {
                message_id,
                path: path.to_string(),
            });
        }
        if !self.export_dir.join(path).is_file() {
            return Some(Warning::MissingAttachment {
                message_id,
                path: path.to_string(),
            });
        }
        None
    }
}

/// Returns `true` for relative paths that stay inside the export directory.
pub fn is_safe_relative_path(path: &str) -> bool {
    if path.is_empty() || path.starts_with(['/', '\\']) {
        return false;
    }
    if path.split(['/', '\\']).any(|part| part == "..") {
        return false;
    }
    Path::new(path)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Replaces every character outside `[A-Za-z0-9_@=+:.,-]` with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    let sanitized = UNSAFE_NAME_CHARS.replace_all(name, "_").into_owned();
    match sanitized.as_str() {
        "" | "." | ".." => "file".to_string(),
        _ => sanitized,
    }
}

/// Appends `_1`, `_2`, ... before the extension until `name` is unused.
fn unique_name(name: String, used: &mut BTreeSet<String>) -> String {
    if used.insert(name.clone()) {
        return name;
    }
    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem.to_string(), format!(".{ext}")),
        _ => (name.clone(), String::new()),
    };
    let mut counter = 1;
    loop {
        let candidate = format!("{stem}_{counter}{ext}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::ResolvedUser;
    use crate::message::{Attachment, AttachmentKind};
    use crate::parsing::telegram::parse_naive_date;
    use std::fs;
    use tempfile::TempDir;

    fn post(source_id: i64, paths: &[&str]) -> ThreadedPost {
        ThreadedPost {
            source_id,
            members: vec![source_id],
            author: ResolvedUser {
                source_id: "u1".into(),
                username: "alice".into(),
            },
            local_date: parse_naive_date("2021-01-01T10:00:00").unwrap(),
            create_at: 1609495200000,
            edit_at: None,
            message: String::new(),
            attachments: paths
                .iter()
                .map(|p| Attachment::new(AttachmentKind::Photo, *p))
                .collect(),
            parent: None,
            root: None,
        }
    }

    fn export_dir(files: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for file in files {
            let path = dir.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, file.as_bytes()).unwrap();
        }
        dir
    }

    #[test]
    fn test_relocates_under_post_id() {
        let dir = export_dir(&["photos/photo 1.jpg"]);
        let relocation =
            AttachmentRelocator::new(dir.path()).relocate(&[post(1, &["photos/photo 1.jpg"])], 4);

        assert_eq!(relocation.paths_for(0), ["4/photo_1.jpg"]);
        assert_eq!(relocation.files.len(), 1);
        assert_eq!(relocation.files[0].packaged_path, "data/4/photo_1.jpg");
        assert_eq!(relocation.files[0].reference_path, "4/photo_1.jpg");
        assert_eq!(relocation.files[0].source_file, dir.path().join("photos/photo 1.jpg"));
        assert!(relocation.warnings.is_empty());
    }

    #[test]
    fn test_missing_file_is_warning() {
        let dir = export_dir(&[]);
        let relocation =
            AttachmentRelocator::new(dir.path()).relocate(&[post(9, &["photos/1.jpg"])], 1);

        assert!(relocation.paths_for(0).is_empty());
        assert!(relocation.files.is_empty());
        assert_eq!(
            relocation.warnings,
            vec![Warning::MissingAttachment {
                message_id: 9,
                path: "photos/1.jpg".into()
            }]
        );
    }

    #[test]
    fn test_not_exported_and_unsafe_paths() {
        let dir = export_dir(&[]);
        let posts = [post(
            1,
            &[
                "(File not included. Change data exporting settings to download.)",
                "../secret.txt",
                "/etc/passwd",
            ],
        )];
        let relocation = AttachmentRelocator::new(dir.path()).relocate(&posts, 1);

        assert!(relocation.files.is_empty());
        assert_eq!(relocation.warnings.len(), 3);
        assert_eq!(relocation.warnings[0], Warning::AttachmentNotExported { message_id: 1 });
        assert!(matches!(
            relocation.warnings[1],
            Warning::UnsafeAttachmentPath { .. }
        ));
        assert!(matches!(
            relocation.warnings[2],
            Warning::UnsafeAttachmentPath { .. }
        ));
    }

    #[test]
    fn test_name_collision_within_post() {
        let dir = export_dir(&["photos/a.jpg", "files/a.jpg"]);
        let relocation = AttachmentRelocator::new(dir.path())
            .relocate(&[post(1, &["photos/a.jpg", "files/a.jpg"])], 2);

        assert_eq!(relocation.paths_for(0), ["2/a.jpg", "2/a_1.jpg"]);
        assert_eq!(relocation.files.len(), 2);
    }

    #[test]
    fn test_same_source_reuses_packaged_path() {
        let dir = export_dir(&["files/doc.pdf"]);
        let posts = [post(1, &["files/doc.pdf"]), post(2, &["files/doc.pdf"])];
        let relocation = AttachmentRelocator::new(dir.path()).relocate(&posts, 1);

        assert_eq!(relocation.files.len(), 1);
        assert_eq!(relocation.paths_for(1), ["1/doc.pdf"]);
    }

    #[test]
    fn test_references_resolve_under_data_dir() {
        let dir = export_dir(&["photos/a.jpg", "files/b.pdf"]);
        let posts = [post(1, &["photos/a.jpg"]), post(2, &["files/b.pdf", "photos/a.jpg"])];
        let relocation = AttachmentRelocator::new(dir.path()).relocate(&posts, 3);

        let entries: Vec<&str> = relocation.files.iter().map(|f| f.packaged_path.as_str()).collect();
        for index in 0..posts.len() {
            for path in relocation.paths_for(index) {
                assert!(!path.starts_with("data/"));
                assert!(entries.contains(&format!("{DATA_DIR}/{path}").as_str()));
            }
        }
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("Report (final).pdf"), "Report__final_.pdf");
        assert_eq!(sanitize_file_name("a@b=c+d:e,f-g.txt"), "a@b=c+d:e,f-g.txt");
        assert_eq!(sanitize_file_name("Привет.txt"), "______.txt");
        assert_eq!(sanitize_file_name(""), "file");
    }

    #[test]
    fn test_safe_relative_path() {
        assert!(is_safe_relative_path("photos/photo_1.jpg"));
        assert!(is_safe_relative_path("./files/a.txt"));
        assert!(!is_safe_relative_path("files/../../x"));
        assert!(!is_safe_relative_path("..\\x"));
        assert!(!is_safe_relative_path("/abs"));
        assert!(!is_safe_relative_path(""));
    }
}
