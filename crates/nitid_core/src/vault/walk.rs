//! Traversal of `notes/`.
//!
//! One walker feeds two strategies: listing aborts on the first unreadable
//! note, validation records the failure and keeps going. Traversal errors
//! (unreadable directories) abort under both policies.

use super::layout::{notes_root, to_rel_path, NOTE_EXTENSION};
use super::{VaultError, VaultResult};
use crate::codec::frontmatter::parse_note;
use crate::model::note::NoteFile;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const EDITOR_TEMP_SUFFIXES: [&str; 3] = [".swp", ".swo", "~"];

/// What to do when one note file cannot be read or parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Return the first failure.
    Abort,
    /// Record every failure in [`Scan::failures`].
    Accumulate,
}

/// One note file that could not be loaded.
#[derive(Debug)]
pub struct ScanFailure {
    pub rel_path: String,
    pub error: VaultError,
}

/// Result of walking `notes/`.
#[derive(Debug, Default)]
pub struct Scan {
    /// Markdown files visited, valid or not.
    pub total: usize,
    /// Successfully parsed notes, in path order.
    pub notes: Vec<NoteFile>,
    /// Always empty under [`ErrorPolicy::Abort`].
    pub failures: Vec<ScanFailure>,
}

/// Parses every `.md` file under `<root>/notes`.
///
/// A missing `notes/` directory yields an empty scan.
pub fn scan_notes(root: &Path, policy: ErrorPolicy) -> VaultResult<Scan> {
    let paths = walk_files(&notes_root(root), |path| {
        path.extension()
            .map(|ext| ext == NOTE_EXTENSION)
            .unwrap_or(false)
    })?;

    let mut scan = Scan {
        total: paths.len(),
        ..Scan::default()
    };
    for path in paths {
        let rel_path = to_rel_path(root, &path);
        match load_note_file(&path, rel_path.clone()) {
            Ok(note_file) => scan.notes.push(note_file),
            Err(error) => match policy {
                ErrorPolicy::Abort => return Err(error),
                ErrorPolicy::Accumulate => scan.failures.push(ScanFailure { rel_path, error }),
            },
        }
    }
    Ok(scan)
}

/// Reads and parses one note file.
pub fn load_note_file(path: &Path, rel_path: String) -> VaultResult<NoteFile> {
    let text = fs::read_to_string(path).map_err(|err| VaultError::io(path, err))?;
    let note = parse_note(&text).map_err(|source| VaultError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(NoteFile {
        path: path.to_path_buf(),
        rel_path,
        note,
    })
}

/// Editor swap/backup files left under `<root>/notes`, sorted.
pub fn find_editor_temp_files(root: &Path) -> VaultResult<Vec<PathBuf>> {
    walk_files(&notes_root(root), |path| {
        path.file_name()
            .map(|name| {
                let name = name.to_string_lossy();
                EDITOR_TEMP_SUFFIXES
                    .iter()
                    .any(|suffix| name.ends_with(suffix))
            })
            .unwrap_or(false)
    })
}

fn walk_files(dir: &Path, keep: impl Fn(&Path) -> bool) -> VaultResult<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        // Links are not followed while walking, but a linked file is still
        // read through its link.
        if !entry.file_type().is_dir() && keep(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_notes_dir_is_empty_scan() {
        let dir = tempdir().unwrap();
        let scan = scan_notes(dir.path(), ErrorPolicy::Abort).unwrap();
        assert_eq!(scan.total, 0);
        assert!(scan.notes.is_empty());
        assert!(scan.failures.is_empty());
    }

    #[test]
    fn policies_differ_only_in_failure_handling() {
        let dir = tempdir().unwrap();
        let inbox = dir.path().join("notes/inbox");
        fs::create_dir_all(&inbox).unwrap();
        fs::write(inbox.join("broken.md"), "no frontmatter").unwrap();
        fs::write(inbox.join("ignored.txt"), "not markdown").unwrap();

        let err = scan_notes(dir.path(), ErrorPolicy::Abort).unwrap_err();
        assert!(matches!(err, VaultError::Parse { .. }));

        let scan = scan_notes(dir.path(), ErrorPolicy::Accumulate).unwrap();
        assert_eq!(scan.total, 1);
        assert_eq!(scan.failures.len(), 1);
        assert_eq!(scan.failures[0].rel_path, "notes/inbox/broken.md");
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_notes_are_scanned() {
        use crate::codec::frontmatter::render_note;
        use crate::model::note::{Note, NoteKind};
        use chrono::{TimeZone, Utc};

        let dir = tempdir().unwrap();
        let inbox = dir.path().join("notes/inbox");
        fs::create_dir_all(&inbox).unwrap();

        let now = Utc.with_ymd_and_hms(2026, 2, 25, 10, 0, 0).unwrap();
        let note = Note::new("01JN8PX5WP8J67JAY2P2CVJH6D", "Linked", NoteKind::Note, now);
        let target = dir.path().join("outside.md");
        fs::write(&target, render_note(&note)).unwrap();
        std::os::unix::fs::symlink(&target, inbox.join("linked.md")).unwrap();

        let scan = scan_notes(dir.path(), ErrorPolicy::Abort).unwrap();
        assert_eq!(scan.total, 1);
        assert_eq!(scan.notes[0].rel_path, "notes/inbox/linked.md");
        assert_eq!(scan.notes[0].note.id, note.id);
    }

    #[test]
    fn temp_files_are_found_recursively() {
        let dir = tempdir().unwrap();
        let domain = dir.path().join("notes/domains/eng");
        fs::create_dir_all(&domain).unwrap();
        fs::write(domain.join(".a.md.swp"), "").unwrap();
        fs::write(domain.join("b.md~"), "").unwrap();
        fs::write(domain.join("c.md"), "").unwrap();

        let found = find_editor_temp_files(dir.path()).unwrap();
        let names: Vec<String> = found
            .iter()
            .map(|path| to_rel_path(dir.path(), path))
            .collect();
        assert_eq!(
            names,
            vec!["notes/domains/eng/.a.md.swp", "notes/domains/eng/b.md~"]
        );
    }
}
