//! Canonical vault paths.
//!
//! ```text
//! notes/inbox/<id>--<slug>.md
//! notes/domains/<domain>/<id>--<slug>.md
//! notes/daily/<YYYY>/<MM>/<id>--<slug>.md
//! notes/archive/<id>--<slug>.md
//! ```

use super::config::VaultConfig;
use super::{VaultError, VaultResult};
use crate::model::note::{normalize_status, Note, NoteKind, NoteStatus};
use crate::model::slug::slugify;
use chrono::Datelike;
use std::fs;
use std::path::{Component, Path, PathBuf};

pub const NOTES_DIR: &str = "notes";
pub const INBOX_DIR: &str = "inbox";
pub const DOMAINS_DIR: &str = "domains";
pub const DAILY_DIR: &str = "daily";
pub const ARCHIVE_DIR: &str = "archive";
pub const ASSETS_DIR: &str = "assets";
pub const META_DIR: &str = ".nitid";
pub const CACHE_DIR: &str = "cache";
pub const NOTE_EXTENSION: &str = "md";

/// `<root>/notes`.
pub fn notes_root(root: &Path) -> PathBuf {
    root.join(NOTES_DIR)
}

/// File name for a note: `<id>--<slug(title)>.md`.
pub fn note_file_name(note: &Note) -> String {
    format!("{}--{}.{NOTE_EXTENSION}", note.id, slugify(&note.title))
}

/// Computes the canonical file path for `note` under `root`.
///
/// Pure and total. Status is normalized first, so an unset status resolves
/// to the same path it will be written with.
pub fn resolve_note_path(root: &Path, note: &Note) -> PathBuf {
    let notes = notes_root(root);
    let dir = match note.kind {
        NoteKind::Daily => notes
            .join(DAILY_DIR)
            .join(format!("{:04}", note.created_at.year()))
            .join(format!("{:02}", note.created_at.month())),
        NoteKind::Note | NoteKind::Adr | NoteKind::Snippet => match normalize_status(note) {
            NoteStatus::Archived => notes.join(ARCHIVE_DIR),
            NoteStatus::Inbox => notes.join(INBOX_DIR),
            NoteStatus::Active => notes.join(DOMAINS_DIR).join(&note.domain),
        },
    };
    dir.join(note_file_name(note))
}

/// Vault-relative path with `/` separators; falls back to the full path
/// when `path` is outside `root`.
pub fn to_rel_path(root: &Path, path: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(rel) => rel
            .components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => path.to_string_lossy().into_owned(),
    }
}

/// Creates the vault skeleton and a default config when none exists.
///
/// Idempotent: existing directories and an existing config are kept.
pub fn create_vault_structure(root: &Path) -> VaultResult<()> {
    let notes = notes_root(root);
    let dirs = [
        notes.join(INBOX_DIR),
        notes.join(DOMAINS_DIR),
        notes.join(DAILY_DIR),
        notes.join(ARCHIVE_DIR),
        root.join(ASSETS_DIR),
        root.join(META_DIR).join(CACHE_DIR),
    ];
    for dir in &dirs {
        fs::create_dir_all(dir).map_err(|err| VaultError::io(dir, err))?;
    }

    let config_path = VaultConfig::path(root);
    if !config_path.exists() {
        VaultConfig::default().save(root)?;
    }
    Ok(())
}
