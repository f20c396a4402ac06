//! Note repository contract and filesystem implementation.
//!
//! # Responsibility
//! - List, read, save and delete note files under a vault root.
//! - Relocate a note in the same call when its canonical path changes.
//!
//! # Invariants
//! - `save_note` normalizes status and validates before touching disk.
//! - Listing order is `updated_at DESC, id DESC`.
//! - Relocation writes the new file before removing the old one; an
//!   interruption in between leaves both, which validation reports as a
//!   duplicate id.

use crate::codec::frontmatter::render_note;
use crate::model::note::{validate_for_write, Note, NoteFile, NoteValidationError};
use crate::search::filter::NoteFilter;
use crate::search::sort::{sort_notes, SortMode};
use crate::vault::layout::{create_vault_structure, resolve_note_path, to_rel_path};
use crate::vault::walk::{load_note_file, scan_notes, ErrorPolicy, Scan};
use crate::vault::{VaultConfig, VaultError};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for note persistence and queries.
#[derive(Debug)]
pub enum RepoError {
    Validation(NoteValidationError),
    Vault(VaultError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Vault(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Vault(err) => Some(err),
        }
    }
}

impl From<NoteValidationError> for RepoError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<VaultError> for RepoError {
    fn from(value: VaultError) -> Self {
        Self::Vault(value)
    }
}

/// Repository interface for note files.
pub trait NoteRepository {
    /// Vault root every path is resolved against.
    fn root(&self) -> &Path;
    /// Creates the vault skeleton if missing.
    fn init(&self) -> RepoResult<()>;
    /// Loads the vault config, defaults when absent.
    fn load_config(&self) -> RepoResult<VaultConfig>;
    /// Lists notes matching `filter`, newest update first.
    fn list_notes(&self, filter: &NoteFilter) -> RepoResult<Vec<NoteFile>>;
    /// Walks every note file, recording unreadable ones instead of failing.
    fn scan_all(&self) -> RepoResult<Scan>;
    /// Reads one note file.
    fn read_note(&self, path: &Path) -> RepoResult<NoteFile>;
    /// Writes `note` at its canonical path and removes `current_path` when
    /// it differs. Returns the written file.
    fn save_note(&self, current_path: Option<&Path>, note: &Note) -> RepoResult<NoteFile>;
    /// Removes one note file.
    fn delete_note(&self, path: &Path) -> RepoResult<()>;
}

/// Filesystem-backed note repository rooted at one vault directory.
#[derive(Debug, Clone)]
pub struct FsNoteRepository {
    root: PathBuf,
}

impl FsNoteRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl NoteRepository for FsNoteRepository {
    fn root(&self) -> &Path {
        &self.root
    }

    fn init(&self) -> RepoResult<()> {
        match create_vault_structure(&self.root) {
            Ok(()) => {
                info!(
                    "event=vault_init module=repo status=ok root={}",
                    self.root.display()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=vault_init module=repo status=error root={} error={}",
                    self.root.display(),
                    err
                );
                Err(err.into())
            }
        }
    }

    fn load_config(&self) -> RepoResult<VaultConfig> {
        Ok(VaultConfig::load(&self.root)?)
    }

    fn list_notes(&self, filter: &NoteFilter) -> RepoResult<Vec<NoteFile>> {
        let started_at = Instant::now();
        let scan = match scan_notes(&self.root, ErrorPolicy::Abort) {
            Ok(scan) => scan,
            Err(err) => {
                error!(
                    "event=notes_list module=repo status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err.into());
            }
        };

        let mut notes: Vec<NoteFile> = scan
            .notes
            .into_iter()
            .filter(|item| filter.matches(&item.note))
            .collect();
        sort_notes(&mut notes, SortMode::Updated, false);

        info!(
            "event=notes_list module=repo status=ok scanned={} count={} duration_ms={}",
            scan.total,
            notes.len(),
            started_at.elapsed().as_millis()
        );
        Ok(notes)
    }

    fn scan_all(&self) -> RepoResult<Scan> {
        Ok(scan_notes(&self.root, ErrorPolicy::Accumulate)?)
    }

    fn read_note(&self, path: &Path) -> RepoResult<NoteFile> {
        Ok(load_note_file(path, to_rel_path(&self.root, path))?)
    }

    fn save_note(&self, current_path: Option<&Path>, note: &Note) -> RepoResult<NoteFile> {
        let note = note.clone().normalized();
        validate_for_write(&note)?;

        let target = resolve_note_path(&self.root, &note);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|err| VaultError::io(parent, err))?;
        }
        fs::write(&target, render_note(&note))
            .map_err(|err| VaultError::io(&target, err))?;

        let relocated = match current_path {
            Some(previous) if previous != target.as_path() => {
                fs::remove_file(previous).map_err(|err| VaultError::io(previous, err))?;
                true
            }
            _ => false,
        };

        let rel_path = to_rel_path(&self.root, &target);
        info!(
            "event=note_save module=repo status=ok id={} rel_path={} relocated={}",
            note.id, rel_path, relocated
        );
        Ok(NoteFile {
            path: target,
            rel_path,
            note,
        })
    }

    fn delete_note(&self, path: &Path) -> RepoResult<()> {
        fs::remove_file(path).map_err(|err| VaultError::io(path, err))?;
        info!(
            "event=note_delete module=repo status=ok rel_path={}",
            to_rel_path(&self.root, path)
        );
        Ok(())
    }
}
