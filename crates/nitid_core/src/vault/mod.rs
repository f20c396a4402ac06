//! Vault directory layout, configuration and traversal.
//!
//! # Responsibility
//! - Map note attributes to one canonical file path.
//! - Create the vault skeleton and its config file.
//! - Walk `notes/` and parse every markdown file under one error policy.
//!
//! # Invariants
//! - A vault is a plain directory of text files; no index or lock files.
//! - I/O failures carry the offending path and keep the original error.

use crate::codec::frontmatter::ParseError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

pub mod config;
pub mod layout;
pub mod walk;

pub use config::VaultConfig;
pub use layout::{create_vault_structure, resolve_note_path, to_rel_path};
pub use walk::{scan_notes, ErrorPolicy, Scan, ScanFailure};

pub type VaultResult<T> = Result<T, VaultError>;

/// Vault-level failure.
#[derive(Debug)]
pub enum VaultError {
    /// Filesystem operation failed on `path`.
    Io { path: PathBuf, source: io::Error },
    /// Directory traversal failed.
    Walk(walkdir::Error),
    /// File content is not a valid note.
    Parse { path: PathBuf, source: ParseError },
    /// `.nitid/config.toml` cannot be read or written.
    Config { path: PathBuf, message: String },
}

impl VaultError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl Display for VaultError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Walk(err) => write!(f, "walk notes: {err}"),
            Self::Parse { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Config { path, message } => {
                write!(f, "vault config {}: {message}", path.display())
            }
        }
    }
}

impl Error for VaultError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Walk(err) => Some(err),
            Self::Parse { source, .. } => Some(source),
            Self::Config { .. } => None,
        }
    }
}

impl From<walkdir::Error> for VaultError {
    fn from(value: walkdir::Error) -> Self {
        Self::Walk(value)
    }
}
