//! Vault configuration stored at `.nitid/config.toml`.

use super::layout::META_DIR;
use super::{VaultError, VaultResult};
use crate::model::note::NoteKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.toml";
const CONFIG_VERSION: u32 = 1;

/// Parsed vault configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct VaultConfig {
    #[serde(default)]
    pub vault: VaultSection,
}

/// `[vault]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultSection {
    pub version: u32,
    /// Domain applied when a capture leaves it unset. Empty means inbox.
    pub default_domain: String,
    /// Kind applied when a capture leaves it unset.
    pub default_kind: NoteKind,
}

impl Default for VaultSection {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            default_domain: String::new(),
            default_kind: NoteKind::Note,
        }
    }
}

impl VaultConfig {
    /// `<root>/.nitid/config.toml`.
    pub fn path(root: &Path) -> PathBuf {
        root.join(META_DIR).join(CONFIG_FILE_NAME)
    }

    /// Loads the config, returning defaults when the file does not exist.
    pub fn load(root: &Path) -> VaultResult<Self> {
        let path = Self::path(root);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(VaultError::io(&path, err)),
        };
        toml::from_str(&text).map_err(|err| VaultError::Config {
            path,
            message: err.to_string(),
        })
    }

    /// Writes the config, creating `.nitid/` if needed.
    pub fn save(&self, root: &Path) -> VaultResult<()> {
        let path = Self::path(root);
        let text = toml::to_string(self).map_err(|err| VaultError::Config {
            path: path.clone(),
            message: err.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| VaultError::io(parent, err))?;
        }
        fs::write(&path, text).map_err(|err| VaultError::io(&path, err))
    }
}
