//! Note storage engine for nitid vaults.
//! This crate is the single source of truth for note invariants: file
//! format, canonical paths, ids, selectors and vault validation.

pub mod clock;
pub mod codec;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;
pub mod vault;

pub use clock::{Clock, SystemClock};
pub use codec::frontmatter::{parse_note, render_note, ParseError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::id::{is_valid_note_id, IdError, IdGenerator};
pub use model::note::{
    Note, NoteFile, NoteKind, NoteStatus, NoteValidationError, TagAction,
};
pub use model::slug::slugify;
pub use repo::note_repo::{FsNoteRepository, NoteRepository, RepoError, RepoResult};
pub use search::filter::NoteFilter;
pub use search::find::{SearchError, SearchQuery};
pub use search::sort::{sort_notes, unique_id_prefixes, SortMode};
pub use service::note_service::{
    CaptureRequest, MutationResult, NoteService, NoteServiceError, ServiceResult,
};
pub use service::selector::{resolve_selector, Selector, SelectorError};
pub use service::validate::{validate_vault, ValidationIssue, ValidationReport};
pub use vault::{VaultConfig, VaultError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
