//! Note use-case service.
//!
//! # Responsibility
//! - Provide the collaborator-facing operations: create, capture, list,
//!   find, resolve, mutate (move/tag/archive/edit body), delete, validate
//!   and clean.
//! - Assign ids and timestamps from an injected clock and RNG.
//!
//! # Invariants
//! - Every mutation re-saves the whole note, bumps `updated_at` and
//!   relocates the file when its canonical path changed.
//! - User-supplied domains and tags are trimmed and validated, never
//!   rewritten to fit.

use crate::clock::{Clock, SystemClock};
use crate::model::id::{IdError, IdGenerator};
use crate::model::note::{
    is_kebab_case, update_tags, validate_for_write, Note, NoteFile, NoteKind, NoteStatus,
    NoteValidationError, TagAction,
};
use crate::repo::note_repo::{NoteRepository, RepoError};
use crate::search::filter::NoteFilter;
use crate::search::find::{find_notes, SearchError, SearchQuery};
use crate::search::sort::{sort_notes, SortMode};
use crate::service::selector::{resolve_selector, SelectorError};
use crate::service::validate::{validate_vault, ValidationReport};
use crate::vault::layout::to_rel_path;
use crate::vault::walk::find_editor_temp_files;
use crate::vault::VaultError;
use chrono::NaiveDate;
use log::{error, info};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;

/// Longest inferred title, in characters.
pub const MAX_INFERRED_TITLE_CHARS: usize = 72;
/// Title used when a capture has neither title nor body.
pub const UNTITLED_TITLE: &str = "Untitled";

pub type ServiceResult<T> = Result<T, NoteServiceError>;

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Input rejected before touching disk.
    Validation(NoteValidationError),
    Selector(SelectorError),
    Search(SearchError),
    Repo(RepoError),
    Id(IdError),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Selector(err) => write!(f, "{err}"),
            Self::Search(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Id(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Selector(err) => Some(err),
            Self::Search(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Id(err) => Some(err),
        }
    }
}

impl From<NoteValidationError> for NoteServiceError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<SelectorError> for NoteServiceError {
    fn from(value: SelectorError) -> Self {
        Self::Selector(value)
    }
}

impl From<SearchError> for NoteServiceError {
    fn from(value: SearchError) -> Self {
        Self::Search(value)
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<VaultError> for NoteServiceError {
    fn from(value: VaultError) -> Self {
        Self::Repo(RepoError::Vault(value))
    }
}

impl From<IdError> for NoteServiceError {
    fn from(value: IdError) -> Self {
        Self::Id(value)
    }
}

/// Identity and new location of a mutated or deleted note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MutationResult {
    pub id: String,
    pub rel_path: String,
}

impl From<NoteFile> for MutationResult {
    fn from(value: NoteFile) -> Self {
        Self {
            id: value.note.id,
            rel_path: value.rel_path,
        }
    }
}

/// Quick-capture input. Unset fields fall back to the vault config or are
/// inferred from the body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureRequest {
    pub title: Option<String>,
    pub body: String,
    pub domain: Option<String>,
    pub tags: Vec<String>,
    pub kind: Option<NoteKind>,
}

impl CaptureRequest {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_kind(mut self, kind: NoteKind) -> Self {
        self.kind = Some(kind);
        self
    }
}

/// First body line, trimmed and cut to [`MAX_INFERRED_TITLE_CHARS`].
pub fn infer_title(body: &str) -> String {
    let first_line = body.trim().lines().next().unwrap_or_default().trim();
    if first_line.is_empty() {
        return UNTITLED_TITLE.to_string();
    }
    first_line
        .chars()
        .take(MAX_INFERRED_TITLE_CHARS)
        .collect::<String>()
        .trim()
        .to_string()
}

/// Note service facade over repository implementations.
pub struct NoteService<R: NoteRepository> {
    repo: R,
    clock: Box<dyn Clock>,
    rng: Box<dyn RngCore + Send>,
    ids: IdGenerator,
}

impl<R: NoteRepository> NoteService<R> {
    /// Creates a service using the system clock and an entropy-seeded RNG.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            clock: Box::new(SystemClock),
            rng: Box::new(StdRng::from_entropy()),
            ids: IdGenerator::new(),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_rng(mut self, rng: impl RngCore + Send + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Creates the vault skeleton and default config if missing.
    pub fn init(&self) -> ServiceResult<()> {
        Ok(self.repo.init()?)
    }

    /// Writes a fully specified note at its canonical path and returns the
    /// vault-relative path.
    pub fn create(&self, note: &Note) -> ServiceResult<String> {
        let note = note.clone().normalized();
        if let Err(err) = validate_for_write(&note) {
            error!(
                "event=note_create module=service status=error id={} error={}",
                note.id, err
            );
            return Err(err.into());
        }

        self.repo.init()?;
        let saved = self.repo.save_note(None, &note)?;
        info!(
            "event=note_create module=service status=ok id={} kind={} rel_path={}",
            saved.note.id, saved.note.kind, saved.rel_path
        );
        Ok(saved.rel_path)
    }

    /// Builds a new note from `request`, assigning id and timestamps.
    pub fn capture(&mut self, request: CaptureRequest) -> ServiceResult<MutationResult> {
        let config = self.repo.load_config()?;
        let now = self.clock.now();
        let id = self.ids.generate(now, &mut *self.rng)?;

        let body = request.body.trim().to_string();
        let title = match request.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => infer_title(&body),
        };
        let kind = request.kind.unwrap_or(config.vault.default_kind);

        let mut note = Note::new(id, title, kind, now);
        note.domain = match request.domain {
            Some(domain) => domain.trim().to_string(),
            None => config.vault.default_domain,
        };
        note.tags = request
            .tags
            .iter()
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect();
        note.body = body;

        let rel_path = self.create(&note)?;
        Ok(MutationResult {
            id: note.id,
            rel_path,
        })
    }

    /// Lists notes matching `filter` in the requested order.
    pub fn list(
        &self,
        filter: &NoteFilter,
        sort: SortMode,
        ascending: bool,
    ) -> ServiceResult<Vec<NoteFile>> {
        let mut notes = self.repo.list_notes(filter)?;
        sort_notes(&mut notes, sort, ascending);
        Ok(notes)
    }

    /// Case-insensitive substring search, newest update first.
    pub fn find(&self, query: &SearchQuery) -> ServiceResult<Vec<NoteFile>> {
        Ok(find_notes(&self.repo, query)?)
    }

    /// Resolves an id, id prefix or `@k` ref to one note.
    ///
    /// See [`resolve_selector`] for the session-relative meaning of `@k`.
    pub fn resolve(&self, selector: &str) -> ServiceResult<NoteFile> {
        Ok(resolve_selector(&self.repo, selector)?)
    }

    /// Files a note under `domain` and marks it active.
    pub fn move_to_domain(&self, selector: &str, domain: &str) -> ServiceResult<MutationResult> {
        let domain = domain.trim();
        if !is_kebab_case(domain) {
            return Err(NoteValidationError::InvalidDomain(domain.to_string()).into());
        }
        self.mutate(selector, |note| {
            note.domain = domain.to_string();
            note.status = Some(NoteStatus::Active);
        })
    }

    /// Adds or removes one tag.
    pub fn tag(
        &self,
        selector: &str,
        action: TagAction,
        tag: &str,
    ) -> ServiceResult<MutationResult> {
        let tag = tag.trim();
        if !is_kebab_case(tag) {
            return Err(NoteValidationError::InvalidTag(tag.to_string()).into());
        }
        self.mutate(selector, |note| {
            note.tags = update_tags(&note.tags, action, tag);
        })
    }

    /// Marks a note archived, moving it under `notes/archive`.
    pub fn archive(&self, selector: &str) -> ServiceResult<MutationResult> {
        self.mutate(selector, |note| {
            note.status = Some(NoteStatus::Archived);
        })
    }

    /// Replaces the body of a note.
    pub fn update_body(&self, selector: &str, body: &str) -> ServiceResult<MutationResult> {
        let body = body.trim();
        self.mutate(selector, |note| {
            note.body = body.to_string();
        })
    }

    /// Removes a note file. There is no tombstone.
    pub fn delete(&self, selector: &str) -> ServiceResult<MutationResult> {
        let current = resolve_selector(&self.repo, selector)?;
        self.repo.delete_note(&current.path)?;
        Ok(current.into())
    }

    /// First daily note created on `date` (UTC), in listing order.
    pub fn find_daily_by_date(&self, date: NaiveDate) -> ServiceResult<Option<NoteFile>> {
        let filter = NoteFilter::default().with_kind(NoteKind::Daily);
        Ok(self
            .repo
            .list_notes(&filter)?
            .into_iter()
            .find(|item| item.note.created_at.date_naive() == date))
    }

    /// Removes editor swap/backup files under `notes/` and returns their
    /// vault-relative paths. Nothing is removed when `dry_run` is set.
    pub fn clean(&self, dry_run: bool) -> ServiceResult<Vec<String>> {
        let root = self.repo.root();
        let targets = find_editor_temp_files(root)?;

        let mut removed = Vec::with_capacity(targets.len());
        for path in targets {
            if !dry_run {
                fs::remove_file(&path).map_err(|err| VaultError::io(&path, err))?;
            }
            removed.push(to_rel_path(root, &path));
        }

        info!(
            "event=vault_clean module=service status=ok count={} dry_run={}",
            removed.len(),
            dry_run
        );
        Ok(removed)
    }

    /// Scans the whole vault and reports problems without aborting.
    pub fn validate(&self) -> ServiceResult<ValidationReport> {
        Ok(validate_vault(&self.repo)?)
    }

    fn mutate(
        &self,
        selector: &str,
        apply: impl FnOnce(&mut Note),
    ) -> ServiceResult<MutationResult> {
        let current = resolve_selector(&self.repo, selector)?;
        let mut note = current.note;
        apply(&mut note);
        note.updated_at = self.clock.now();

        let saved = self.repo.save_note(Some(&current.path), &note)?;
        Ok(saved.into())
    }
}

#[cfg(test)]
mod tests {
    use super::{infer_title, CaptureRequest, MutationResult, UNTITLED_TITLE};
    use crate::model::note::NoteKind;

    #[test]
    fn infer_title_uses_first_line() {
        assert_eq!(infer_title("  \n\nFirst line\nsecond"), "First line");
        assert_eq!(infer_title("   "), UNTITLED_TITLE);
    }

    #[test]
    fn infer_title_truncates_long_lines() {
        let long = "word ".repeat(30);
        let title = infer_title(&long);
        assert!(title.chars().count() <= 72);
        assert!(!title.ends_with(' '));
    }

    #[test]
    fn infer_title_counts_characters_not_bytes() {
        let line = "é".repeat(80);
        assert_eq!(infer_title(&line).chars().count(), 72);
    }

    #[test]
    fn capture_request_builders_set_fields() {
        let request = CaptureRequest::new("body")
            .with_title("Title")
            .with_domain("eng")
            .with_tags(vec!["go".to_string()])
            .with_kind(NoteKind::Snippet);
        assert_eq!(request.title.as_deref(), Some("Title"));
        assert_eq!(request.domain.as_deref(), Some("eng"));
        assert_eq!(request.kind, Some(NoteKind::Snippet));
    }

    #[test]
    fn mutation_result_serializes_as_flat_object() {
        let result = MutationResult {
            id: "01JN8PX5WP8J67JAY2P2CVJH6D".to_string(),
            rel_path: "notes/inbox/x.md".to_string(),
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["id"], "01JN8PX5WP8J67JAY2P2CVJH6D");
        assert_eq!(value["rel_path"], "notes/inbox/x.md");
    }
}
