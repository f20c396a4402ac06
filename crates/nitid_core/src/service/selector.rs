//! Selector parsing and resolution.
//!
//! # Responsibility
//! - Map a user token (`@k`, legacy `#k`, full id or id prefix) to exactly
//!   one note, or fail with the precise reason.
//!
//! # Invariants
//! - An exact id match wins over prefix matches.
//! - Resolution never guesses: several candidates is always an error.
//! - `@k` indexes the live, unfiltered `updated_at DESC, id DESC` listing
//!   computed at resolution time, so it is only meaningful relative to the
//!   listing the user last saw. If the vault changes in between, `@1` can
//!   name a different note. Callers that need a stable handle must use ids.

use crate::model::note::NoteFile;
use crate::repo::note_repo::{NoteRepository, RepoError};
use crate::search::filter::NoteFilter;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Selector resolution error.
#[derive(Debug)]
pub enum SelectorError {
    EmptySelector,
    /// Positional ref whose index is not a positive integer.
    InvalidRef(String),
    RefOutOfRange { selector: String, len: usize },
    NotFound(String),
    /// More than one note matches; `matches` lists their ids.
    AmbiguousSelector {
        selector: String,
        matches: Vec<String>,
    },
    Repo(RepoError),
}

impl Display for SelectorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptySelector => write!(f, "note selector is required"),
            Self::InvalidRef(selector) => {
                write!(f, "invalid ref {selector:?}: use @<positive-number>")
            }
            Self::RefOutOfRange { selector, len: 0 } => {
                write!(f, "ref {selector} out of range: vault has no notes")
            }
            Self::RefOutOfRange { selector, len } => {
                write!(f, "ref {selector} out of range (1..{len})")
            }
            Self::NotFound(selector) => write!(f, "note {selector:?} not found"),
            Self::AmbiguousSelector { selector, matches } => write!(
                f,
                "selector {selector:?} is ambiguous: matches {}",
                matches.join(", ")
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SelectorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for SelectorError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Parsed selector token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// 1-based position in the default listing.
    Position(usize),
    /// Full id or id prefix.
    Id(String),
}

impl Selector {
    pub fn parse(raw: &str) -> Result<Self, SelectorError> {
        let token = raw.trim();
        if token.is_empty() {
            return Err(SelectorError::EmptySelector);
        }

        match token.strip_prefix('@').or_else(|| token.strip_prefix('#')) {
            Some(index) => match index.parse::<usize>() {
                Ok(position) if position > 0 => Ok(Self::Position(position)),
                _ => Err(SelectorError::InvalidRef(token.to_string())),
            },
            None => Ok(Self::Id(token.to_string())),
        }
    }
}

/// Resolves `raw` against the notes in `repo`.
pub fn resolve_selector<R>(repo: &R, raw: &str) -> Result<NoteFile, SelectorError>
where
    R: NoteRepository + ?Sized,
{
    let selector = Selector::parse(raw)?;
    let token = raw.trim();
    let notes = repo.list_notes(&NoteFilter::default())?;

    let resolved = match selector {
        Selector::Position(position) => {
            let len = notes.len();
            notes
                .into_iter()
                .nth(position - 1)
                .ok_or_else(|| SelectorError::RefOutOfRange {
                    selector: token.to_string(),
                    len,
                })
        }
        Selector::Id(id) => match_id(notes, &id),
    };

    match &resolved {
        Ok(item) => info!(
            "event=selector_resolve module=service status=ok id={} rel_path={}",
            item.note.id, item.rel_path
        ),
        Err(err) => warn!(
            "event=selector_resolve module=service status=error error={}",
            err
        ),
    }
    resolved
}

fn match_id(notes: Vec<NoteFile>, id: &str) -> Result<NoteFile, SelectorError> {
    let (exact, rest): (Vec<NoteFile>, Vec<NoteFile>) =
        notes.into_iter().partition(|item| item.note.id == id);
    let candidates = if exact.is_empty() {
        rest.into_iter()
            .filter(|item| item.note.id.starts_with(id))
            .collect()
    } else {
        exact
    };

    let mut candidates = candidates.into_iter();
    match (candidates.next(), candidates.next()) {
        (None, _) => Err(SelectorError::NotFound(id.to_string())),
        (Some(only), None) => Ok(only),
        (Some(first), Some(second)) => {
            let mut matches = vec![first.note.id, second.note.id];
            matches.extend(candidates.map(|item| item.note.id));
            Err(SelectorError::AmbiguousSelector {
                selector: id.to_string(),
                matches,
            })
        }
    }
}
