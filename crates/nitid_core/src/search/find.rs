//! Case-insensitive substring search over the note listing.
//!
//! # Responsibility
//! - Match a query against title, body, domain and tags.
//! - Keep the listing order (`updated_at DESC, id DESC`) and truncate.
//!
//! # Invariants
//! - Blank queries and a zero limit are rejected, never treated as
//!   "match everything".

use crate::model::note::{Note, NoteFile};
use crate::repo::note_repo::{NoteRepository, RepoError};
use crate::search::filter::NoteFilter;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Default number of hits returned by [`SearchQuery::new`].
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// Result type for search APIs.
pub type SearchResult<T> = Result<T, SearchError>;

/// Search-layer error for query validation and note scanning.
#[derive(Debug)]
pub enum SearchError {
    /// Query is blank after trimming.
    EmptyQuery,
    InvalidLimit(usize),
    Repo(RepoError),
}

impl Display for SearchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyQuery => write!(f, "search query cannot be empty"),
            Self::InvalidLimit(limit) => {
                write!(f, "invalid limit {limit}: expected a positive integer")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SearchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for SearchError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Substring query with filter and result cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// User query text, matched case-insensitively.
    pub text: String,
    pub filter: NoteFilter,
    /// Maximum number of hits to return.
    pub limit: usize,
}

impl SearchQuery {
    /// Creates a query with the default limit and no filter.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            filter: NoteFilter::default(),
            limit: DEFAULT_SEARCH_LIMIT,
        }
    }

    pub fn with_filter(mut self, filter: NoteFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// Returns whether `needle` (already lowercased) occurs in the title, body,
/// domain or any tag of `note`.
pub fn note_matches_query(note: &Note, needle: &str) -> bool {
    note.title.to_lowercase().contains(needle)
        || note.body.to_lowercase().contains(needle)
        || note.domain.to_lowercase().contains(needle)
        || note
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(needle))
}

/// Runs `query` against the filtered listing of `repo`.
pub fn find_notes<R>(repo: &R, query: &SearchQuery) -> SearchResult<Vec<NoteFile>>
where
    R: NoteRepository + ?Sized,
{
    let needle = query.text.trim().to_lowercase();
    if needle.is_empty() {
        return Err(SearchError::EmptyQuery);
    }
    if query.limit < 1 {
        return Err(SearchError::InvalidLimit(query.limit));
    }

    let started_at = Instant::now();
    let hits: Vec<NoteFile> = repo
        .list_notes(&query.filter)?
        .into_iter()
        .filter(|item| note_matches_query(&item.note, &needle))
        .take(query.limit)
        .collect();

    info!(
        "event=notes_find module=search status=ok count={} limit={} duration_ms={}",
        hits.len(),
        query.limit,
        started_at.elapsed().as_millis()
    );
    Ok(hits)
}
