//! Note record, kind/status variants and write validation.
//!
//! # Responsibility
//! - Define the canonical `Note` shape shared by codec, vault and services.
//! - Derive a note's status when it is missing.
//! - Validate a note before any write and after every parse.
//!
//! # Invariants
//! - `normalize_status` is total and idempotent.
//! - `validate_all` reports every failure; `validate_for_write` the first.
//! - `domain` and each tag must match `^[a-z0-9]+(-[a-z0-9]+)*$`.

use crate::model::id::is_valid_note_id;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

static KEBAB_CASE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid kebab-case regex"));

/// Closed set of note kinds.
///
/// Path policy and templates match on this exhaustively, so a new kind is
/// a compile-time checked change.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum NoteKind {
    /// Free-form note.
    #[default]
    Note,
    /// Architecture decision record.
    Adr,
    /// Reusable code or text snippet.
    Snippet,
    /// One note per calendar day, stored by creation date.
    Daily,
}

impl NoteKind {
    pub const ALL: [NoteKind; 4] = [Self::Note, Self::Adr, Self::Snippet, Self::Daily];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Adr => "adr",
            Self::Snippet => "snippet",
            Self::Daily => "daily",
        }
    }
}

impl Display for NoteKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteKind {
    type Err = NoteValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "note" => Ok(Self::Note),
            "adr" => Ok(Self::Adr),
            "snippet" => Ok(Self::Snippet),
            "daily" => Ok(Self::Daily),
            _ => Err(NoteValidationError::InvalidKind(value.to_string())),
        }
    }
}

/// Lifecycle state that decides where an undated note is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteStatus {
    /// Captured but not yet filed under a domain.
    Inbox,
    /// Filed under its domain.
    Active,
    /// Kept for reference only.
    Archived,
}

impl NoteStatus {
    pub const ALL: [NoteStatus; 3] = [Self::Inbox, Self::Active, Self::Archived];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inbox => "inbox",
            Self::Active => "active",
            Self::Archived => "archived",
        }
    }
}

impl Display for NoteStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteStatus {
    type Err = NoteValidationError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "inbox" => Ok(Self::Inbox),
            "active" => Ok(Self::Active),
            "archived" => Ok(Self::Archived),
            _ => Err(NoteValidationError::InvalidStatus(value.to_string())),
        }
    }
}

/// Canonical note record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// ULID, immutable and unique across the vault.
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Kebab-case topic, empty when the note is not filed.
    pub domain: String,
    /// Kebab-case tags; persisted sorted and deduplicated.
    pub tags: Vec<String>,
    /// `None` means "derive on next normalization".
    pub status: Option<NoteStatus>,
    pub kind: NoteKind,
    /// Opaque references, usually other note ids. Kept verbatim.
    pub links: Vec<String>,
    pub body: String,
}

impl Note {
    /// Creates a note with empty metadata and both timestamps set to `now`.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        kind: NoteKind,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            created_at: now,
            updated_at: now,
            domain: String::new(),
            tags: Vec::new(),
            status: None,
            kind,
            links: Vec::new(),
            body: String::new(),
        }
    }

    /// Returns this note with status resolved and tags sorted and deduplicated.
    ///
    /// Tag values are not lowercased here; a malformed user-supplied tag
    /// must fail validation instead.
    pub fn normalized(mut self) -> Self {
        self.status = Some(normalize_status(&self));
        self.tags = dedupe_tags(&self.tags);
        self
    }

    /// Effective status, derived when unset.
    pub fn effective_status(&self) -> NoteStatus {
        normalize_status(self)
    }
}

/// A parsed note paired with the file it was read from.
///
/// Produced by read operations only; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteFile {
    /// Absolute (root-joined) file path.
    pub path: PathBuf,
    /// Vault-relative path with `/` separators.
    pub rel_path: String,
    pub note: Note,
}

/// Validation failure for note writes and parsed note content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    EmptyId,
    InvalidId(String),
    EmptyTitle,
    InvalidKind(String),
    InvalidStatus(String),
    InvalidDomain(String),
    InvalidTag(String),
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "note id cannot be empty"),
            Self::InvalidId(value) => {
                write!(f, "invalid note id {value:?}: expected a 26-character ULID")
            }
            Self::EmptyTitle => write!(f, "note title cannot be empty"),
            Self::InvalidKind(value) => {
                write!(f, "invalid kind {value:?}: expected note|adr|snippet|daily")
            }
            Self::InvalidStatus(value) => {
                write!(f, "invalid status {value:?}: expected inbox|active|archived")
            }
            Self::InvalidDomain(value) => {
                write!(f, "invalid domain {value:?}: use lowercase kebab-case")
            }
            Self::InvalidTag(value) => write!(f, "invalid tag {value:?}: use lowercase kebab-case"),
        }
    }
}

impl Error for NoteValidationError {}

/// Tag set mutation requested by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagAction {
    Add,
    Remove,
}

impl FromStr for TagAction {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "add" => Ok(Self::Add),
            "rm" | "remove" => Ok(Self::Remove),
            other => Err(format!("invalid tag action {other:?}: expected add|rm")),
        }
    }
}

/// Returns the stored status, or derives one when unset.
///
/// Derivation: daily notes are `active`; notes without a domain are
/// `inbox`; everything else is `active`.
pub fn normalize_status(note: &Note) -> NoteStatus {
    note.status.unwrap_or_else(|| derive_status(note))
}

fn derive_status(note: &Note) -> NoteStatus {
    match note.kind {
        NoteKind::Daily => NoteStatus::Active,
        NoteKind::Note | NoteKind::Adr | NoteKind::Snippet => {
            if note.domain.trim().is_empty() {
                NoteStatus::Inbox
            } else {
                NoteStatus::Active
            }
        }
    }
}

/// Returns the first validation failure, if any.
pub fn validate_for_write(note: &Note) -> Result<(), NoteValidationError> {
    match validate_all(note).into_iter().next() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Runs every write check and returns all failures in field order.
pub fn validate_all(note: &Note) -> Vec<NoteValidationError> {
    let mut errors = Vec::new();

    let id = note.id.trim();
    if id.is_empty() {
        errors.push(NoteValidationError::EmptyId);
    } else if !is_valid_note_id(id) {
        errors.push(NoteValidationError::InvalidId(note.id.clone()));
    }

    if note.title.trim().is_empty() {
        errors.push(NoteValidationError::EmptyTitle);
    }

    if !note.domain.is_empty() && !is_kebab_case(&note.domain) {
        errors.push(NoteValidationError::InvalidDomain(note.domain.clone()));
    }

    for tag in &note.tags {
        if !is_kebab_case(tag) {
            errors.push(NoteValidationError::InvalidTag(tag.clone()));
        }
    }

    errors
}

/// Returns whether `value` is lowercase kebab-case.
pub fn is_kebab_case(value: &str) -> bool {
    KEBAB_CASE_RE.is_match(value)
}

/// Lowercases, trims, deduplicates and sorts tag values. Blank values drop.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut unique = BTreeSet::new();
    for tag in tags {
        let trimmed = tag.trim();
        if !trimmed.is_empty() {
            unique.insert(trimmed.to_lowercase());
        }
    }
    unique.into_iter().collect()
}

/// Sorts and deduplicates tag values without rewriting them.
pub fn dedupe_tags(tags: &[String]) -> Vec<String> {
    let unique: BTreeSet<&String> = tags.iter().collect();
    unique.into_iter().cloned().collect()
}

/// Applies one tag action and returns the sorted, deduplicated result.
pub fn update_tags(tags: &[String], action: TagAction, tag: &str) -> Vec<String> {
    let mut set: BTreeSet<String> = tags.iter().cloned().collect();
    match action {
        TagAction::Add => {
            set.insert(tag.to_string());
        }
        TagAction::Remove => {
            set.remove(tag);
        }
    }
    set.into_iter().collect()
}

/// Splits a comma-separated tag list, normalizing like [`normalize_tags`].
pub fn parse_csv(value: &str) -> Vec<String> {
    let pieces: Vec<String> = value.split(',').map(str::to_string).collect();
    normalize_tags(&pieces)
}
