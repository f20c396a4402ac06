//! Exact-match note filter.

use crate::model::note::{Note, NoteKind, NoteStatus};

/// Optional constraints on a note listing. `None` means no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFilter {
    pub domain: Option<String>,
    /// Set membership against `Note::tags`.
    pub tag: Option<String>,
    /// Compared against the effective (derived when unset) status.
    pub status: Option<NoteStatus>,
    pub kind: Option<NoteKind>,
}

impl NoteFilter {
    /// Filter that accepts every note.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_status(mut self, status: NoteStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_kind(mut self, kind: NoteKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Returns whether `note` satisfies every present constraint.
    pub fn matches(&self, note: &Note) -> bool {
        if let Some(domain) = &self.domain {
            if note.domain != *domain {
                return false;
            }
        }
        if let Some(tag) = &self.tag {
            if !note.tags.iter().any(|value| value == tag) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if note.effective_status() != status {
                return false;
            }
        }
        if let Some(kind) = self.kind {
            if note.kind != kind {
                return false;
            }
        }
        true
    }
}
