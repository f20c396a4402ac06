//! Deterministic note orderings and short id forms.
//!
//! # Invariants
//! - `sort_notes` is stable and total: ties on the primary key fall back to
//!   `id` in the same direction.
//! - `unique_id_prefixes` never returns a form shared with another id.

use crate::model::note::NoteFile;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Primary sort key for note listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    #[default]
    Updated,
    Created,
    /// Case-insensitive title order.
    Title,
    Id,
}

impl SortMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Updated => "updated",
            Self::Created => "created",
            Self::Title => "title",
            Self::Id => "id",
        }
    }
}

impl Display for SortMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "updated" => Ok(Self::Updated),
            "created" => Ok(Self::Created),
            "title" => Ok(Self::Title),
            "id" => Ok(Self::Id),
            other => Err(format!(
                "invalid sort {other:?}: expected updated|created|title|id"
            )),
        }
    }
}

/// Sorts `notes` in place by `mode`, breaking ties by id.
pub fn sort_notes(notes: &mut [NoteFile], mode: SortMode, ascending: bool) {
    notes.sort_by(|left, right| {
        let (a, b) = (&left.note, &right.note);
        let primary = match mode {
            SortMode::Updated => a.updated_at.cmp(&b.updated_at),
            SortMode::Created => a.created_at.cmp(&b.created_at),
            SortMode::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortMode::Id => Ordering::Equal,
        };
        let ordering = primary.then_with(|| a.id.cmp(&b.id));
        if ascending {
            ordering
        } else {
            ordering.reverse()
        }
    });
}

/// Maps each id to its shortest prefix of at least `min_len` characters
/// that no other id in `notes` starts with.
///
/// Falls back to the full id when no shorter form is unique. A `min_len`
/// of zero is treated as one.
pub fn unique_id_prefixes(notes: &[NoteFile], min_len: usize) -> BTreeMap<String, String> {
    let min_len = min_len.max(1);
    let ids: Vec<&str> = notes.iter().map(|item| item.note.id.as_str()).collect();

    let mut out = BTreeMap::new();
    for (index, id) in ids.iter().enumerate() {
        let mut short = id.to_string();
        for len in min_len..id.len() {
            let Some(prefix) = id.get(..len) else {
                break;
            };
            let shared = ids
                .iter()
                .enumerate()
                .any(|(other, value)| other != index && value.starts_with(prefix));
            if !shared {
                short = prefix.to_string();
                break;
            }
        }
        out.insert(id.to_string(), short);
    }
    out
}
