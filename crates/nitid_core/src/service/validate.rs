//! Whole-vault consistency check.
//!
//! # Responsibility
//! - Scan every note file, isolating per-file failures into a report.
//! - Detect duplicate ids and notes stored away from their canonical path.
//!
//! # Invariants
//! - `total` counts every `.md` file visited, valid or not.
//! - `errors` and `warnings` are sorted by their rendered message.

use crate::repo::note_repo::{NoteRepository, RepoResult};
use crate::vault::layout::{resolve_note_path, to_rel_path};
use crate::vault::VaultError;
use log::info;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// One validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValidationIssue {
    /// File could not be read or parsed.
    Unreadable { rel_path: String, message: String },
    /// Two files carry the same id.
    DuplicateId {
        id: String,
        first: String,
        second: String,
    },
    /// Note parsed fine but lives away from its canonical path.
    Misplaced { rel_path: String, expected: String },
}

impl Display for ValidationIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unreadable { rel_path, message } => write!(f, "{rel_path}: {message}"),
            Self::DuplicateId { id, first, second } => {
                write!(f, "duplicate id {id}: {first} and {second}")
            }
            Self::Misplaced { rel_path, expected } => {
                write!(f, "{rel_path} expected at {expected}")
            }
        }
    }
}

/// Result of [`validate_vault`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub total: usize,
    pub warnings: Vec<ValidationIssue>,
    pub errors: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// No errors and no warnings.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// Validates every note file under the vault root of `repo`.
///
/// Only traversal failures abort; everything else becomes a report entry.
pub fn validate_vault<R>(repo: &R) -> RepoResult<ValidationReport>
where
    R: NoteRepository + ?Sized,
{
    let started_at = Instant::now();
    let scan = repo.scan_all()?;

    let mut report = ValidationReport {
        total: scan.total,
        ..ValidationReport::default()
    };
    for failure in scan.failures {
        report.errors.push(ValidationIssue::Unreadable {
            rel_path: failure.rel_path,
            message: failure_detail(&failure.error),
        });
    }

    let mut seen_ids: HashMap<&str, &str> = HashMap::new();
    for item in &scan.notes {
        match seen_ids.get(item.note.id.as_str()) {
            Some(first) => report.errors.push(ValidationIssue::DuplicateId {
                id: item.note.id.clone(),
                first: first.to_string(),
                second: item.rel_path.clone(),
            }),
            None => {
                seen_ids.insert(&item.note.id, &item.rel_path);
            }
        }

        let expected = resolve_note_path(repo.root(), &item.note);
        if expected != item.path {
            report.warnings.push(ValidationIssue::Misplaced {
                rel_path: item.rel_path.clone(),
                expected: to_rel_path(repo.root(), &expected),
            });
        }
    }

    report.errors.sort_by_key(ToString::to_string);
    report.warnings.sort_by_key(ToString::to_string);

    info!(
        "event=vault_validate module=service status=ok total={} warnings={} errors={} duration_ms={}",
        report.total,
        report.warnings.len(),
        report.errors.len(),
        started_at.elapsed().as_millis()
    );
    Ok(report)
}

fn failure_detail(error: &VaultError) -> String {
    match error {
        VaultError::Io { source, .. } => source.to_string(),
        VaultError::Parse { source, .. } => source.to_string(),
        other => other.to_string(),
    }
}
