//! Collection queries over parsed notes.
//!
//! # Responsibility
//! - Filter predicates, deterministic sort orders and substring search.
//! - Short display forms for note ids.
//!
//! # Invariants
//! - Every ordering is total: ties always fall back to `id`.

pub mod filter;
pub mod find;
pub mod sort;
