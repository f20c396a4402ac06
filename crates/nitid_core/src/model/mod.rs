//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical `Note` record and its closed kind/status variants.
//! - Own identifier generation and title slugs used in file names.
//!
//! # Invariants
//! - Every note is identified by an immutable ULID, unique across the vault.
//! - `domain` and `tags` are lowercase kebab-case; user input is validated,
//!   never silently coerced.

pub mod id;
pub mod note;
pub mod slug;
