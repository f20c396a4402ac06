//! Repository layer over the vault directory.
//!
//! # Responsibility
//! - Define use-case oriented note storage contracts.
//! - Keep file placement and relocation inside one persistence boundary.
//!
//! # Invariants
//! - Writes validate the note and place it at its canonical path.
//! - Reads reject invalid on-disk content instead of masking it.

pub mod note_repo;
