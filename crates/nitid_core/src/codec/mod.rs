//! On-disk note text format.
//!
//! # Responsibility
//! - Render notes as a fixed-order frontmatter header plus markdown body.
//! - Parse note files back, rejecting malformed or invalid content.
//!
//! # Invariants
//! - `parse_note(&render_note(n))` reproduces every field of a valid note,
//!   with tags sorted/deduplicated and status normalized.
//! - A successfully parsed note always passes write validation.

pub mod frontmatter;
