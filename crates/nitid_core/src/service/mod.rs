//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep front-ends decoupled from file layout details.

pub mod note_service;
pub mod selector;
pub mod validate;
