//! Identifier utilities for the TransFAIR engine.
//!
//! Mapping rules sometimes need identifiers that do not exist in the source data: every output
//! bundle gets a fresh id, and a specimen carrying a diagnosis extension spawns a new Condition
//! that needs one too. This crate provides:
//! - The [`IdSource`] trait, injected wherever fresh identifiers are minted, so tests and replays
//!   can substitute a deterministic sequence.
//! - [`RandomIds`], the production source (UUID v4, hyphenated).
//! - [`SequentialIds`], a deterministic source for tests.
//! - [`ResourceId`], a validated FHIR logical id.
//!
//! ## FHIR logical id form
//! - Length: 1 to 64
//! - Characters: `A-Z`, `a-z`, `0-9`, `-` and `.`
//!
//! Hyphenated UUIDs (36 characters) satisfy this form.

mod service;

// Re-export public types
pub use service::{IdSource, RandomIds, ResourceId, SequentialIds, Uuid};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum IdError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type IdResult<T> = Result<T, IdError>;
