//! Internal implementation of identifier sources and the validated id type.

use crate::{IdError, IdResult};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

/// Re-exported for convenience.
pub use ::uuid::Uuid;

/// Maximum length of a FHIR logical id.
const MAX_ID_LEN: usize = 64;

/// A source of fresh, unique identifiers.
///
/// Implementations must be safe to share between threads: the engine holds one source behind an
/// `Arc` and may call it from rules running concurrently.
pub trait IdSource: Send + Sync {
    /// Mint a new identifier. Every call returns a value not returned before.
    fn next_id(&self) -> ResourceId;
}

/// Random UUID v4 identifiers in hyphenated form.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn next_id(&self) -> ResourceId {
        ResourceId(Uuid::new_v4().hyphenated().to_string())
    }
}

/// Deterministic identifiers `<prefix>-1`, `<prefix>-2`, ...
///
/// Useful in tests and when re-running a transfer must reproduce the same output.
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialIds {
    /// Create a sequence with the given prefix.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::InvalidInput`] if the prefix contains characters not allowed in a FHIR
    /// id or is too long to leave room for a counter.
    pub fn new(prefix: &str) -> IdResult<Self> {
        if prefix.is_empty() || prefix.len() > MAX_ID_LEN - 21 || !ResourceId::is_valid(prefix) {
            return Err(IdError::InvalidInput(format!(
                "sequence prefix must be a short FHIR id fragment, got: '{prefix}'"
            )));
        }
        Ok(Self {
            prefix: prefix.to_string(),
            counter: AtomicU64::new(0),
        })
    }
}

impl IdSource for SequentialIds {
    fn next_id(&self) -> ResourceId {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        ResourceId(format!("{}-{n}", self.prefix))
    }
}

/// A FHIR logical id that has passed validation.
///
/// # Construction
/// - [`ResourceId::parse`] validates an externally supplied identifier.
/// - [`IdSource::next_id`] mints a new one.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(String);

impl ResourceId {
    /// Validate and wrap an identifier.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::InvalidInput`] if `input` is empty, longer than 64 characters or contains
    /// characters other than ASCII letters, digits, `-` and `.`.
    pub fn parse(input: &str) -> IdResult<Self> {
        if Self::is_valid(input) {
            return Ok(Self(input.to_string()));
        }
        Err(IdError::InvalidInput(format!(
            "id must be 1-64 characters of [A-Za-z0-9-.], got: '{input}'"
        )))
    }

    /// Returns true if `input` is a syntactically valid FHIR logical id.
    pub fn is_valid(input: &str) -> bool {
        !input.is_empty()
            && input.len() <= MAX_ID_LEN
            && input
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'.')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ResourceId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for ResourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
