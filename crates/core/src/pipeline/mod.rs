//! Batch pipeline collaborators.
//!
//! The engine itself performs no I/O. This module supplies the pieces that move records in and
//! out of it:
//! - [`reader`]: the [`RecordReader`] trait and a directory-of-bundles reader
//! - [`writer`]: the [`BundleWriter`] trait, a FHIR bundle file writer and a Beacon catalog
//!   file writer
//! - [`retry`]: a fixed-backoff retrying wrapper around any writer
//! - [`job`]: the batch job that ties reader, router, assembler and writer together

pub mod job;
pub mod reader;
pub mod retry;
pub mod writer;

pub use job::{RunSummary, TransferJob};
pub use reader::{BundleDirReader, RecordReader};
pub use retry::RetryingWriter;
pub use writer::{BeaconFileWriter, BundleWriter, FileBundleWriter};

use crate::error::TransformError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("I/O error on {path}: {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid input file {path}: {message}", path = path.display())]
    InvalidInput { path: PathBuf, message: String },
    #[error("failed to serialize output: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error("write failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<PipelineError>,
    },
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns whether a retry might succeed. Only I/O failures qualify.
    pub fn is_transient(&self) -> bool {
        matches!(self, PipelineError::Io { .. })
    }
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
