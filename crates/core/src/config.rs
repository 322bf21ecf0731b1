//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into the engine and pipeline. Nothing below the binaries reads environment variables;
//! the runner resolves them (with `.env` support) and hands a validated [`TransferConfig`] in.

use crate::constants::{DEFAULT_OUTPUT_DIR, DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_BACKOFF_MS};
use crate::direction::Direction;
use crate::error::{TransformError, TransformResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Fixed-backoff retry settings for the writer collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Duration,
}

impl RetryPolicy {
    /// Create a policy.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::InvalidConfig`] if `max_attempts` is zero.
    pub fn new(max_attempts: u32, backoff: Duration) -> TransformResult<Self> {
        if max_attempts == 0 {
            return Err(TransformError::InvalidConfig(
                "retry attempts must be at least 1".into(),
            ));
        }
        Ok(Self {
            max_attempts,
            backoff,
        })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn backoff(&self) -> Duration {
        self.backoff
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RETRY_ATTEMPTS,
            backoff: Duration::from_millis(DEFAULT_RETRY_BACKOFF_MS),
        }
    }
}

/// Paths of the translation tables of one run. Unset tables are not loaded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TablePaths {
    pub sample_type: Option<PathBuf>,
    pub diagnosis: Option<PathBuf>,
    pub cause_of_death: Option<PathBuf>,
}

/// Transfer configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct TransferConfig {
    direction: Direction,
    input_dir: PathBuf,
    output_dir: PathBuf,
    tables: TablePaths,
    id_mapping_csv: Option<PathBuf>,
    retry: RetryPolicy,
}

impl TransferConfig {
    /// Create a new `TransferConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::InvalidConfig`] if:
    /// - `input_dir` is not an existing directory,
    /// - the direction translates sample types but no sample type table is configured,
    /// - a configured table or id mapping file does not exist,
    /// - an id mapping file is configured for a direction that does not cross id domains.
    pub fn new(
        direction: Direction,
        input_dir: PathBuf,
        output_dir: Option<PathBuf>,
        tables: TablePaths,
        id_mapping_csv: Option<PathBuf>,
        retry: RetryPolicy,
    ) -> TransformResult<Self> {
        if !input_dir.is_dir() {
            return Err(TransformError::InvalidConfig(format!(
                "input directory {} does not exist",
                input_dir.display()
            )));
        }

        if direction.needs_sample_type_table() && tables.sample_type.is_none() {
            return Err(TransformError::InvalidConfig(format!(
                "direction {direction} requires a sample type concept map"
            )));
        }

        for path in [
            tables.sample_type.as_ref(),
            tables.diagnosis.as_ref(),
            tables.cause_of_death.as_ref(),
            id_mapping_csv.as_ref(),
        ]
        .into_iter()
        .flatten()
        {
            if !path.is_file() {
                return Err(TransformError::InvalidConfig(format!(
                    "configured file {} does not exist",
                    path.display()
                )));
            }
        }

        if id_mapping_csv.is_some() && direction.id_domains().is_none() {
            return Err(TransformError::InvalidConfig(format!(
                "direction {direction} does not map identifiers between domains"
            )));
        }

        Ok(Self {
            direction,
            input_dir,
            output_dir: output_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            tables,
            id_mapping_csv,
            retry,
        })
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn sample_type_map(&self) -> Option<&Path> {
        self.tables.sample_type.as_deref()
    }

    pub fn diagnosis_map(&self) -> Option<&Path> {
        self.tables.diagnosis.as_deref()
    }

    pub fn cause_of_death_map(&self) -> Option<&Path> {
        self.tables.cause_of_death.as_deref()
    }

    pub fn id_mapping_csv(&self) -> Option<&Path> {
        self.id_mapping_csv.as_deref()
    }

    pub fn retry(&self) -> RetryPolicy {
        self.retry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn rejects_zero_retry_attempts() {
        let err = RetryPolicy::new(0, Duration::from_secs(1)).expect_err("should reject zero");
        match err {
            TransformError::InvalidConfig(msg) => assert!(msg.contains("at least 1")),
            other => panic!("expected InvalidConfig error, got {other:?}"),
        }
    }

    #[test]
    fn copy_direction_needs_no_tables() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config = TransferConfig::new(
            Direction::Copy,
            temp_dir.path().to_path_buf(),
            None,
            TablePaths::default(),
            None,
            RetryPolicy::default(),
        )
        .expect("valid config");

        assert_eq!(config.output_dir(), Path::new(DEFAULT_OUTPUT_DIR));
        assert_eq!(config.retry().max_attempts(), DEFAULT_RETRY_ATTEMPTS);
    }

    #[test]
    fn biobank_directions_require_sample_type_table() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let err = TransferConfig::new(
            Direction::Bbmri2Mii,
            temp_dir.path().to_path_buf(),
            None,
            TablePaths::default(),
            None,
            RetryPolicy::default(),
        )
        .expect_err("should require sample type table");

        match err {
            TransformError::InvalidConfig(msg) => assert!(msg.contains("sample type")),
            other => panic!("expected InvalidConfig error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_missing_input_dir_and_missing_tables() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let missing_input = TransferConfig::new(
            Direction::Copy,
            temp_dir.path().join("absent"),
            None,
            TablePaths::default(),
            None,
            RetryPolicy::default(),
        );
        assert!(missing_input.is_err());

        let missing_table = TransferConfig::new(
            Direction::Mii2Bbmri,
            temp_dir.path().to_path_buf(),
            None,
            TablePaths {
                sample_type: Some(temp_dir.path().join("absent.json")),
                ..TablePaths::default()
            },
            None,
            RetryPolicy::default(),
        );
        assert!(matches!(missing_table, Err(TransformError::InvalidConfig(_))));
    }

    #[test]
    fn id_mapping_only_for_domain_crossing_directions() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let csv_path = temp_dir.path().join("ids.csv");
        std::fs::write(&csv_path, "bbmri,mii\na,b\n").expect("write csv");

        let err = TransferConfig::new(
            Direction::Copy,
            temp_dir.path().to_path_buf(),
            None,
            TablePaths::default(),
            Some(csv_path),
            RetryPolicy::default(),
        )
        .expect_err("copy does not cross id domains");
        assert!(matches!(err, TransformError::InvalidConfig(_)));
    }
}
