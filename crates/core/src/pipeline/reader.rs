use super::{PipelineError, PipelineResult};
use crate::record::ClinicalRecord;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

/// Supplies input records one batch at a time.
pub trait RecordReader {
    /// The next batch, or `None` once input is exhausted. An empty batch also ends input.
    fn next_batch(&mut self) -> PipelineResult<Option<Vec<ClinicalRecord>>>;
}

/// Reads every `*.json` FHIR Bundle in a directory, in file name order, one batch per file.
///
/// Entries without a resource (search metadata, outcome-only entries) are skipped, and so are
/// files holding no resources, since an empty batch would end input.
#[derive(Debug)]
pub struct BundleDirReader {
    pending: VecDeque<PathBuf>,
}

impl BundleDirReader {
    /// List the bundle files of `dir`.
    pub fn open(dir: &Path) -> PipelineResult<Self> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir).map_err(|e| PipelineError::io(dir, e))? {
            let path = entry.map_err(|e| PipelineError::io(dir, e))?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
        files.sort();

        tracing::debug!(dir = %dir.display(), files = files.len(), "found input bundles");
        Ok(Self {
            pending: files.into(),
        })
    }

    /// Files not yet read.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    fn read_bundle(path: &Path) -> PipelineResult<Vec<ClinicalRecord>> {
        let text = fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
        let invalid = |err: fhir::FhirError| PipelineError::InvalidInput {
            path: path.to_path_buf(),
            message: err.to_string(),
        };

        let bundle = fhir::Bundle::parse(&text).map_err(invalid)?;
        let resources = bundle.resources().map_err(invalid)?;
        Ok(resources.into_iter().map(ClinicalRecord::from).collect())
    }
}

impl RecordReader for BundleDirReader {
    fn next_batch(&mut self) -> PipelineResult<Option<Vec<ClinicalRecord>>> {
        while let Some(path) = self.pending.pop_front() {
            let records = Self::read_bundle(&path)?;
            if records.is_empty() {
                tracing::debug!(file = %path.display(), "input bundle holds no resources");
                continue;
            }
            tracing::info!(file = %path.display(), records = records.len(), "read input bundle");
            return Ok(Some(records));
        }
        Ok(None)
    }
}
