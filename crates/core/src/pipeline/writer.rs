use super::{PipelineError, PipelineResult};
use crate::bundle::Bundle;
use crate::constants::BUNDLE_FILE_PREFIX;
use crate::record::ClinicalRecord;
use beacon::{BIOSAMPLES_COLLECTION, INDIVIDUALS_COLLECTION};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Persists assembled bundles.
pub trait BundleWriter {
    fn write(&mut self, bundle: &Bundle) -> PipelineResult<()>;
}

impl<W: BundleWriter + ?Sized> BundleWriter for Box<W> {
    fn write(&mut self, bundle: &Bundle) -> PipelineResult<()> {
        (**self).write(bundle)
    }
}

fn ensure_dir(dir: &Path) -> PipelineResult<()> {
    fs::create_dir_all(dir).map_err(|e| PipelineError::io(dir, e))
}

/// Writes each bundle as a FHIR transaction to `bundle_<n>.json`, counting from 1.
#[derive(Debug)]
pub struct FileBundleWriter {
    dir: PathBuf,
    written: usize,
}

impl FileBundleWriter {
    /// Create the writer, creating `dir` if needed.
    pub fn new(dir: impl Into<PathBuf>) -> PipelineResult<Self> {
        let dir = dir.into();
        ensure_dir(&dir)?;
        Ok(Self { dir, written: 0 })
    }

    pub fn written(&self) -> usize {
        self.written
    }
}

impl BundleWriter for FileBundleWriter {
    fn write(&mut self, bundle: &Bundle) -> PipelineResult<()> {
        let text = serde_json::to_string_pretty(&bundle.to_fhir()?)?;
        let path = self
            .dir
            .join(format!("{BUNDLE_FILE_PREFIX}{}.json", self.written + 1));

        fs::write(&path, text).map_err(|e| PipelineError::io(&path, e))?;
        self.written += 1;
        tracing::info!(bundle = bundle.id(), file = %path.display(), "wrote bundle");
        Ok(())
    }
}

/// Writes Beacon catalog records into `individuals.json` and `biosamples.json`.
///
/// Each file holds one JSON array. Records are merged into what the file already holds: an entry
/// with the same `id` is replaced, new entries are appended.
#[derive(Debug)]
pub struct BeaconFileWriter {
    dir: PathBuf,
}

impl BeaconFileWriter {
    /// Create the writer, creating `dir` if needed.
    pub fn new(dir: impl Into<PathBuf>) -> PipelineResult<Self> {
        let dir = dir.into();
        ensure_dir(&dir)?;
        Ok(Self { dir })
    }

    fn collection_path(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{collection}.json"))
    }

    fn merge(&self, collection: &str, documents: Vec<Value>) -> PipelineResult<()> {
        if documents.is_empty() {
            return Ok(());
        }

        let path = self.collection_path(collection);
        let mut existing: Vec<Value> = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).map_err(|e| PipelineError::InvalidInput {
                path: path.clone(),
                message: format!("expected a JSON array of {collection}: {e}"),
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(PipelineError::io(&path, e)),
        };

        let added = documents.len();
        for document in documents {
            let slot = existing
                .iter_mut()
                .find(|current| current.get("id").is_some() && current.get("id") == document.get("id"));
            match slot {
                Some(current) => *current = document,
                None => existing.push(document),
            }
        }

        let text = serde_json::to_string_pretty(&existing)?;
        fs::write(&path, text).map_err(|e| PipelineError::io(&path, e))?;
        tracing::info!(
            collection,
            added,
            total = existing.len(),
            file = %path.display(),
            "merged catalog records"
        );
        Ok(())
    }
}

impl BundleWriter for BeaconFileWriter {
    fn write(&mut self, bundle: &Bundle) -> PipelineResult<()> {
        let mut individuals = Vec::new();
        let mut biosamples = Vec::new();

        for record in bundle.records() {
            match record {
                ClinicalRecord::Individual(individual) => {
                    individuals.push(serde_json::to_value(individual)?)
                }
                ClinicalRecord::Biosample(biosample) => {
                    biosamples.push(serde_json::to_value(biosample)?)
                }
                other => tracing::warn!(
                    kind = %other.kind(),
                    id = other.id().unwrap_or("<none>"),
                    "non-catalog record skipped by catalog writer"
                ),
            }
        }

        self.merge(INDIVIDUALS_COLLECTION, individuals)?;
        self.merge(BIOSAMPLES_COLLECTION, biosamples)
    }
}
