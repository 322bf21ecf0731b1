//! Code translation tables.
//!
//! A [`ConceptMap`] translates codes of one fixed source terminology into codes of one fixed
//! target terminology. Tables are built once at startup from caller-supplied mapping data and are
//! immutable afterwards; the engine shares them between rules behind an `Arc`.
//!
//! Responsibilities:
//! - Parse FHIR `ConceptMap` resources (every `group[].element[].code -> target[0].code`)
//! - Parse the simpler YAML and CSV pair formats used for hand-maintained tables
//! - Group the named tables a direction needs into [`TranslationTables`]
//!
//! Notes:
//! - forward and reverse tables for the same terminology pair are loaded independently; neither is
//!   derived from the other, since mapping data need not be one-to-one
//! - a missing, unreadable or empty source is an error; a code missing from a loaded table is
//!   not, each rule decides its own fallback

use crate::config::TransferConfig;
use crate::error::{TransformError, TransformResult};
use serde::Deserialize;
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

// ============================================================================
// Public domain-level types
// ============================================================================

/// Errors raised while building a translation table.
#[derive(Debug, thiserror::Error)]
pub enum ConceptMapError {
    #[error("failed to read concept map {path}: {source}", path = path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed concept map JSON: {0}")]
    Json(String),
    #[error("malformed concept map YAML: {0}")]
    Yaml(String),
    #[error("malformed concept map CSV: {0}")]
    Csv(String),
    #[error("unsupported concept map format for {path} (expected .json, .yaml, .yml or .csv)", path = path.display())]
    UnsupportedFormat { path: PathBuf },
    #[error("concept map '{0}' contains no mappings")]
    Empty(String),
}

/// An immutable code-to-code lookup table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConceptMap {
    name: String,
    source_system: Option<String>,
    target_system: Option<String>,
    entries: HashMap<String, String>,
}

impl ConceptMap {
    /// Build a table from `(source code, target code)` pairs.
    ///
    /// When a source code appears more than once the first target is kept and a warning is
    /// logged.
    ///
    /// # Errors
    ///
    /// Returns [`ConceptMapError::Empty`] if no pair has a non-empty source and target code.
    pub fn from_pairs<I, S, T>(
        name: &str,
        source_system: Option<String>,
        target_system: Option<String>,
        pairs: I,
    ) -> Result<Self, ConceptMapError>
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        let mut entries = HashMap::new();

        for (source, target) in pairs {
            let source = source.into().trim().to_string();
            let target = target.into().trim().to_string();
            if source.is_empty() || target.is_empty() {
                tracing::debug!(table = name, "skipping concept map pair with empty code");
                continue;
            }

            match entries.entry(source) {
                Entry::Vacant(slot) => {
                    slot.insert(target);
                }
                Entry::Occupied(slot) => {
                    if slot.get() != &target {
                        tracing::warn!(
                            table = name,
                            code = slot.key().as_str(),
                            kept = slot.get().as_str(),
                            ignored = target.as_str(),
                            "duplicate source code in concept map; keeping first target"
                        );
                    }
                }
            }
        }

        if entries.is_empty() {
            return Err(ConceptMapError::Empty(name.to_string()));
        }

        Ok(Self {
            name: name.to_string(),
            source_system,
            target_system,
            entries,
        })
    }

    /// Build a table from a FHIR `ConceptMap` resource in JSON.
    ///
    /// All groups are read; the source and target systems are taken from the first group that
    /// declares them.
    pub fn from_fhir_json(name: &str, json_text: &str) -> Result<Self, ConceptMapError> {
        let deserializer = &mut serde_json::Deserializer::from_str(json_text);
        let wire: ConceptMapWire = serde_path_to_error::deserialize(deserializer)
            .map_err(|err| ConceptMapError::Json(path_error_message(name, err)))?;

        if wire.resource_type != "ConceptMap" {
            return Err(ConceptMapError::Json(format!(
                "{name}: expected resourceType 'ConceptMap', got '{}'",
                wire.resource_type
            )));
        }

        let source_system = wire.group.iter().find_map(|g| g.source.clone());
        let target_system = wire.group.iter().find_map(|g| g.target.clone());
        if let Some(first) = &source_system {
            if wire
                .group
                .iter()
                .any(|g| g.source.as_ref().is_some_and(|s| s != first))
            {
                tracing::warn!(table = name, "concept map groups declare different source systems");
            }
        }

        let pairs = wire.group.into_iter().flat_map(|g| g.element).filter_map(|e| {
            let target = e.target.into_iter().find_map(|t| t.code)?;
            Some((e.code?, target))
        });

        Self::from_pairs(name, source_system, target_system, pairs)
    }

    /// Build a table from the YAML pair format:
    ///
    /// ```yaml
    /// source_system: https://fhir.bbmri.de/CodeSystem/SampleMaterialType
    /// target_system: http://snomed.info/sct
    /// mappings:
    ///   - source: whole-blood
    ///     target: "420135007"
    /// ```
    pub fn from_yaml(name: &str, yaml_text: &str) -> Result<Self, ConceptMapError> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);
        let wire: PairFileWire = serde_path_to_error::deserialize(deserializer)
            .map_err(|err| ConceptMapError::Yaml(path_error_message(name, err)))?;

        let pairs = wire.mappings.into_iter().map(|m| (m.source, m.target));
        Self::from_pairs(name, wire.source_system, wire.target_system, pairs)
    }

    /// Build a table from CSV with a `source,target` header row.
    ///
    /// ```text
    /// source,target
    /// whole-blood,420135007
    /// serum,119364003
    /// ```
    ///
    /// The format carries no system URLs.
    pub fn from_csv(name: &str, csv_text: &str) -> Result<Self, ConceptMapError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(csv_text.as_bytes());

        let pairs = reader
            .deserialize::<PairWire>()
            .map(|row| {
                row.map(|pair| (pair.source, pair.target))
                    .map_err(|err| ConceptMapError::Csv(format!("{name}: {err}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_pairs(name, None, None, pairs)
    }

    /// Load a table from a file, choosing the parser by extension.
    ///
    /// The table is named after the file stem.
    pub fn load(path: &Path) -> Result<Self, ConceptMapError> {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase());
        let parse: fn(&str, &str) -> Result<Self, ConceptMapError> = match extension.as_deref() {
            Some("json") => Self::from_fhir_json,
            Some("yaml") | Some("yml") => Self::from_yaml,
            Some("csv") => Self::from_csv,
            _ => {
                return Err(ConceptMapError::UnsupportedFormat {
                    path: path.to_path_buf(),
                })
            }
        };

        let text = std::fs::read_to_string(path).map_err(|source| ConceptMapError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let map = parse(&name, &text)?;
        tracing::info!(table = name.as_str(), entries = map.len(), "loaded concept map");
        Ok(map)
    }

    /// Translate `code`. `None` means the table has no entry for it.
    pub fn lookup(&self, code: &str) -> Option<&str> {
        self.entries.get(code).map(String::as_str)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source_system(&self) -> Option<&str> {
        self.source_system.as_deref()
    }

    pub fn target_system(&self) -> Option<&str> {
        self.target_system.as_deref()
    }

    /// Number of source codes with a translation.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for a constructed table; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All `(source, target)` pairs, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(s, t)| (s.as_str(), t.as_str()))
    }
}

/// The named translation tables of one run.
///
/// The diagnosis and cause-of-death tables are configured independently even though both
/// translate between ICD-10 variants.
#[derive(Clone, Debug, Default)]
pub struct TranslationTables {
    /// Sample material type: BBMRI.de to SNOMED CT, or the reverse, depending on direction.
    pub sample_type: Option<Arc<ConceptMap>>,
    /// Diagnosis codes between ICD-10 and ICD-10-GM.
    pub diagnosis: Option<Arc<ConceptMap>>,
    /// Cause-of-death codes between ICD-10 and ICD-10-GM.
    pub cause_of_death: Option<Arc<ConceptMap>>,
}

impl TranslationTables {
    /// Load every table named in `config`.
    ///
    /// This is the one-time initialisation barrier: it must complete before a router is built.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::ConceptMap`] if any configured table fails to load.
    pub fn load(config: &TransferConfig) -> TransformResult<Self> {
        let load = |path: Option<&Path>| -> TransformResult<Option<Arc<ConceptMap>>> {
            path.map(|p| ConceptMap::load(p).map(Arc::new))
                .transpose()
                .map_err(TransformError::from)
        };

        let tables = Self {
            sample_type: load(config.sample_type_map())?,
            diagnosis: load(config.diagnosis_map())?,
            cause_of_death: load(config.cause_of_death_map())?,
        };

        let divergent = tables.divergences();
        if !divergent.is_empty() {
            tracing::warn!(
                codes = divergent.len(),
                "diagnosis and cause-of-death tables translate shared codes differently"
            );
            for (code, diagnosis, cause_of_death) in &divergent {
                tracing::debug!(
                    code = code.as_str(),
                    diagnosis = diagnosis.as_str(),
                    cause_of_death = cause_of_death.as_str(),
                    "divergent translation"
                );
            }
        }

        Ok(tables)
    }

    /// Source codes present in both the diagnosis and cause-of-death tables whose targets differ,
    /// as `(code, diagnosis target, cause-of-death target)`, sorted by code.
    pub fn divergences(&self) -> Vec<(String, String, String)> {
        let (Some(diagnosis), Some(cause_of_death)) = (&self.diagnosis, &self.cause_of_death) else {
            return Vec::new();
        };

        let divergent: BTreeMap<&str, (&str, &str)> = diagnosis
            .iter()
            .filter_map(|(code, target)| {
                let other = cause_of_death.lookup(code)?;
                (other != target).then_some((code, (target, other)))
            })
            .collect();

        divergent
            .into_iter()
            .map(|(code, (d, c))| (code.to_string(), d.to_string(), c.to_string()))
            .collect()
    }

    /// The sample type table, which bbmri2mii and mii2bbmri cannot run without.
    pub fn require_sample_type(&self) -> TransformResult<Arc<ConceptMap>> {
        self.sample_type.clone().ok_or_else(|| {
            TransformError::InvalidConfig("a sample type concept map is required".into())
        })
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConceptMapWire {
    resource_type: String,
    #[serde(default)]
    group: Vec<GroupWire>,
}

#[derive(Debug, Deserialize)]
struct GroupWire {
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    target: Option<String>,
    #[serde(default)]
    element: Vec<ElementWire>,
}

#[derive(Debug, Deserialize)]
struct ElementWire {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    target: Vec<TargetWire>,
}

#[derive(Debug, Deserialize)]
struct TargetWire {
    #[serde(default)]
    code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PairFileWire {
    #[serde(default)]
    source_system: Option<String>,
    #[serde(default)]
    target_system: Option<String>,
    mappings: Vec<PairWire>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PairWire {
    source: String,
    target: String,
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

fn path_error_message<E: std::fmt::Display>(name: &str, err: serde_path_to_error::Error<E>) -> String {
    let path = err.path().to_string();
    let source = err.into_inner();
    let path = if path.is_empty() || path == "." {
        "<root>"
    } else {
        path.as_str()
    };
    format!("{name}: schema mismatch at {path}: {source}")
}
