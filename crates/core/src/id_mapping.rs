//! Identifier pseudonymization collaborator.
//!
//! Directions that move records between identifier domains (a biobank's ids versus a clinical
//! data integration centre's ids) ask an [`IdMapper`] for the id of the same entity in the target
//! domain. The engine treats the mapper as an opaque function; a failed lookup makes the record
//! that needed it unrepresentable.
//!
//! Implementations:
//! - [`IdentityMapper`]: ids are shared between domains (the default)
//! - [`CsvIdMapper`]: a CSV file whose header names the domains and whose rows list the ids of one
//!   entity in each domain

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use transfair_uuid::ResourceId;

#[derive(Debug, thiserror::Error)]
pub enum IdMappingError {
    #[error("no {target_domain} id for {source_domain} id '{id}'")]
    NotFound {
        id: String,
        source_domain: String,
        target_domain: String,
    },
    #[error("unknown id domain '{0}'")]
    UnknownDomain(String),
    #[error("mapped id '{0}' is not a valid FHIR id")]
    InvalidId(String),
    #[error("failed to read id mapping {path}: {source}", path = path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("invalid id mapping: {0}")]
    Invalid(String),
}

/// Maps an identifier from one domain into another.
pub trait IdMapper: Send + Sync {
    /// Return the id of the entity known as `id` in `source_domain` within `target_domain`.
    fn map_id(
        &self,
        id: &str,
        source_domain: &str,
        target_domain: &str,
    ) -> Result<String, IdMappingError>;
}

/// Returns every id unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityMapper;

impl IdMapper for IdentityMapper {
    fn map_id(&self, id: &str, _: &str, _: &str) -> Result<String, IdMappingError> {
        Ok(id.to_string())
    }
}

/// Table-driven mapper loaded from CSV.
///
/// ```text
/// bbmri,mii
/// bbmri-17,mii-9f2
/// bbmri-18,mii-a01
/// ```
#[derive(Clone, Debug)]
pub struct CsvIdMapper {
    domains: Vec<String>,
    rows: Vec<Vec<String>>,
    index: HashMap<(usize, String), usize>,
}

impl CsvIdMapper {
    /// Load a mapping file.
    pub fn load(path: &Path) -> Result<Self, IdMappingError> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|source| IdMappingError::Csv {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_csv(reader, path)
    }

    /// Build a mapper from CSV text held in memory.
    pub fn from_reader<R: Read>(input: R) -> Result<Self, IdMappingError> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(input);
        Self::from_csv(reader, Path::new("<memory>"))
    }

    /// Domain names, in column order.
    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    /// Number of entities in the table.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>, path: &Path) -> Result<Self, IdMappingError> {
        let csv_error = |source| IdMappingError::Csv {
            path: path.to_path_buf(),
            source,
        };

        let domains: Vec<String> = reader
            .headers()
            .map_err(csv_error)?
            .iter()
            .map(|h| h.to_ascii_lowercase())
            .collect();

        if domains.len() < 2 || domains.iter().any(String::is_empty) {
            return Err(IdMappingError::Invalid(
                "header must name at least two id domains".into(),
            ));
        }

        let mut rows = Vec::new();
        let mut index = HashMap::new();

        for record in reader.records() {
            let record = record.map_err(csv_error)?;
            let row: Vec<String> = record.iter().map(str::to_string).collect();
            let row_number = rows.len();

            for (column, id) in row.iter().enumerate().filter(|(_, id)| !id.is_empty()) {
                if index.insert((column, id.clone()), row_number).is_some() {
                    return Err(IdMappingError::Invalid(format!(
                        "id '{id}' appears twice in domain '{}'",
                        domains[column]
                    )));
                }
            }
            rows.push(row);
        }

        Ok(Self {
            domains,
            rows,
            index,
        })
    }

    fn column(&self, domain: &str) -> Result<usize, IdMappingError> {
        self.domains
            .iter()
            .position(|d| d.eq_ignore_ascii_case(domain))
            .ok_or_else(|| IdMappingError::UnknownDomain(domain.to_string()))
    }
}

impl IdMapper for CsvIdMapper {
    fn map_id(
        &self,
        id: &str,
        source_domain: &str,
        target_domain: &str,
    ) -> Result<String, IdMappingError> {
        let source = self.column(source_domain)?;
        let target = self.column(target_domain)?;

        let not_found = || IdMappingError::NotFound {
            id: id.to_string(),
            source_domain: source_domain.to_string(),
            target_domain: target_domain.to_string(),
        };

        let row = self
            .index
            .get(&(source, id.to_string()))
            .ok_or_else(not_found)?;
        let mapped = self.rows[*row]
            .get(target)
            .filter(|m| !m.is_empty())
            .ok_or_else(not_found)?;

        ResourceId::parse(mapped)
            .map(ResourceId::into_string)
            .map_err(|_| IdMappingError::InvalidId(mapped.clone()))
    }
}
