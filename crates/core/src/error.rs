use crate::concept_map::ConceptMapError;
use crate::id_mapping::IdMappingError;
use crate::record::RecordKind;

/// Errors raised by the transformation engine.
///
/// Every variant is a contract violation or configuration error: data-quality problems in single
/// records never surface here, they produce empty rule output instead.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("rule for {expected:?} invoked with a {actual:?} record")]
    WrongKind {
        expected: RecordKind,
        actual: RecordKind,
    },
    #[error("attempt to create a bundle without an id")]
    MissingBundleId,
    #[error("cannot address {kind:?} record without an id")]
    MissingRecordId { kind: RecordKind },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("concept map error: {0}")]
    ConceptMap(#[from] ConceptMapError),
    #[error("id mapping error: {0}")]
    IdMapping(#[from] IdMappingError),
    #[error("FHIR error: {0}")]
    Fhir(#[from] fhir::FhirError),
    #[error("failed to serialize record: {0}")]
    Serialization(serde_json::Error),
}

pub type TransformResult<T> = std::result::Result<T, TransformError>;
