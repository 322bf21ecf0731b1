//! FHIR R4 wire/boundary support for the TransFAIR mapping engine.
//!
//! This crate provides **wire models** and **parse/render helpers** for the FHIR JSON resources
//! that flow between biobank and clinical stores:
//! - resource models for Patient, Condition, Observation, Specimen and Organization
//! - an opaque carrier for resource types the engine does not model
//! - the transaction/searchset `Bundle` envelope
//!
//! This crate focuses on:
//! - serialisation/deserialisation of FHIR JSON
//! - typed access to the fields mapping rules read and rewrite
//! - preservation of every JSON member it does not model, so that identity copies are lossless
//!
//! Terminology translation and profile rewriting live in the `transfair-core` crate; this crate
//! has no knowledge of BBMRI.de or MII profiles.

pub mod bundle;
pub mod condition;
pub mod datatypes;
pub mod extension;
pub mod observation;
pub mod organization;
pub mod patient;
pub mod resource;
pub mod specimen;

// Re-export resource models
pub use condition::Condition;
pub use observation::Observation;
pub use organization::Organization;
pub use patient::Patient;
pub use resource::{FhirResource, OtherResource, Resource};
pub use specimen::{Specimen, SpecimenCollection, SpecimenProcessing};

// Re-export shared data types
pub use bundle::{Bundle, BundleEntry, BundleRequest};
pub use datatypes::{Address, CodeableConcept, Coding, Identifier, Meta, Quantity, Range, Reference};
pub use extension::{Extension, ExtensionValue};

/// Errors returned by the `fhir` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("translation error: {0}")]
    Translation(String),
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;

/// Deserialize a JSON value into `T`, reporting the failing path on schema mismatch.
///
/// `what` names the structure being parsed and is used as the message prefix, for example
/// `"Specimen schema mismatch at collection.collectedDateTime: ..."`.
pub(crate) fn from_value_with_path<T>(what: &str, value: serde_json::Value) -> FhirResult<T>
where
    T: serde::de::DeserializeOwned,
{
    serde_path_to_error::deserialize::<_, T>(value).map_err(|err| {
        let path = err.path().to_string();
        let source = err.into_inner();
        let path = if path.is_empty() || path == "." {
            "<root>"
        } else {
            path.as_str()
        };
        FhirError::Translation(format!("{what} schema mismatch at {path}: {source}"))
    })
}
