//! The engine's generic record representation.
//!
//! [`ClinicalRecord`] is a tagged union over every record kind the engine reads or produces:
//! the FHIR resources of the clinical and biobank schemas, the Beacon catalog records, and an
//! opaque carrier for FHIR resource types no rule understands.
//!
//! Notes:
//! - records are plain values; rules clone what they rewrite and never share mutable state
//! - references to other records stay as strings (`Patient/123`) and are never resolved

use crate::error::{TransformError, TransformResult};
use fhir::{FhirResource, Resource};
use serde_json::Value;
use std::fmt;

/// Structural type of a record, used as the router's registry key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKind {
    Patient,
    Condition,
    Observation,
    Specimen,
    Organization,
    /// Beacon individual.
    Individual,
    /// Beacon biosample.
    Biosample,
    /// Any FHIR resource type without a dedicated model.
    Other,
}

impl RecordKind {
    /// Every kind, in registry order.
    pub const ALL: [RecordKind; 8] = [
        RecordKind::Patient,
        RecordKind::Condition,
        RecordKind::Observation,
        RecordKind::Specimen,
        RecordKind::Organization,
        RecordKind::Individual,
        RecordKind::Biosample,
        RecordKind::Other,
    ];

    /// Wire name of the kind. `Other` stands for many FHIR types and reports `"Other"`.
    pub fn resource_type(&self) -> &'static str {
        match self {
            RecordKind::Patient => "Patient",
            RecordKind::Condition => "Condition",
            RecordKind::Observation => "Observation",
            RecordKind::Specimen => "Specimen",
            RecordKind::Organization => "Organization",
            RecordKind::Individual => "Individual",
            RecordKind::Biosample => "Biosample",
            RecordKind::Other => "Other",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.resource_type())
    }
}

/// One clinical, biobank or catalog record.
#[derive(Clone, Debug, PartialEq)]
pub enum ClinicalRecord {
    Patient(fhir::Patient),
    Condition(fhir::Condition),
    Observation(fhir::Observation),
    Specimen(fhir::Specimen),
    Organization(fhir::Organization),
    Individual(beacon::Individual),
    Biosample(beacon::Biosample),
    Other(fhir::OtherResource),
}

impl ClinicalRecord {
    /// Parse a FHIR resource from JSON into a record.
    pub fn from_json(value: Value) -> TransformResult<Self> {
        Ok(FhirResource::from_value(value)?.into())
    }

    /// The record's kind tag.
    pub fn kind(&self) -> RecordKind {
        match self {
            ClinicalRecord::Patient(_) => RecordKind::Patient,
            ClinicalRecord::Condition(_) => RecordKind::Condition,
            ClinicalRecord::Observation(_) => RecordKind::Observation,
            ClinicalRecord::Specimen(_) => RecordKind::Specimen,
            ClinicalRecord::Organization(_) => RecordKind::Organization,
            ClinicalRecord::Individual(_) => RecordKind::Individual,
            ClinicalRecord::Biosample(_) => RecordKind::Biosample,
            ClinicalRecord::Other(_) => RecordKind::Other,
        }
    }

    /// The FHIR resource type, or the Beacon record type for catalog records.
    pub fn resource_type(&self) -> &str {
        match self {
            ClinicalRecord::Individual(_) => "Individual",
            ClinicalRecord::Biosample(_) => "Biosample",
            ClinicalRecord::Patient(r) => r.resource_type(),
            ClinicalRecord::Condition(r) => r.resource_type(),
            ClinicalRecord::Observation(r) => r.resource_type(),
            ClinicalRecord::Specimen(r) => r.resource_type(),
            ClinicalRecord::Organization(r) => r.resource_type(),
            ClinicalRecord::Other(r) => r.resource_type(),
        }
    }

    /// Stable identifier, if assigned.
    pub fn id(&self) -> Option<&str> {
        match self {
            ClinicalRecord::Individual(individual) => Some(individual.id.as_str()),
            ClinicalRecord::Biosample(biosample) => Some(biosample.id.as_str()),
            _ => self.as_fhir().and_then(|r| r.id()),
        }
    }

    /// Profile tags. Catalog records carry none.
    pub fn profiles(&self) -> &[String] {
        self.as_fhir().map(|r| r.profiles()).unwrap_or(&[])
    }

    /// True for Beacon catalog records.
    pub fn is_catalog(&self) -> bool {
        matches!(
            self,
            ClinicalRecord::Individual(_) | ClinicalRecord::Biosample(_)
        )
    }

    /// Deterministic address token `<ResourceType>/<id>` used for idempotent upserts.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::MissingRecordId`] if the record has no id.
    pub fn address(&self) -> TransformResult<String> {
        match self.id() {
            Some(id) if !id.is_empty() => Ok(format!("{}/{id}", self.resource_type())),
            _ => Err(TransformError::MissingRecordId { kind: self.kind() }),
        }
    }

    /// Render the record as JSON: a FHIR resource or a Beacon document.
    pub fn to_json(&self) -> TransformResult<Value> {
        let value = match self {
            ClinicalRecord::Patient(r) => fhir::resource::render_value(r)?,
            ClinicalRecord::Condition(r) => fhir::resource::render_value(r)?,
            ClinicalRecord::Observation(r) => fhir::resource::render_value(r)?,
            ClinicalRecord::Specimen(r) => fhir::resource::render_value(r)?,
            ClinicalRecord::Organization(r) => fhir::resource::render_value(r)?,
            ClinicalRecord::Other(r) => fhir::resource::render_value(r)?,
            ClinicalRecord::Individual(r) => {
                serde_json::to_value(r).map_err(TransformError::Serialization)?
            }
            ClinicalRecord::Biosample(r) => {
                serde_json::to_value(r).map_err(TransformError::Serialization)?
            }
        };
        Ok(value)
    }

    fn as_fhir(&self) -> Option<&dyn Resource> {
        match self {
            ClinicalRecord::Patient(r) => Some(r),
            ClinicalRecord::Condition(r) => Some(r),
            ClinicalRecord::Observation(r) => Some(r),
            ClinicalRecord::Specimen(r) => Some(r),
            ClinicalRecord::Organization(r) => Some(r),
            ClinicalRecord::Other(r) => Some(r),
            ClinicalRecord::Individual(_) | ClinicalRecord::Biosample(_) => None,
        }
    }
}

impl From<FhirResource> for ClinicalRecord {
    fn from(resource: FhirResource) -> Self {
        match resource {
            FhirResource::Patient(r) => ClinicalRecord::Patient(r),
            FhirResource::Condition(r) => ClinicalRecord::Condition(r),
            FhirResource::Observation(r) => ClinicalRecord::Observation(r),
            FhirResource::Specimen(r) => ClinicalRecord::Specimen(r),
            FhirResource::Organization(r) => ClinicalRecord::Organization(r),
            FhirResource::Other(r) => ClinicalRecord::Other(r),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_and_address_follow_resource_type() {
        let record = ClinicalRecord::from_json(json!({
            "resourceType": "Organization",
            "id": "biobank-1"
        }))
        .expect("parse organization");

        assert_eq!(record.kind(), RecordKind::Organization);
        assert_eq!(record.address().expect("address"), "Organization/biobank-1");
    }

    #[test]
    fn other_resources_address_by_their_own_type() {
        let record = ClinicalRecord::from_json(json!({
            "resourceType": "ImagingStudy",
            "id": "img-7"
        }))
        .expect("parse imaging study");

        assert_eq!(record.kind(), RecordKind::Other);
        assert_eq!(record.address().expect("address"), "ImagingStudy/img-7");
    }

    #[test]
    fn address_requires_id() {
        let record = ClinicalRecord::Specimen(fhir::Specimen::default());
        let err = record.address().expect_err("should fail without id");
        match err {
            TransformError::MissingRecordId { kind } => assert_eq!(kind, RecordKind::Specimen),
            other => panic!("expected MissingRecordId, got {other:?}"),
        }
    }

    #[test]
    fn catalog_records_have_no_profiles() {
        let record = ClinicalRecord::Individual(beacon::Individual {
            id: "p-1".into(),
            sex: beacon::OntologyTerm::new("NCIT:C16576", "female"),
            geographic_origin: None,
            measures: Vec::new(),
        });

        assert!(record.is_catalog());
        assert!(record.profiles().is_empty());
        assert_eq!(record.address().expect("address"), "Individual/p-1");
        assert_eq!(record.to_json().expect("render")["sex"]["label"], "female");
    }
}
