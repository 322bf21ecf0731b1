//! FHIR Specimen wire model, including the collection and processing backbone elements.
//!
//! Biobank profiles hang most of their side-channel data off this resource: storage temperature,
//! custodian collection and sample diagnosis arrive as extensions on the specimen itself, on its
//! `collection` or on a `processing` step.

use crate::datatypes::{CodeableConcept, Meta, Reference};
use crate::extension::Extension;
use crate::resource::impl_resource;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A sample taken from a patient.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Specimen {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension: Vec<Extension>,

    /// Sample material type.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub specimen_type: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<SpecimenCollection>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub processing: Vec<SpecimenProcessing>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl_resource!(Specimen, "Specimen");

impl Specimen {
    /// Collection timestamp, if recorded.
    pub fn collected_date_time(&self) -> Option<&str> {
        self.collection.as_ref()?.collected_date_time.as_deref()
    }
}

/// Details of how the specimen was collected.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecimenCollection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collected_date_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_site: Option<CodeableConcept>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension: Vec<Extension>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// A processing step applied to the specimen.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecimenProcessing {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension: Vec<Extension>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FhirResource;
    use serde_json::json;

    #[test]
    fn specimen_round_trips_nested_extensions() {
        let input = json!({
            "resourceType": "Specimen",
            "id": "s-1",
            "type": {
                "coding": [{
                    "system": "https://fhir.bbmri.de/CodeSystem/SampleMaterialType",
                    "code": "whole-blood"
                }]
            },
            "subject": { "reference": "Patient/p-1" },
            "collection": {
                "collectedDateTime": "2021-03-04",
                "bodySite": { "coding": [{ "code": "C50.9" }] },
                "extension": [{
                    "url": "https://example.org/fasting",
                    "valueCodeableConcept": { "text": "fasting" }
                }]
            },
            "processing": [{
                "procedure": { "text": "centrifuge" },
                "extension": [{
                    "url": "https://example.org/temperature",
                    "valueRange": { "low": { "value": -85.0 }, "high": { "value": -60.0 } }
                }]
            }]
        });

        let resource = FhirResource::from_value(input.clone()).expect("parse specimen");
        let FhirResource::Specimen(specimen) = &resource else {
            panic!("expected Specimen");
        };
        assert_eq!(specimen.collected_date_time(), Some("2021-03-04"));
        assert_eq!(specimen.processing[0].extension.len(), 1);
        assert_eq!(resource.to_value().expect("render specimen"), input);
    }

    #[test]
    fn missing_collection_has_no_date() {
        let specimen = Specimen::default();
        assert!(specimen.collected_date_time().is_none());
    }
}
