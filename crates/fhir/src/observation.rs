//! FHIR Observation wire model.

use crate::datatypes::{CodeableConcept, Meta, Quantity, Reference};
use crate::extension::Extension;
use crate::resource::impl_resource;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A measurement or assertion about a patient.
///
/// Of the `effective[x]` and `value[x]` choices only `effectiveDateTime`, `valueCodeableConcept`
/// and `valueQuantity` are modelled.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension: Vec<Extension>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub category: Vec<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_date_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_codeable_concept: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_quantity: Option<Quantity>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl_resource!(Observation, "Observation");
