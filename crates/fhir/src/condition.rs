//! FHIR Condition wire model (diagnoses and causes of death).

use crate::datatypes::{CodeableConcept, Meta, Reference};
use crate::extension::Extension;
use crate::resource::impl_resource;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A clinical condition, problem or diagnosis.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension: Vec<Extension>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub category: Vec<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub recorded_date: Option<String>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl_resource!(Condition, "Condition");
