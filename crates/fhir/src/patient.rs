//! FHIR Patient wire model.
//!
//! Only the members read by the mapping rules are modelled; everything else (names, telecom,
//! identifiers, deceased flags) round-trips through [`Patient::other`].

use crate::datatypes::{Address, Meta, Reference};
use crate::extension::Extension;
use crate::resource::impl_resource;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A person receiving care or donating samples.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension: Vec<Extension>,

    /// Administrative gender code (`male`, `female`, `other`, `unknown`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub address: Vec<Address>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub managing_organization: Option<Reference>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl_resource!(Patient, "Patient");
