//! FHIR Organization wire model (biobanks and sample collections).

use crate::datatypes::{Identifier, Meta, Reference};
use crate::extension::Extension;
use crate::resource::impl_resource;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension: Vec<Extension>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Parent organization; a collection is part of its biobank.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_of: Option<Reference>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl_resource!(Organization, "Organization");
