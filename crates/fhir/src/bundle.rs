//! FHIR Bundle envelope.
//!
//! Responsibilities:
//! - parse searchset/collection bundles read from disk into their resources
//! - render transaction bundles with per-entry `PUT` requests for idempotent upsert
//!
//! Notes:
//! - entry resources are held as raw JSON and parsed on demand via [`Bundle::resources`]

use crate::resource::FhirResource;
use crate::{from_value_with_path, FhirError, FhirResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Bundle type used for atomic transfer units.
pub const TRANSACTION: &str = "transaction";

/// A FHIR Bundle.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "type")]
    pub bundle_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entry: Vec<BundleEntry>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// One entry of a bundle.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<BundleRequest>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// The request part of a transaction entry.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct BundleRequest {
    pub method: String,
    pub url: String,
}

impl BundleRequest {
    /// An upsert (`PUT`) request addressed at `url`.
    pub fn put(url: impl Into<String>) -> Self {
        Self {
            method: "PUT".into(),
            url: url.into(),
        }
    }
}

impl Bundle {
    /// Create an empty bundle of the given type.
    pub fn new(bundle_type: &str) -> Self {
        Self {
            resource_type: "Bundle".into(),
            id: None,
            bundle_type: bundle_type.into(),
            timestamp: None,
            entry: Vec::new(),
            other: Map::new(),
        }
    }

    /// Parse a bundle from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError`] if the text is not a bundle or a member has an unexpected type.
    pub fn parse(json_text: &str) -> FhirResult<Self> {
        let value: Value = serde_json::from_str(json_text)?;
        let bundle: Bundle = from_value_with_path("Bundle", value)?;

        if bundle.resource_type != "Bundle" {
            return Err(FhirError::InvalidInput(format!(
                "Expected resourceType 'Bundle', got '{}'",
                bundle.resource_type
            )));
        }

        Ok(bundle)
    }

    /// Parse every entry resource. Entries without a resource are skipped.
    pub fn resources(&self) -> FhirResult<Vec<FhirResource>> {
        self.entry
            .iter()
            .filter_map(|e| e.resource.clone())
            .map(FhirResource::from_value)
            .collect()
    }

    /// Render as pretty-printed JSON text.
    pub fn render(&self) -> FhirResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| FhirError::Translation(format!("Failed to serialise bundle: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_searchset_resources() {
        let text = r#"{
            "resourceType": "Bundle",
            "type": "searchset",
            "total": 2,
            "entry": [
                { "fullUrl": "http://store/fhir/Patient/p-1",
                  "resource": { "resourceType": "Patient", "id": "p-1" } },
                { "search": { "mode": "include" } },
                { "resource": { "resourceType": "Specimen", "id": "s-1" } }
            ]
        }"#;

        let bundle = Bundle::parse(text).expect("parse bundle");
        assert_eq!(bundle.bundle_type, "searchset");

        let resources = bundle.resources().expect("parse resources");
        assert_eq!(resources.len(), 2);
        assert!(matches!(resources[0], FhirResource::Patient(_)));
        assert!(matches!(resources[1], FhirResource::Specimen(_)));
    }

    #[test]
    fn rejects_non_bundle() {
        let err = Bundle::parse(r#"{"resourceType":"Patient","type":"x"}"#)
            .expect_err("should reject non-bundle");
        match err {
            FhirError::InvalidInput(msg) => assert!(msg.contains("Bundle")),
            other => panic!("expected InvalidInput error, got {other:?}"),
        }
    }

    #[test]
    fn renders_transaction_requests() {
        let mut bundle = Bundle::new(TRANSACTION);
        bundle.id = Some("b-1".into());
        bundle.entry.push(BundleEntry {
            full_url: Some("Patient/p-1".into()),
            resource: Some(serde_json::json!({ "resourceType": "Patient", "id": "p-1" })),
            request: Some(BundleRequest::put("Patient/p-1")),
            ..BundleEntry::default()
        });

        let text = bundle.render().expect("render bundle");
        let value: Value = serde_json::from_str(&text).expect("valid json");
        assert_eq!(value["type"], "transaction");
        assert_eq!(value["entry"][0]["request"]["method"], "PUT");
        assert_eq!(value["entry"][0]["request"]["url"], "Patient/p-1");
    }
}
