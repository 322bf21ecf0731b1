//! Resource-level behaviour shared by all models, and the [`FhirResource`] dispatch enum.
//!
//! Responsibilities:
//! - expose identifier, profile tags and extensions uniformly through the [`Resource`] trait
//! - parse a JSON resource by its `resourceType` into the matching model
//! - render a model back into JSON with its `resourceType`
//!
//! Notes:
//! - `resourceType` is not a field of the models; it is added and stripped at this boundary
//! - unknown resource types parse into [`OtherResource`] instead of failing

use crate::datatypes::Meta;
use crate::extension::Extension;
use crate::{
    from_value_with_path, Condition, FhirError, FhirResult, Observation, Organization, Patient,
    Specimen,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Common accessors for FHIR resources.
pub trait Resource {
    /// FHIR `resourceType` of this resource.
    fn resource_type(&self) -> &str;

    /// Logical id, if assigned.
    fn id(&self) -> Option<&str>;

    /// Resource metadata, if present.
    fn meta(&self) -> Option<&Meta>;

    /// Mutable metadata, created on first access.
    fn meta_mut(&mut self) -> &mut Meta;

    /// Top-level extensions.
    fn extensions(&self) -> &[Extension];

    /// Profile tags declared in `meta.profile`.
    fn profiles(&self) -> &[String] {
        self.meta().map(|m| m.profile.as_slice()).unwrap_or(&[])
    }

    /// True when `url` is one of the declared profiles.
    fn has_profile(&self, url: &str) -> bool {
        self.profiles().iter().any(|p| p == url)
    }

    /// Replace all profile tags with the single `url`.
    fn set_profile(&mut self, url: &str) {
        self.meta_mut().profile = vec![url.to_string()];
    }
}

macro_rules! impl_resource {
    ($ty:ty, $name:literal) => {
        impl $crate::resource::Resource for $ty {
            fn resource_type(&self) -> &str {
                $name
            }

            fn id(&self) -> Option<&str> {
                self.id.as_deref()
            }

            fn meta(&self) -> Option<&$crate::datatypes::Meta> {
                self.meta.as_ref()
            }

            fn meta_mut(&mut self) -> &mut $crate::datatypes::Meta {
                self.meta.get_or_insert_with(Default::default)
            }

            fn extensions(&self) -> &[$crate::extension::Extension] {
                &self.extension
            }
        }
    };
}

pub(crate) use impl_resource;

/// A resource of a type this crate does not model.
///
/// The body is kept verbatim apart from the members needed for dispatch and addressing.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct OtherResource {
    #[serde(skip)]
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension: Vec<Extension>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Resource for OtherResource {
    fn resource_type(&self) -> &str {
        &self.resource_type
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn meta(&self) -> Option<&Meta> {
        self.meta.as_ref()
    }

    fn meta_mut(&mut self) -> &mut Meta {
        self.meta.get_or_insert_with(Default::default)
    }

    fn extensions(&self) -> &[Extension] {
        &self.extension
    }
}

/// Any FHIR resource, dispatched by `resourceType`.
#[derive(Clone, Debug, PartialEq)]
pub enum FhirResource {
    Patient(Patient),
    Condition(Condition),
    Observation(Observation),
    Specimen(Specimen),
    Organization(Organization),
    Other(OtherResource),
}

impl FhirResource {
    /// Parse a resource from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError`] if the text is not JSON, is not an object, lacks `resourceType`, or
    /// a modelled field has an unexpected type (the failing path is included in the message).
    pub fn parse(json_text: &str) -> FhirResult<Self> {
        let value: Value = serde_json::from_str(json_text)?;
        Self::from_value(value)
    }

    /// Parse a resource from an already decoded JSON value.
    pub fn from_value(value: Value) -> FhirResult<Self> {
        let Value::Object(mut object) = value else {
            return Err(FhirError::InvalidInput(
                "resource must be a JSON object".into(),
            ));
        };

        let resource_type = match object.remove("resourceType") {
            Some(Value::String(rt)) if !rt.is_empty() => rt,
            Some(other) => {
                return Err(FhirError::InvalidInput(format!(
                    "resourceType must be a non-empty string, got {other}"
                )))
            }
            None => {
                return Err(FhirError::InvalidInput(
                    "resource is missing resourceType".into(),
                ))
            }
        };

        let body = Value::Object(object);
        let resource = match resource_type.as_str() {
            "Patient" => FhirResource::Patient(from_value_with_path("Patient", body)?),
            "Condition" => FhirResource::Condition(from_value_with_path("Condition", body)?),
            "Observation" => {
                FhirResource::Observation(from_value_with_path("Observation", body)?)
            }
            "Specimen" => FhirResource::Specimen(from_value_with_path("Specimen", body)?),
            "Organization" => {
                FhirResource::Organization(from_value_with_path("Organization", body)?)
            }
            _ => {
                let mut other: OtherResource = from_value_with_path(&resource_type, body)?;
                other.resource_type = resource_type;
                FhirResource::Other(other)
            }
        };

        Ok(resource)
    }

    /// Render the resource as a JSON value including `resourceType`.
    pub fn to_value(&self) -> FhirResult<Value> {
        match self {
            FhirResource::Patient(r) => render_value(r),
            FhirResource::Condition(r) => render_value(r),
            FhirResource::Observation(r) => render_value(r),
            FhirResource::Specimen(r) => render_value(r),
            FhirResource::Organization(r) => render_value(r),
            FhirResource::Other(r) => render_value(r),
        }
    }

    /// The wrapped resource as a trait object.
    pub fn as_resource(&self) -> &dyn Resource {
        match self {
            FhirResource::Patient(r) => r,
            FhirResource::Condition(r) => r,
            FhirResource::Observation(r) => r,
            FhirResource::Specimen(r) => r,
            FhirResource::Organization(r) => r,
            FhirResource::Other(r) => r,
        }
    }
}

/// Render any resource model as a JSON object carrying its `resourceType`.
///
/// # Errors
///
/// Returns [`FhirError::Translation`] if the model does not serialise to a JSON object.
pub fn render_value<R>(resource: &R) -> FhirResult<Value>
where
    R: Resource + Serialize,
{
    let value = serde_json::to_value(resource)?;
    let Value::Object(body) = value else {
        return Err(FhirError::Translation(format!(
            "{} did not serialise to a JSON object",
            resource.resource_type()
        )));
    };

    let mut object = Map::with_capacity(body.len() + 1);
    object.insert(
        "resourceType".into(),
        Value::String(resource.resource_type().to_string()),
    );
    object.extend(body);
    Ok(Value::Object(object))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dispatches_on_resource_type() {
        let resource = FhirResource::from_value(json!({
            "resourceType": "Specimen",
            "id": "s-1",
            "meta": { "profile": ["https://fhir.bbmri.de/StructureDefinition/Specimen"] }
        }))
        .expect("parse specimen");

        match &resource {
            FhirResource::Specimen(specimen) => {
                assert_eq!(specimen.id.as_deref(), Some("s-1"));
                assert!(specimen.has_profile("https://fhir.bbmri.de/StructureDefinition/Specimen"));
            }
            other => panic!("expected Specimen, got {other:?}"),
        }
    }

    #[test]
    fn unknown_types_are_carried_verbatim() {
        let input = json!({
            "resourceType": "ImagingStudy",
            "id": "img-1",
            "status": "available",
            "series": [{ "uid": "1.2.3" }]
        });

        let resource = FhirResource::from_value(input.clone()).expect("parse other");
        match &resource {
            FhirResource::Other(other) => {
                assert_eq!(other.resource_type(), "ImagingStudy");
                assert_eq!(other.id(), Some("img-1"));
            }
            other => panic!("expected Other, got {other:?}"),
        }

        assert_eq!(resource.to_value().expect("render"), input);
    }

    #[test]
    fn rejects_missing_resource_type() {
        let err = FhirResource::from_value(json!({ "id": "x" })).expect_err("should reject");
        match err {
            FhirError::InvalidInput(msg) => assert!(msg.contains("resourceType")),
            other => panic!("expected InvalidInput error, got {other:?}"),
        }
    }

    #[test]
    fn schema_mismatch_reports_path() {
        let err = FhirResource::from_value(json!({
            "resourceType": "Specimen",
            "id": "s-1",
            "collection": { "collectedDateTime": 42 }
        }))
        .expect_err("should reject wrong type");

        match err {
            FhirError::Translation(msg) => {
                assert!(msg.starts_with("Specimen schema mismatch"));
                assert!(msg.contains("collectedDateTime"), "{msg}");
            }
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn set_profile_replaces_existing_tags() {
        let mut resource = FhirResource::parse(
            r#"{"resourceType":"Patient","id":"p","meta":{"profile":["a","b"],"versionId":"3"}}"#,
        )
        .expect("parse patient");

        let FhirResource::Patient(patient) = &mut resource else {
            panic!("expected Patient");
        };
        patient.set_profile("c");
        assert_eq!(patient.profiles(), ["c".to_string()]);
        let meta = patient.meta.as_ref().expect("meta");
        assert_eq!(meta.other.get("versionId"), Some(&json!("3")));
    }
}
