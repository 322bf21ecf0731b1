//! FHIR complex data types shared by all resource models.
//!
//! Every type keeps members it does not model in an `other` map so that a parse/render cycle
//! never drops data.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// UCUM code system, used for temperature quantities.
pub const UCUM_SYSTEM: &str = "http://unitsofmeasure.org";

/// A coded value: a (terminology system, code) pair with an optional display label.
///
/// Equality for lookup purposes is by `(system, code)`; see [`Coding::matches`].
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Coding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Coding {
    /// Create a coding with system and code and no label.
    pub fn new(system: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            code: Some(code.into()),
            ..Self::default()
        }
    }

    /// Attach a display label.
    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    /// True when this coding belongs to `system`.
    pub fn is_in(&self, system: &str) -> bool {
        self.system.as_deref() == Some(system)
    }

    /// True when `(system, code)` equals the given pair. Labels are ignored.
    pub fn matches(&self, system: &str, code: &str) -> bool {
        self.is_in(system) && self.code.as_deref() == Some(code)
    }
}

/// A concept expressed as one or more codings plus optional free text.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct CodeableConcept {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coding: Vec<Coding>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl CodeableConcept {
    /// A concept holding exactly one coding.
    pub fn from_coding(coding: Coding) -> Self {
        Self {
            coding: vec![coding],
            ..Self::default()
        }
    }

    /// First coding in `system`, if any.
    pub fn coding_in(&self, system: &str) -> Option<&Coding> {
        self.coding.iter().find(|c| c.is_in(system))
    }

    /// Code of the first coding that carries one.
    pub fn first_code(&self) -> Option<&str> {
        self.coding.iter().find_map(|c| c.code.as_deref())
    }

    /// True when any coding matches `(system, code)`.
    pub fn has_coding(&self, system: &str, code: &str) -> bool {
        self.coding.iter().any(|c| c.matches(system, code))
    }
}

/// A string-identity reference to another resource, e.g. `Patient/123`.
///
/// References are never resolved by this crate.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Reference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Reference {
    /// Build a `<resource_type>/<id>` reference.
    pub fn to(resource_type: &str, id: &str) -> Self {
        Self {
            reference: Some(format!("{resource_type}/{id}")),
            ..Self::default()
        }
    }

    /// The id part of a relative reference to `resource_type`.
    ///
    /// Returns `None` if the reference is absent or points at another resource type.
    pub fn id_for(&self, resource_type: &str) -> Option<&str> {
        self.reference
            .as_deref()?
            .strip_prefix(resource_type)?
            .strip_prefix('/')
            .filter(|id| !id.is_empty())
    }
}

/// A measured amount.
///
/// `value` is held as a JSON number so that `2` and `2.0` each render back as written.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Quantity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Number>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Quantity {
    /// A temperature in degrees Celsius, coded in UCUM.
    pub fn celsius(value: f64) -> Self {
        Self {
            value: decimal(value),
            unit: Some("°C".into()),
            system: Some(UCUM_SYSTEM.into()),
            code: Some("Cel".into()),
            ..Self::default()
        }
    }

    /// The value as a float.
    pub fn value_f64(&self) -> Option<f64> {
        self.value.as_ref()?.as_f64()
    }
}

/// Whole numbers render without a fraction; NaN and infinities have no JSON form.
fn decimal(value: f64) -> Option<Number> {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        Some(Number::from(value as i64))
    } else {
        Number::from_f64(value)
    }
}

/// A low/high pair of quantities.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Range {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<Quantity>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<Quantity>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Range {
    /// A temperature range in degrees Celsius.
    pub fn celsius(low: f64, high: f64) -> Self {
        Self {
            low: Some(Quantity::celsius(low)),
            high: Some(Quantity::celsius(high)),
            ..Self::default()
        }
    }

    /// Numeric `(low, high)` bounds when both are present.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        let low = self.low.as_ref()?.value_f64()?;
        let high = self.high.as_ref()?.value_f64()?;
        Some((low, high))
    }
}

/// Resource metadata. Only the profile tags are modelled.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub profile: Vec<String>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// A postal address.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub line: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// A business identifier.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Identifier {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}
