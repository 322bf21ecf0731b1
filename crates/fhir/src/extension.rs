//! FHIR extensions: URL-keyed side-channel data carried by resources and backbone elements.
//!
//! FHIR encodes the value of an extension as one of many `value[x]` members. This module exposes
//! a domain-level [`ExtensionValue`] enum for the value types the mapping rules understand and
//! keeps a strict wire struct internally.
//!
//! Notes:
//! - `value[x]` members this crate does not model are kept in [`Extension::other`] untouched
//! - nested extensions (complex extensions) are preserved recursively

use crate::datatypes::{CodeableConcept, Coding, Range, Reference};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Public domain-level types
// ============================================================================

/// Typed value of an extension.
#[derive(Clone, Debug, PartialEq)]
pub enum ExtensionValue {
    CodeableConcept(CodeableConcept),
    Coding(Coding),
    Reference(Reference),
    String(String),
    DateTime(String),
    Range(Range),
}

/// An extension entry: a URL plus an optional typed value.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(from = "ExtensionWire", into = "ExtensionWire")]
pub struct Extension {
    pub url: String,
    pub value: Option<ExtensionValue>,
    pub extension: Vec<Extension>,
    pub other: Map<String, Value>,
}

impl Extension {
    /// Create an extension with the given URL and value.
    pub fn new(url: impl Into<String>, value: ExtensionValue) -> Self {
        Self {
            url: url.into(),
            value: Some(value),
            extension: Vec::new(),
            other: Map::new(),
        }
    }

    /// The value as a codeable concept, if it is one.
    pub fn value_codeable_concept(&self) -> Option<&CodeableConcept> {
        match &self.value {
            Some(ExtensionValue::CodeableConcept(concept)) => Some(concept),
            _ => None,
        }
    }

    /// The value as a reference, if it is one.
    pub fn value_reference(&self) -> Option<&Reference> {
        match &self.value {
            Some(ExtensionValue::Reference(reference)) => Some(reference),
            _ => None,
        }
    }

    /// The value as a range, if it is one.
    pub fn value_range(&self) -> Option<&Range> {
        match &self.value {
            Some(ExtensionValue::Range(range)) => Some(range),
            _ => None,
        }
    }
}

/// Find the first extension with the given URL.
pub fn find<'a>(extensions: &'a [Extension], url: &str) -> Option<&'a Extension> {
    extensions.iter().find(|e| e.url == url)
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExtensionWire {
    url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    value_codeable_concept: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    value_coding: Option<Coding>,

    #[serde(skip_serializing_if = "Option::is_none")]
    value_reference: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    value_string: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    value_date_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    value_range: Option<Range>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    extension: Vec<Extension>,

    #[serde(flatten)]
    other: Map<String, Value>,
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

impl From<ExtensionWire> for Extension {
    fn from(wire: ExtensionWire) -> Self {
        let value = wire
            .value_codeable_concept
            .map(ExtensionValue::CodeableConcept)
            .or(wire.value_coding.map(ExtensionValue::Coding))
            .or(wire.value_reference.map(ExtensionValue::Reference))
            .or(wire.value_string.map(ExtensionValue::String))
            .or(wire.value_date_time.map(ExtensionValue::DateTime))
            .or(wire.value_range.map(ExtensionValue::Range));

        Extension {
            url: wire.url,
            value,
            extension: wire.extension,
            other: wire.other,
        }
    }
}

impl From<Extension> for ExtensionWire {
    fn from(ext: Extension) -> Self {
        let mut wire = ExtensionWire {
            url: ext.url,
            value_codeable_concept: None,
            value_coding: None,
            value_reference: None,
            value_string: None,
            value_date_time: None,
            value_range: None,
            extension: ext.extension,
            other: ext.other,
        };

        match ext.value {
            Some(ExtensionValue::CodeableConcept(v)) => wire.value_codeable_concept = Some(v),
            Some(ExtensionValue::Coding(v)) => wire.value_coding = Some(v),
            Some(ExtensionValue::Reference(v)) => wire.value_reference = Some(v),
            Some(ExtensionValue::String(v)) => wire.value_string = Some(v),
            Some(ExtensionValue::DateTime(v)) => wire.value_date_time = Some(v),
            Some(ExtensionValue::Range(v)) => wire.value_range = Some(v),
            None => {}
        }

        wire
    }
}
