//! GA4GH Beacon v2 catalog models.
//!
//! This crate provides the record shapes of the Beacon `individuals` and `biosamples` collections
//! produced by the biobank-to-catalog mapping. Records serialise to the camelCase JSON layout
//! expected by Beacon v2 reference implementations.
//!
//! Unlike the `fhir` crate, this crate does not preserve unknown members: catalog records are
//! always built from scratch by the mapping rules.

use serde::{Deserialize, Serialize};

/// NCBI taxonomy id for Homo sapiens.
pub const HUMAN_TAX_ID: &str = "9606";

/// Ontology IRI for Homo sapiens.
pub const HUMAN_ONTOLOGY_TERM: &str = "http://purl.obolibrary.org/obo/NCBITaxon_9606";

/// Name of the collection holding [`Individual`] records.
pub const INDIVIDUALS_COLLECTION: &str = "individuals";

/// Name of the collection holding [`Biosample`] records.
pub const BIOSAMPLES_COLLECTION: &str = "biosamples";

/// An ontology term: CURIE plus label.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct OntologyTerm {
    pub id: String,
    pub label: String,
}

impl OntologyTerm {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// A Beacon individual (one per donor).
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Individual {
    pub id: String,
    pub sex: OntologyTerm,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geographic_origin: Option<OntologyTerm>,
    #[serde(default)]
    pub measures: Vec<Measure>,
}

/// A phenotypic measurement attached to an individual.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Measure {
    pub assay_code: OntologyTerm,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub measurement_value: MeasurementValue,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct MeasurementValue {
    pub units: OntologyTerm,
    pub value: f64,
}

/// A Beacon biosample (one per specimen).
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Biosample {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub individual_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_date: Option<String>,
    pub info: SampleInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_origin_type: Option<OntologyTerm>,
}

/// Species information attached to every biosample.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleInfo {
    pub characteristics: SampleCharacteristics,
    pub tax_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct SampleCharacteristics {
    pub organism: Vec<Organism>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Organism {
    pub ontology_terms: Vec<String>,
    pub text: String,
}

impl SampleInfo {
    /// Species info for a human donor.
    pub fn human() -> Self {
        Self {
            characteristics: SampleCharacteristics {
                organism: vec![Organism {
                    ontology_terms: vec![HUMAN_ONTOLOGY_TERM.to_string()],
                    text: "Homo sapiens".to_string(),
                }],
            },
            tax_id: HUMAN_TAX_ID.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn biosample_uses_camel_case_members() {
        let biosample = Biosample {
            id: "s-1".into(),
            individual_id: Some("p-1".into()),
            collection_date: Some("2021-03-04".into()),
            info: SampleInfo::human(),
            sample_origin_type: Some(OntologyTerm::new("UBERON:0000178", "blood")),
        };

        let value = serde_json::to_value(&biosample).expect("serialise biosample");
        assert_eq!(value["individualId"], json!("p-1"));
        assert_eq!(value["collectionDate"], json!("2021-03-04"));
        assert_eq!(value["info"]["taxId"], json!("9606"));
        assert_eq!(
            value["info"]["characteristics"]["organism"][0]["ontologyTerms"][0],
            json!(HUMAN_ONTOLOGY_TERM)
        );
        assert_eq!(value["sampleOriginType"]["id"], json!("UBERON:0000178"));
    }

    #[test]
    fn individual_omits_unknown_origin() {
        let individual = Individual {
            id: "p-1".into(),
            sex: OntologyTerm::new("NCIT:C1799", "unknown"),
            geographic_origin: None,
            measures: Vec::new(),
        };

        let value = serde_json::to_value(&individual).expect("serialise individual");
        assert!(value.get("geographicOrigin").is_none());
        assert_eq!(value["measures"], json!([]));
    }
}
