//! Ontology terms for Beacon catalog fields.
//!
//! Sex uses NCIt, countries use GAZ and sample origins use UBERON or OBI.

use beacon::OntologyTerm;

const UNKNOWN_LOCATION: (&str, &str) = ("GAZ:00000448", "geographic location");

const COUNTRIES: [(&str, &str, &str); 5] = [
    ("italy", "GAZ:00002650", "Italy"),
    ("malta", "GAZ:00004017", "Malta"),
    ("spain", "GAZ:00000591", "Spain"),
    ("uk", "GAZ:00002637", "United Kingdom"),
    ("usa", "GAZ:00002459", "United States of America"),
];

const DEFAULT_ORIGIN: (&str, &str) = ("UBERON:0000479", "tissue");

// Order matters: the first fragment contained in the sample type wins.
const SAMPLE_ORIGINS: [(&str, &str, &str); 16] = [
    ("ascites", "UBERON:0007795", "ascitic fluid"),
    ("bone marrow", "UBERON:0002371", "bone marrow"),
    ("csf", "UBERON:0001359", "cerebrospinal fluid"),
    ("saliva", "UBERON:0001836", "saliva"),
    ("stool", "UBERON:0001988", "feces"),
    ("faeces", "UBERON:0001988", "feces"),
    ("serum", "OBI:0100017", "blood serum"),
    ("plasma", "UBERON:0001969", "blood plasma"),
    ("blood", "UBERON:0000178", "blood"),
    ("urine", "UBERON:0001088", "Urine"),
    ("dna", "OBI:0001051", "DNA"),
    ("rna", "OBI:0000880", "Ribonucleic Acid"),
    ("swab", "OBI:0002819", "Swab"),
    (
        "tissue-formalin",
        "OBI:1200000",
        "Formalin-Fixed Paraffin-Embedded Tissue Sample",
    ),
    ("tissue-frozen", "OBI:0000922", "Frozen Tissue"),
    ("tissue", "UBERON:0000479", "tissue"),
];

/// NCIt term for a FHIR administrative gender.
pub(super) fn sex(gender: Option<&str>) -> OntologyTerm {
    match gender.map(str::to_ascii_lowercase).as_deref() {
        Some("male") => OntologyTerm::new("NCIT:C20197", "male"),
        Some("female") => OntologyTerm::new("NCIT:C16576", "female"),
        _ => OntologyTerm::new("NCIT:C1799", "unknown"),
    }
}

/// GAZ term for a known country name, matched case-insensitively.
pub(super) fn known_country(name: &str) -> Option<OntologyTerm> {
    let name = name.trim();
    COUNTRIES
        .iter()
        .find(|(key, _, _)| key.eq_ignore_ascii_case(name))
        .map(|&(_, id, label)| OntologyTerm::new(id, label))
}

/// GAZ term for a country name; unknown names map to the generic location term.
pub(super) fn country(name: &str) -> OntologyTerm {
    known_country(name).unwrap_or_else(|| {
        tracing::debug!(country = name, "no GAZ term for country");
        OntologyTerm::new(UNKNOWN_LOCATION.0, UNKNOWN_LOCATION.1)
    })
}

/// Sample origin term for a BBMRI.de sample material type.
pub(super) fn sample_origin(sample_type: &str) -> OntologyTerm {
    let sample_type = sample_type.to_ascii_lowercase();
    let (id, label) = SAMPLE_ORIGINS
        .iter()
        .find(|(fragment, _, _)| sample_type.contains(fragment))
        .map(|&(_, id, label)| (id, label))
        .unwrap_or(DEFAULT_ORIGIN);
    OntologyTerm::new(id, label)
}
