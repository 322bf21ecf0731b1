use super::terms;
use crate::error::TransformResult;
use crate::record::{ClinicalRecord, RecordKind};
use crate::rules::profiles::InputProfile;
use crate::rules::{unrepresentable, wrong_kind, TransformOutput, TransformRule};
use beacon::{Individual, OntologyTerm};
use fhir::{Patient, Resource};

/// BBMRI.de Patient to Beacon individual.
pub(crate) struct IndividualRule;

/// Country of the first address: its `country` field, else the last address line naming a known
/// country, else the generic location term.
fn geographic_origin(patient: &Patient) -> Option<OntologyTerm> {
    let address = patient.address.first()?;

    if let Some(country) = address.country.as_deref().filter(|c| !c.trim().is_empty()) {
        return Some(terms::country(country));
    }

    let known = address
        .line
        .iter()
        .rev()
        .find_map(|line| terms::known_country(line));
    Some(known.unwrap_or_else(|| terms::country("")))
}

impl TransformRule for IndividualRule {
    fn input_kind(&self) -> RecordKind {
        RecordKind::Patient
    }

    fn name(&self) -> &'static str {
        "bbmri2beacon/individual"
    }

    fn map(&self, record: &ClinicalRecord) -> TransformResult<TransformOutput> {
        let ClinicalRecord::Patient(patient) = record else {
            return Err(wrong_kind(RecordKind::Patient, record));
        };
        if InputProfile::find(patient.profiles(), &[InputProfile::BbmriPatient]).is_none() {
            return Ok(Vec::new());
        }
        let Some(id) = patient.id.clone() else {
            return Ok(unrepresentable(self.name(), None, "patient has no id"));
        };

        let individual = Individual {
            id,
            sex: terms::sex(patient.gender.as_deref()),
            geographic_origin: geographic_origin(patient),
            measures: Vec::new(),
        };
        Ok(vec![ClinicalRecord::Individual(individual)])
    }
}
