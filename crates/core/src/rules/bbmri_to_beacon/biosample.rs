use super::terms;
use crate::constants::BBMRI_SAMPLE_MATERIAL_TYPE_SYSTEM;
use crate::error::TransformResult;
use crate::record::{ClinicalRecord, RecordKind};
use crate::rules::profiles::InputProfile;
use crate::rules::{unrepresentable, wrong_kind, TransformOutput, TransformRule};
use beacon::{Biosample, SampleInfo};
use fhir::{Resource, Specimen};

/// BBMRI.de Specimen to Beacon biosample.
pub(crate) struct BiosampleRule;

fn sample_type(specimen: &Specimen) -> Option<&str> {
    let concept = specimen.specimen_type.as_ref()?;
    concept
        .coding_in(BBMRI_SAMPLE_MATERIAL_TYPE_SYSTEM)
        .and_then(|c| c.code.as_deref())
        .or_else(|| concept.first_code())
}

impl TransformRule for BiosampleRule {
    fn input_kind(&self) -> RecordKind {
        RecordKind::Specimen
    }

    fn name(&self) -> &'static str {
        "bbmri2beacon/biosample"
    }

    fn map(&self, record: &ClinicalRecord) -> TransformResult<TransformOutput> {
        let ClinicalRecord::Specimen(specimen) = record else {
            return Err(wrong_kind(RecordKind::Specimen, record));
        };
        if InputProfile::find(specimen.profiles(), &[InputProfile::BbmriSpecimen]).is_none() {
            return Ok(Vec::new());
        }
        let Some(id) = specimen.id.clone() else {
            return Ok(unrepresentable(self.name(), None, "specimen has no id"));
        };

        let individual_id = specimen
            .subject
            .as_ref()
            .and_then(|s| s.reference.as_deref())
            .map(|r| r.strip_prefix("Patient/").unwrap_or(r).to_string());

        let biosample = Biosample {
            id,
            individual_id,
            collection_date: specimen.collected_date_time().map(str::to_string),
            info: SampleInfo::human(),
            sample_origin_type: sample_type(specimen).map(terms::sample_origin),
        };
        Ok(vec![ClinicalRecord::Biosample(biosample)])
    }
}
