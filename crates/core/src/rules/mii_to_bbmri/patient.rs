use crate::constants::BBMRI_PATIENT_PROFILE;
use crate::error::TransformResult;
use crate::record::{ClinicalRecord, RecordKind};
use crate::rules::profiles::InputProfile;
use crate::rules::{unrepresentable, wrong_kind, PatientIds, TransformOutput, TransformRule};
use fhir::Resource;

/// MII Person Patient to BBMRI.de Patient.
pub(crate) struct PatientRule {
    ids: PatientIds,
}

impl PatientRule {
    pub(crate) fn new(ids: PatientIds) -> Self {
        Self { ids }
    }
}

impl TransformRule for PatientRule {
    fn input_kind(&self) -> RecordKind {
        RecordKind::Patient
    }

    fn name(&self) -> &'static str {
        "mii2bbmri/patient"
    }

    fn map(&self, record: &ClinicalRecord) -> TransformResult<TransformOutput> {
        let ClinicalRecord::Patient(input) = record else {
            return Err(wrong_kind(RecordKind::Patient, record));
        };
        if InputProfile::find(input.profiles(), &[InputProfile::MiiPatient]).is_none() {
            return Ok(Vec::new());
        }

        let mut out = input.clone();
        if let Some(id) = input.id.as_deref() {
            out.id = match self.ids.map_id(id) {
                Ok(mapped) => Some(mapped),
                Err(err) => return Ok(unrepresentable(self.name(), Some(id), err)),
            };
        }
        out.set_profile(BBMRI_PATIENT_PROFILE);
        Ok(vec![ClinicalRecord::Patient(out)])
    }
}
