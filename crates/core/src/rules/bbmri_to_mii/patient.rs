use crate::constants::MII_PATIENT_PROFILE;
use crate::error::TransformResult;
use crate::record::{ClinicalRecord, RecordKind};
use crate::rules::profiles::InputProfile;
use crate::rules::{unrepresentable, wrong_kind, PatientIds, TransformOutput, TransformRule};
use fhir::{Patient, Resource};

/// BBMRI.de Patient to MII Person Patient.
pub(crate) struct PatientRule {
    ids: PatientIds,
}

impl PatientRule {
    pub(crate) fn new(ids: PatientIds) -> Self {
        Self { ids }
    }

    fn patient(&self, input: &Patient) -> TransformOutput {
        let mut out = input.clone();
        if let Some(id) = input.id.as_deref() {
            match self.ids.map_id(id) {
                Ok(mapped) => out.id = Some(mapped),
                Err(err) => return unrepresentable(self.name(), Some(id), err),
            }
        }
        out.set_profile(MII_PATIENT_PROFILE);
        vec![ClinicalRecord::Patient(out)]
    }
}

impl TransformRule for PatientRule {
    fn input_kind(&self) -> RecordKind {
        RecordKind::Patient
    }

    fn name(&self) -> &'static str {
        "bbmri2mii/patient"
    }

    fn map(&self, record: &ClinicalRecord) -> TransformResult<TransformOutput> {
        let ClinicalRecord::Patient(patient) = record else {
            return Err(wrong_kind(RecordKind::Patient, record));
        };

        match InputProfile::find(patient.profiles(), &[InputProfile::BbmriPatient]) {
            Some(InputProfile::BbmriPatient) => Ok(self.patient(patient)),
            _ => Ok(Vec::new()),
        }
    }
}
