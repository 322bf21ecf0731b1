use crate::concept_map::ConceptMap;
use crate::constants::{ICD_10_GM_SYSTEM, MII_DIAGNOSE_PROFILE};
use crate::error::TransformResult;
use crate::record::{ClinicalRecord, RecordKind};
use crate::rules::profiles::InputProfile;
use crate::rules::{
    recode, unrepresentable, wrong_kind, PatientIds, TransformOutput, TransformRule,
};
use fhir::{CodeableConcept, Coding, Condition, Resource};
use std::sync::Arc;

/// BBMRI.de Condition to MII Diagnose, recoding ICD-10 as ICD-10-GM.
pub(crate) struct ConditionRule {
    diagnosis: Option<Arc<ConceptMap>>,
    ids: PatientIds,
}

impl ConditionRule {
    pub(crate) fn new(diagnosis: Option<Arc<ConceptMap>>, ids: PatientIds) -> Self {
        Self { diagnosis, ids }
    }

    fn diagnose(&self, input: &Condition) -> TransformOutput {
        let code = match input.code.as_ref().and_then(CodeableConcept::first_code) {
            Some(code) => match recode(self.diagnosis.as_deref(), code) {
                Some(mapped) => Some(CodeableConcept::from_coding(Coding::new(
                    ICD_10_GM_SYSTEM,
                    mapped,
                ))),
                None => {
                    return unrepresentable(
                        self.name(),
                        input.id.as_deref(),
                        format_args!("no ICD-10-GM code for '{code}'"),
                    );
                }
            },
            None => None,
        };

        let subject = match self.ids.map_subject(input.subject.as_ref()) {
            Ok(subject) => subject,
            Err(err) => return unrepresentable(self.name(), input.id.as_deref(), err),
        };

        let mut out = input.clone();
        out.set_profile(MII_DIAGNOSE_PROFILE);
        out.code = code;
        out.subject = subject;
        vec![ClinicalRecord::Condition(out)]
    }
}

impl TransformRule for ConditionRule {
    fn input_kind(&self) -> RecordKind {
        RecordKind::Condition
    }

    fn name(&self) -> &'static str {
        "bbmri2mii/condition"
    }

    fn map(&self, record: &ClinicalRecord) -> TransformResult<TransformOutput> {
        let ClinicalRecord::Condition(condition) = record else {
            return Err(wrong_kind(RecordKind::Condition, record));
        };

        match InputProfile::find(condition.profiles(), &[InputProfile::BbmriCondition]) {
            Some(InputProfile::BbmriCondition) => Ok(self.diagnose(condition)),
            _ => Ok(Vec::new()),
        }
    }
}
