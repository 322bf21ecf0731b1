//! MII conditions to BBMRI.de.
//!
//! A Todesursache condition becomes a BBMRI.de CauseOfDeath observation; a Diagnose condition
//! stays a condition. Conditions with neither profile have no BBMRI.de counterpart.

use crate::concept_map::ConceptMap;
use crate::constants::{
    BBMRI_CAUSE_OF_DEATH_PROFILE, BBMRI_CONDITION_PROFILE, ICD_10_SYSTEM, LOINC_CAUSE_OF_DEATH,
    LOINC_SYSTEM,
};
use crate::error::TransformResult;
use crate::record::{ClinicalRecord, RecordKind};
use crate::rules::profiles::InputProfile;
use crate::rules::{
    recode, unrepresentable, wrong_kind, PatientIds, TransformOutput, TransformRule,
};
use fhir::{CodeableConcept, Coding, Condition, Meta, Observation, Resource};
use std::sync::Arc;

pub(crate) struct ConditionRule {
    diagnosis: Option<Arc<ConceptMap>>,
    cause_of_death: Option<Arc<ConceptMap>>,
    ids: PatientIds,
}

impl ConditionRule {
    pub(crate) fn new(
        diagnosis: Option<Arc<ConceptMap>>,
        cause_of_death: Option<Arc<ConceptMap>>,
        ids: PatientIds,
    ) -> Self {
        Self {
            diagnosis,
            cause_of_death,
            ids,
        }
    }

    fn cause_of_death(&self, input: &Condition) -> TransformOutput {
        let subject = match self.ids.map_subject(input.subject.as_ref()) {
            Ok(subject) => subject,
            Err(err) => return unrepresentable(self.name(), input.id.as_deref(), err),
        };

        let value = input
            .code
            .as_ref()
            .and_then(CodeableConcept::first_code)
            .map(|code| {
                let code = self
                    .cause_of_death
                    .as_deref()
                    .and_then(|table| table.lookup(code))
                    .unwrap_or(code);
                CodeableConcept::from_coding(Coding::new(ICD_10_SYSTEM, code))
            });

        let observation = Observation {
            id: input.id.clone(),
            meta: Some(Meta {
                profile: vec![BBMRI_CAUSE_OF_DEATH_PROFILE.to_string()],
                ..Meta::default()
            }),
            status: Some("final".to_string()),
            code: Some(CodeableConcept::from_coding(Coding::new(
                LOINC_SYSTEM,
                LOINC_CAUSE_OF_DEATH,
            ))),
            subject,
            effective_date_time: input.recorded_date.clone(),
            value_codeable_concept: value,
            ..Observation::default()
        };
        vec![ClinicalRecord::Observation(observation)]
    }

    fn diagnosis(&self, input: &Condition) -> TransformOutput {
        let code = match input.code.as_ref().and_then(CodeableConcept::first_code) {
            Some(code) => match recode(self.diagnosis.as_deref(), code) {
                Some(mapped) => Some(CodeableConcept::from_coding(Coding::new(
                    ICD_10_SYSTEM,
                    mapped,
                ))),
                None => {
                    return unrepresentable(
                        self.name(),
                        input.id.as_deref(),
                        format_args!("no ICD-10 code for '{code}'"),
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
        out.set_profile(BBMRI_CONDITION_PROFILE);
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
        "mii2bbmri/condition"
    }

    fn map(&self, record: &ClinicalRecord) -> TransformResult<TransformOutput> {
        let ClinicalRecord::Condition(condition) = record else {
            return Err(wrong_kind(RecordKind::Condition, record));
        };

        let accepted = [InputProfile::MiiTodesursache, InputProfile::MiiDiagnose];
        let output = match InputProfile::find(condition.profiles(), &accepted) {
            Some(InputProfile::MiiTodesursache) => self.cause_of_death(condition),
            Some(InputProfile::MiiDiagnose) => self.diagnosis(condition),
            _ => Vec::new(),
        };
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{ICD_10_GM_SYSTEM, MII_DIAGNOSE_PROFILE, MII_TODESURSACHE_PROFILE};
    use crate::id_mapping::IdentityMapper;
    use crate::rules::test_support::{meta, table};
    use fhir::Reference;

    fn rule(
        diagnosis: Option<Arc<ConceptMap>>,
        cause_of_death: Option<Arc<ConceptMap>>,
    ) -> ConditionRule {
        ConditionRule::new(
            diagnosis,
            cause_of_death,
            PatientIds::new(Arc::new(IdentityMapper), "mii", "bbmri"),
        )
    }

    fn condition(profile: &str, code: &str) -> ClinicalRecord {
        ClinicalRecord::Condition(Condition {
            id: Some("c-1".into()),
            meta: meta(profile),
            code: Some(CodeableConcept::from_coding(Coding::new(
                ICD_10_GM_SYSTEM,
                code,
            ))),
            subject: Some(Reference::to("Patient", "p-1")),
            recorded_date: Some("2020-01-01".into()),
            ..Condition::default()
        })
    }

    #[test]
    fn todesursache_is_demoted_to_observation() {
        let out = rule(None, None)
            .map(&condition(MII_TODESURSACHE_PROFILE, "I21.0"))
            .expect("map condition");

        let [ClinicalRecord::Observation(observation)] = out.as_slice() else {
            panic!("expected one Observation, got {out:?}");
        };
        assert_eq!(observation.id.as_deref(), Some("c-1"));
        assert_eq!(observation.status.as_deref(), Some("final"));
        assert_eq!(observation.effective_date_time.as_deref(), Some("2020-01-01"));
        assert_eq!(observation.profiles(), [BBMRI_CAUSE_OF_DEATH_PROFILE.to_string()]);
        assert!(observation
            .code
            .as_ref()
            .expect("code")
            .has_coding(LOINC_SYSTEM, LOINC_CAUSE_OF_DEATH));
        assert!(observation
            .value_codeable_concept
            .as_ref()
            .expect("value")
            .has_coding(ICD_10_SYSTEM, "I21.0"));
    }

    #[test]
    fn cause_of_death_table_misses_pass_through() {
        let rule = rule(None, Some(table(&[("I21.00", "I21.0")])));
        let out = rule
            .map(&condition(MII_TODESURSACHE_PROFILE, "C34.9"))
            .expect("map condition");

        let [ClinicalRecord::Observation(observation)] = out.as_slice() else {
            panic!("expected one Observation, got {out:?}");
        };
        assert!(observation
            .value_codeable_concept
            .as_ref()
            .expect("value")
            .has_coding(ICD_10_SYSTEM, "C34.9"));
    }

    #[test]
    fn diagnose_stays_condition_and_drops_on_table_miss() {
        let rule = rule(Some(table(&[("C50.90", "C50.9")])), None);

        let out = rule
            .map(&condition(MII_DIAGNOSE_PROFILE, "C50.90"))
            .expect("map condition");
        let [ClinicalRecord::Condition(mapped)] = out.as_slice() else {
            panic!("expected one Condition, got {out:?}");
        };
        assert_eq!(mapped.profiles(), [BBMRI_CONDITION_PROFILE.to_string()]);
        assert!(mapped
            .code
            .as_ref()
            .expect("code")
            .has_coding(ICD_10_SYSTEM, "C50.9"));

        let dropped = rule
            .map(&condition(MII_DIAGNOSE_PROFILE, "C61"))
            .expect("map condition");
        assert!(dropped.is_empty());
    }

    #[test]
    fn unprofiled_conditions_produce_nothing() {
        let out = rule(None, None)
            .map(&condition("https://example.org/Condition", "C50.9"))
            .expect("map condition");
        assert!(out.is_empty());
    }
}
