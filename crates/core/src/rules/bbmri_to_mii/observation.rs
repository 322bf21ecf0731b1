use crate::concept_map::ConceptMap;
use crate::constants::{
    ICD_10_GM_SYSTEM, LOINC_DEATH_CATEGORY, LOINC_SYSTEM, MII_TODESURSACHE_PROFILE,
    SNOMED_DEATH_CATEGORY, SNOMED_SYSTEM,
};
use crate::error::TransformResult;
use crate::record::{ClinicalRecord, RecordKind};
use crate::rules::profiles::InputProfile;
use crate::rules::{unrepresentable, wrong_kind, PatientIds, TransformOutput, TransformRule};
use fhir::{CodeableConcept, Coding, Condition, Meta, Observation, Resource};
use std::sync::Arc;

/// BBMRI.de CauseOfDeath observation to MII Todesursache condition.
///
/// Other observations have no MII counterpart and produce nothing.
pub(crate) struct CauseOfDeathRule {
    cause_of_death: Option<Arc<ConceptMap>>,
    ids: PatientIds,
}

impl CauseOfDeathRule {
    pub(crate) fn new(cause_of_death: Option<Arc<ConceptMap>>, ids: PatientIds) -> Self {
        Self {
            cause_of_death,
            ids,
        }
    }

    fn cause(&self, value: &CodeableConcept) -> Option<CodeableConcept> {
        let coding = value.coding.first()?;
        let translated = coding
            .code
            .as_deref()
            .zip(self.cause_of_death.as_deref())
            .and_then(|(code, table)| table.lookup(code));

        let coding = match translated {
            Some(mapped) => Coding::new(ICD_10_GM_SYSTEM, mapped),
            None => coding.clone(),
        };
        Some(CodeableConcept::from_coding(coding))
    }

    fn todesursache(&self, input: &Observation) -> TransformOutput {
        let subject = match self.ids.map_subject(input.subject.as_ref()) {
            Ok(subject) => subject,
            Err(err) => return unrepresentable(self.name(), input.id.as_deref(), err),
        };

        let condition = Condition {
            id: input.id.clone(),
            meta: Some(Meta {
                profile: vec![MII_TODESURSACHE_PROFILE.to_string()],
                ..Meta::default()
            }),
            category: vec![
                CodeableConcept::from_coding(Coding::new(LOINC_SYSTEM, LOINC_DEATH_CATEGORY)),
                CodeableConcept::from_coding(Coding::new(SNOMED_SYSTEM, SNOMED_DEATH_CATEGORY)),
            ],
            code: input.value_codeable_concept.as_ref().and_then(|v| self.cause(v)),
            subject,
            recorded_date: input.effective_date_time.clone(),
            ..Condition::default()
        };
        vec![ClinicalRecord::Condition(condition)]
    }
}

impl TransformRule for CauseOfDeathRule {
    fn input_kind(&self) -> RecordKind {
        RecordKind::Observation
    }

    fn name(&self) -> &'static str {
        "bbmri2mii/cause-of-death"
    }

    fn map(&self, record: &ClinicalRecord) -> TransformResult<TransformOutput> {
        let ClinicalRecord::Observation(observation) = record else {
            return Err(wrong_kind(RecordKind::Observation, record));
        };

        match InputProfile::find(observation.profiles(), &[InputProfile::BbmriCauseOfDeath]) {
            Some(InputProfile::BbmriCauseOfDeath) => Ok(self.todesursache(observation)),
            _ => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{BBMRI_CAUSE_OF_DEATH_PROFILE, ICD_10_SYSTEM, LOINC_CAUSE_OF_DEATH};
    use crate::id_mapping::IdentityMapper;
    use crate::rules::test_support::{meta, table};
    use fhir::Reference;

    fn rule(cause_of_death: Option<Arc<ConceptMap>>) -> CauseOfDeathRule {
        CauseOfDeathRule::new(
            cause_of_death,
            PatientIds::new(Arc::new(IdentityMapper), "bbmri", "mii"),
        )
    }

    fn cause_of_death(profile: &str, code: &str) -> ClinicalRecord {
        ClinicalRecord::Observation(Observation {
            id: Some("o-1".into()),
            meta: meta(profile),
            status: Some("final".into()),
            code: Some(CodeableConcept::from_coding(Coding::new(
                LOINC_SYSTEM,
                LOINC_CAUSE_OF_DEATH,
            ))),
            subject: Some(Reference::to("Patient", "p-1")),
            effective_date_time: Some("2020-01-01".into()),
            value_codeable_concept: Some(CodeableConcept::from_coding(Coding::new(
                ICD_10_SYSTEM,
                code,
            ))),
            ..Observation::default()
        })
    }

    fn promoted(out: &[ClinicalRecord]) -> &Condition {
        match out {
            [ClinicalRecord::Condition(c)] => c,
            other => panic!("expected one Condition, got {other:?}"),
        }
    }

    #[test]
    fn promotes_observation_to_condition() {
        let out = rule(None)
            .map(&cause_of_death(BBMRI_CAUSE_OF_DEATH_PROFILE, "I21.0"))
            .expect("map observation");
        let condition = promoted(&out);

        assert_eq!(condition.id.as_deref(), Some("o-1"));
        assert_eq!(condition.profiles(), [MII_TODESURSACHE_PROFILE.to_string()]);
        assert_eq!(condition.recorded_date.as_deref(), Some("2020-01-01"));
        assert_eq!(
            condition.subject.as_ref().and_then(|s| s.reference.as_deref()),
            Some("Patient/p-1")
        );
        assert!(condition.category[0].has_coding(LOINC_SYSTEM, LOINC_DEATH_CATEGORY));
        assert!(condition.category[1].has_coding(SNOMED_SYSTEM, SNOMED_DEATH_CATEGORY));

        let code = condition.code.as_ref().expect("code");
        assert!(code.has_coding(ICD_10_SYSTEM, "I21.0"));
    }

    #[test]
    fn table_translates_known_codes_and_passes_others_through() {
        let rule = rule(Some(table(&[("I21.0", "I21.00")])));

        let out = rule
            .map(&cause_of_death(BBMRI_CAUSE_OF_DEATH_PROFILE, "I21.0"))
            .expect("map observation");
        let code = promoted(&out).code.as_ref().expect("code");
        assert!(code.has_coding(ICD_10_GM_SYSTEM, "I21.00"));

        let out = rule
            .map(&cause_of_death(BBMRI_CAUSE_OF_DEATH_PROFILE, "C34.9"))
            .expect("map observation");
        let code = promoted(&out).code.as_ref().expect("code");
        assert!(code.has_coding(ICD_10_SYSTEM, "C34.9"));
    }

    #[test]
    fn other_observations_produce_nothing() {
        let out = rule(None)
            .map(&cause_of_death("https://example.org/Observation", "I21.0"))
            .expect("map observation");
        assert!(out.is_empty());
    }
}
