//! BBMRI.de Specimen to MII Specimen.
//!
//! A specimen maps to at most two records: an optional synthesized MII Diagnose condition for
//! the sample diagnosis, followed by the specimen itself.

use crate::concept_map::ConceptMap;
use crate::constants::{
    BBMRI_CUSTODIAN_EXTENSION, BBMRI_SAMPLE_DIAGNOSIS_EXTENSION,
    BBMRI_SAMPLE_MATERIAL_TYPE_SYSTEM, BBMRI_STORAGE_TEMPERATURE_EXTENSION, ICD_10_GM_SYSTEM,
    MII_DIAGNOSE_EXTENSION, MII_DIAGNOSE_PROFILE, MII_SPECIMEN_PROFILE,
    MII_TEMPERATURBEDINGUNGEN_EXTENSION, MII_VERWALTENDE_ORGANISATION_EXTENSION, SNOMED_SYSTEM,
};
use crate::error::TransformResult;
use crate::record::{ClinicalRecord, RecordKind};
use crate::rules::profiles::InputProfile;
use crate::rules::temperature::range_for_code;
use crate::rules::{
    body_site_in_icd_o_3, recode, unrepresentable, wrong_kind, PatientIds, TransformOutput,
    TransformRule,
};
use fhir::extension::find;
use fhir::{
    CodeableConcept, Coding, Condition, Extension, ExtensionValue, Meta, Range, Reference,
    Resource, Specimen, SpecimenProcessing,
};
use std::sync::Arc;
use transfair_uuid::IdSource;

pub(crate) struct SpecimenRule {
    sample_type: Arc<ConceptMap>,
    diagnosis: Option<Arc<ConceptMap>>,
    id_source: Arc<dyn IdSource>,
    ids: PatientIds,
}

impl SpecimenRule {
    pub(crate) fn new(
        sample_type: Arc<ConceptMap>,
        diagnosis: Option<Arc<ConceptMap>>,
        id_source: Arc<dyn IdSource>,
        ids: PatientIds,
    ) -> Self {
        Self {
            sample_type,
            diagnosis,
            id_source,
            ids,
        }
    }

    fn specimen(&self, input: &Specimen) -> TransformOutput {
        let id = input.id.as_deref();

        let Some(collected) = input.collected_date_time() else {
            return unrepresentable(self.name(), id, "specimen has no collection date");
        };
        let Some(specimen_type) = self.snomed_sample_type(input) else {
            return unrepresentable(self.name(), id, "sample type has no SNOMED CT counterpart");
        };
        let subject = match self.ids.map_subject(input.subject.as_ref()) {
            Ok(subject) => subject,
            Err(err) => return unrepresentable(self.name(), id, err),
        };

        let mut out = input.clone();
        out.extension.clear();
        out.set_profile(MII_SPECIMEN_PROFILE);
        out.specimen_type = Some(specimen_type);
        out.subject = subject;

        if let Some(collection) = out.collection.as_mut() {
            collection.extension.clear();
            collection.body_site = collection.body_site.as_ref().and_then(body_site_in_icd_o_3);
        }

        if let Some((low, high)) = storage_temperature(input).and_then(range_for_code) {
            let temperature = Extension::new(
                MII_TEMPERATURBEDINGUNGEN_EXTENSION,
                ExtensionValue::Range(Range::celsius(low, high)),
            );
            match out.processing.first_mut() {
                Some(processing) => processing.extension.push(temperature),
                None => out.processing.push(SpecimenProcessing {
                    extension: vec![temperature],
                    ..SpecimenProcessing::default()
                }),
            }
        }

        if let Some(custodian) =
            find(&input.extension, BBMRI_CUSTODIAN_EXTENSION).and_then(Extension::value_reference)
        {
            out.extension.push(Extension::new(
                MII_VERWALTENDE_ORGANISATION_EXTENSION,
                ExtensionValue::Reference(custodian.clone()),
            ));
        }

        let mut output = Vec::with_capacity(2);
        if let Some(diagnosis) = self.sample_diagnosis(input, collected, &out) {
            if let Some(condition_id) = diagnosis.id.as_deref() {
                out.extension.push(Extension::new(
                    MII_DIAGNOSE_EXTENSION,
                    ExtensionValue::Reference(Reference::to("Condition", condition_id)),
                ));
            }
            output.push(ClinicalRecord::Condition(diagnosis));
        }
        output.push(ClinicalRecord::Specimen(out));
        output
    }

    fn snomed_sample_type(&self, input: &Specimen) -> Option<CodeableConcept> {
        let code = input
            .specimen_type
            .as_ref()?
            .coding_in(BBMRI_SAMPLE_MATERIAL_TYPE_SYSTEM)?
            .code
            .as_deref()?;
        let snomed = self.sample_type.lookup(code)?;
        Some(CodeableConcept::from_coding(Coding::new(SNOMED_SYSTEM, snomed)))
    }

    /// Condition for the first sample diagnosis, or `None` if there is none or its code has no
    /// ICD-10-GM translation.
    fn sample_diagnosis(
        &self,
        input: &Specimen,
        collected: &str,
        mapped: &Specimen,
    ) -> Option<Condition> {
        let code = find(&input.extension, BBMRI_SAMPLE_DIAGNOSIS_EXTENSION)?
            .value_codeable_concept()?
            .first_code()?;

        let Some(translated) = recode(self.diagnosis.as_deref(), code) else {
            tracing::warn!(
                rule = self.name(),
                id = input.id.as_deref().unwrap_or("<none>"),
                code,
                "sample diagnosis has no ICD-10-GM code; specimen kept without it"
            );
            return None;
        };

        Some(Condition {
            id: Some(self.id_source.next_id().into_string()),
            meta: Some(Meta {
                profile: vec![MII_DIAGNOSE_PROFILE.to_string()],
                ..Meta::default()
            }),
            code: Some(CodeableConcept::from_coding(Coding::new(
                ICD_10_GM_SYSTEM,
                translated,
            ))),
            subject: mapped.subject.clone(),
            recorded_date: Some(collected.to_string()),
            ..Condition::default()
        })
    }
}

fn storage_temperature(specimen: &Specimen) -> Option<&str> {
    find(&specimen.extension, BBMRI_STORAGE_TEMPERATURE_EXTENSION)?
        .value_codeable_concept()?
        .first_code()
}

impl TransformRule for SpecimenRule {
    fn input_kind(&self) -> RecordKind {
        RecordKind::Specimen
    }

    fn name(&self) -> &'static str {
        "bbmri2mii/specimen"
    }

    fn map(&self, record: &ClinicalRecord) -> TransformResult<TransformOutput> {
        let ClinicalRecord::Specimen(specimen) = record else {
            return Err(wrong_kind(RecordKind::Specimen, record));
        };

        match InputProfile::find(specimen.profiles(), &[InputProfile::BbmriSpecimen]) {
            Some(InputProfile::BbmriSpecimen) => Ok(self.specimen(specimen)),
            _ => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concept_map::TranslationTables;
    use crate::constants::{
        BBMRI_SPECIMEN_PROFILE, BBMRI_STORAGE_TEMPERATURE_SYSTEM, ICD_10_SYSTEM, ICD_O_3_SYSTEM,
        MII_ID_DOMAIN,
    };
    use crate::rules::test_support::{context, specimen, table};
    use crate::rules::RuleContext;
    use fhir::SpecimenCollection;

    fn rule(ctx: &RuleContext) -> SpecimenRule {
        SpecimenRule::new(
            ctx.tables.require_sample_type().expect("sample type table"),
            ctx.tables.diagnosis.clone(),
            ctx.id_source.clone(),
            PatientIds::new(ctx.id_mapper.clone(), "bbmri", MII_ID_DOMAIN),
        )
    }

    fn tables(diagnosis: Option<&[(&str, &str)]>) -> TranslationTables {
        TranslationTables {
            sample_type: Some(table(&[("whole-blood", "420135007")])),
            diagnosis: diagnosis.map(table),
            ..TranslationTables::default()
        }
    }

    fn concept_extension(url: &str, system: &str, code: &str) -> Extension {
        Extension::new(
            url,
            ExtensionValue::CodeableConcept(CodeableConcept::from_coding(Coding::new(
                system, code,
            ))),
        )
    }

    fn bbmri_specimen(date: Option<&str>, extension: Vec<Extension>) -> ClinicalRecord {
        let mut specimen = specimen(BBMRI_SPECIMEN_PROFILE, date, extension);
        specimen.specimen_type = Some(CodeableConcept::from_coding(Coding::new(
            BBMRI_SAMPLE_MATERIAL_TYPE_SYSTEM,
            "whole-blood",
        )));
        ClinicalRecord::Specimen(specimen)
    }

    #[test]
    fn sample_diagnosis_is_promoted_to_condition() {
        let ctx = context(tables(None));
        let input = bbmri_specimen(
            Some("2021-03-04"),
            vec![
                concept_extension(BBMRI_SAMPLE_DIAGNOSIS_EXTENSION, ICD_10_SYSTEM, "C50.9"),
                concept_extension(
                    BBMRI_STORAGE_TEMPERATURE_EXTENSION,
                    BBMRI_STORAGE_TEMPERATURE_SYSTEM,
                    "temperature-60to-85",
                ),
            ],
        );

        let out = rule(&ctx).map(&input).expect("map specimen");

        let [ClinicalRecord::Condition(condition), ClinicalRecord::Specimen(mapped)] =
            out.as_slice()
        else {
            panic!("expected Condition then Specimen, got {out:?}");
        };

        assert_eq!(condition.id.as_deref(), Some("gen-1"));
        assert_eq!(condition.profiles(), [MII_DIAGNOSE_PROFILE.to_string()]);
        assert_eq!(condition.recorded_date.as_deref(), Some("2021-03-04"));
        assert_eq!(condition.subject, mapped.subject);
        assert!(condition
            .code
            .as_ref()
            .expect("code")
            .has_coding(ICD_10_GM_SYSTEM, "C50.9"));

        assert_eq!(mapped.profiles(), [MII_SPECIMEN_PROFILE.to_string()]);
        assert!(mapped
            .specimen_type
            .as_ref()
            .expect("type")
            .has_coding(SNOMED_SYSTEM, "420135007"));

        let link = find(&mapped.extension, MII_DIAGNOSE_EXTENSION).expect("diagnose link");
        assert_eq!(
            link.value_reference().and_then(|r| r.reference.as_deref()),
            Some("Condition/gen-1")
        );

        let temperature = find(
            &mapped.processing[0].extension,
            MII_TEMPERATURBEDINGUNGEN_EXTENSION,
        )
        .and_then(Extension::value_range)
        .expect("temperature range");
        assert_eq!(temperature.bounds(), Some((-85.0, -60.0)));

        assert!(find(&mapped.extension, BBMRI_STORAGE_TEMPERATURE_EXTENSION).is_none());
    }

    #[test]
    fn missing_collection_date_produces_nothing() {
        let ctx = context(tables(None));
        let input = bbmri_specimen(
            None,
            vec![concept_extension(
                BBMRI_SAMPLE_DIAGNOSIS_EXTENSION,
                ICD_10_SYSTEM,
                "C50.9",
            )],
        );

        let out = rule(&ctx).map(&input).expect("map specimen");
        assert!(out.is_empty());
    }

    #[test]
    fn unknown_sample_type_drops_specimen() {
        let ctx = context(tables(None));
        let mut input = specimen(BBMRI_SPECIMEN_PROFILE, Some("2021-03-04"), Vec::new());
        input.specimen_type = Some(CodeableConcept::from_coding(Coding::new(
            BBMRI_SAMPLE_MATERIAL_TYPE_SYSTEM,
            "tissue-other",
        )));

        let out = rule(&ctx)
            .map(&ClinicalRecord::Specimen(input))
            .expect("map specimen");
        assert!(out.is_empty());
    }

    #[test]
    fn untranslatable_diagnosis_keeps_specimen_only() {
        let ctx = context(tables(Some(&[("C61", "C61")][..])));
        let input = bbmri_specimen(
            Some("2021-03-04"),
            vec![concept_extension(
                BBMRI_SAMPLE_DIAGNOSIS_EXTENSION,
                ICD_10_SYSTEM,
                "C50.9",
            )],
        );

        let out = rule(&ctx).map(&input).expect("map specimen");
        let [ClinicalRecord::Specimen(mapped)] = out.as_slice() else {
            panic!("expected only the Specimen, got {out:?}");
        };
        assert!(find(&mapped.extension, MII_DIAGNOSE_EXTENSION).is_none());
    }

    #[test]
    fn custodian_and_body_site_are_carried_over() {
        let ctx = context(tables(None));
        let mut input = specimen(
            BBMRI_SPECIMEN_PROFILE,
            Some("2021-03-04"),
            vec![Extension::new(
                BBMRI_CUSTODIAN_EXTENSION,
                ExtensionValue::Reference(Reference::to("Organization", "collection-1")),
            )],
        );
        input.specimen_type = Some(CodeableConcept::from_coding(Coding::new(
            BBMRI_SAMPLE_MATERIAL_TYPE_SYSTEM,
            "whole-blood",
        )));
        input.collection = Some(SpecimenCollection {
            collected_date_time: Some("2021-03-04".into()),
            body_site: Some(CodeableConcept::from_coding(Coding::new(
                "urn:local",
                "C50.9",
            ))),
            extension: vec![Extension::new(
                "https://example.org/fasting",
                ExtensionValue::String("yes".into()),
            )],
            ..SpecimenCollection::default()
        });

        let out = rule(&ctx)
            .map(&ClinicalRecord::Specimen(input))
            .expect("map specimen");
        let [ClinicalRecord::Specimen(mapped)] = out.as_slice() else {
            panic!("expected one Specimen, got {out:?}");
        };

        let custodian = find(&mapped.extension, MII_VERWALTENDE_ORGANISATION_EXTENSION)
            .and_then(Extension::value_reference)
            .expect("custodian");
        assert_eq!(custodian.reference.as_deref(), Some("Organization/collection-1"));

        let collection = mapped.collection.as_ref().expect("collection");
        assert!(collection.extension.is_empty());
        assert!(collection
            .body_site
            .as_ref()
            .expect("body site")
            .has_coding(ICD_O_3_SYSTEM, "C50.9"));
    }

    #[test]
    fn output_never_exceeds_two_records() {
        let ctx = context(tables(None));
        let input = bbmri_specimen(
            Some("2021-03-04"),
            vec![
                concept_extension(BBMRI_SAMPLE_DIAGNOSIS_EXTENSION, ICD_10_SYSTEM, "C50.9"),
                concept_extension(BBMRI_SAMPLE_DIAGNOSIS_EXTENSION, ICD_10_SYSTEM, "C61"),
            ],
        );

        let out = rule(&ctx).map(&input).expect("map specimen");
        assert_eq!(out.len(), 2);
    }
}
