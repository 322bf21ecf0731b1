//! MII Specimen to BBMRI.de Specimen.

use crate::concept_map::ConceptMap;
use crate::constants::{
    BBMRI_CUSTODIAN_EXTENSION, BBMRI_SAMPLE_MATERIAL_TYPE_SYSTEM, BBMRI_SAMPLE_TYPE_FALLBACK,
    BBMRI_SPECIMEN_PROFILE, BBMRI_STORAGE_TEMPERATURE_EXTENSION,
    BBMRI_STORAGE_TEMPERATURE_FALLBACK, BBMRI_STORAGE_TEMPERATURE_SYSTEM,
    MII_TEMPERATURBEDINGUNGEN_EXTENSION, MII_VERWALTENDE_ORGANISATION_EXTENSION, SNOMED_SYSTEM,
};
use crate::error::TransformResult;
use crate::record::{ClinicalRecord, RecordKind};
use crate::rules::profiles::InputProfile;
use crate::rules::temperature::code_for_range;
use crate::rules::{
    body_site_in_icd_o_3, unrepresentable, wrong_kind, PatientIds, TransformOutput,
    TransformRule,
};
use fhir::extension::find;
use fhir::{CodeableConcept, Coding, Extension, ExtensionValue, Range, Resource, Specimen};
use std::sync::Arc;

pub(crate) struct SpecimenRule {
    sample_type: Arc<ConceptMap>,
    ids: PatientIds,
}

impl SpecimenRule {
    pub(crate) fn new(sample_type: Arc<ConceptMap>, ids: PatientIds) -> Self {
        Self { sample_type, ids }
    }

    fn specimen(&self, input: &Specimen) -> TransformOutput {
        let id = input.id.as_deref();

        if input.collected_date_time().is_none() {
            return unrepresentable(self.name(), id, "specimen has no collection date");
        }
        let subject = match self.ids.map_subject(input.subject.as_ref()) {
            Ok(subject) => subject,
            Err(err) => return unrepresentable(self.name(), id, err),
        };

        let mut out = input.clone();
        out.extension.clear();
        out.set_profile(BBMRI_SPECIMEN_PROFILE);
        out.specimen_type = Some(self.bbmri_sample_type(input));
        out.subject = subject;

        if let Some(collection) = out.collection.as_mut() {
            collection.extension.clear();
            collection.body_site = collection.body_site.as_ref().and_then(body_site_in_icd_o_3);
        }

        let mut ranges: Vec<Range> = Vec::new();
        for processing in &mut out.processing {
            processing.extension.retain(|extension| {
                if extension.url != MII_TEMPERATURBEDINGUNGEN_EXTENSION {
                    return true;
                }
                ranges.extend(extension.value_range().cloned());
                false
            });
        }
        out.processing
            .retain(|p| !p.extension.is_empty() || !p.other.is_empty());

        if let Some(range) = ranges.first() {
            out.extension.push(Extension::new(
                BBMRI_STORAGE_TEMPERATURE_EXTENSION,
                ExtensionValue::CodeableConcept(CodeableConcept::from_coding(Coding::new(
                    BBMRI_STORAGE_TEMPERATURE_SYSTEM,
                    storage_temperature(range),
                ))),
            ));
        }

        if let Some(custodian) = find(&input.extension, MII_VERWALTENDE_ORGANISATION_EXTENSION)
            .and_then(Extension::value_reference)
        {
            out.extension.push(Extension::new(
                BBMRI_CUSTODIAN_EXTENSION,
                ExtensionValue::Reference(custodian.clone()),
            ));
        }

        vec![ClinicalRecord::Specimen(out)]
    }

    fn bbmri_sample_type(&self, input: &Specimen) -> CodeableConcept {
        let code = input
            .specimen_type
            .as_ref()
            .and_then(|t| t.coding_in(SNOMED_SYSTEM))
            .and_then(|c| c.code.as_deref())
            .and_then(|snomed| self.sample_type.lookup(snomed))
            .unwrap_or(BBMRI_SAMPLE_TYPE_FALLBACK);
        CodeableConcept::from_coding(Coding::new(BBMRI_SAMPLE_MATERIAL_TYPE_SYSTEM, code))
    }
}

fn storage_temperature(range: &Range) -> &'static str {
    range
        .bounds()
        .and_then(|(low, high)| code_for_range(low, high))
        .unwrap_or(BBMRI_STORAGE_TEMPERATURE_FALLBACK)
}

impl TransformRule for SpecimenRule {
    fn input_kind(&self) -> RecordKind {
        RecordKind::Specimen
    }

    fn name(&self) -> &'static str {
        "mii2bbmri/specimen"
    }

    fn map(&self, record: &ClinicalRecord) -> TransformResult<TransformOutput> {
        let ClinicalRecord::Specimen(specimen) = record else {
            return Err(wrong_kind(RecordKind::Specimen, record));
        };

        match InputProfile::find(specimen.profiles(), &[InputProfile::MiiSpecimen]) {
            Some(InputProfile::MiiSpecimen) => Ok(self.specimen(specimen)),
            _ => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{MII_DIAGNOSE_EXTENSION, MII_SPECIMEN_PROFILE};
    use crate::id_mapping::IdentityMapper;
    use crate::rules::test_support::{specimen, table};
    use fhir::{Reference, SpecimenProcessing};

    fn rule() -> SpecimenRule {
        SpecimenRule::new(
            table(&[("420135007", "whole-blood")]),
            PatientIds::new(Arc::new(IdentityMapper), "mii", "bbmri"),
        )
    }

    fn mii_specimen(snomed: &str, range: Range) -> ClinicalRecord {
        let mut specimen = specimen(
            MII_SPECIMEN_PROFILE,
            Some("2021-03-04"),
            vec![
                Extension::new(
                    MII_VERWALTENDE_ORGANISATION_EXTENSION,
                    ExtensionValue::Reference(Reference::to("Organization", "collection-1")),
                ),
                Extension::new(
                    MII_DIAGNOSE_EXTENSION,
                    ExtensionValue::Reference(Reference::to("Condition", "c-1")),
                ),
            ],
        );
        specimen.specimen_type =
            Some(CodeableConcept::from_coding(Coding::new(SNOMED_SYSTEM, snomed)));
        specimen.processing = vec![SpecimenProcessing {
            extension: vec![Extension::new(
                MII_TEMPERATURBEDINGUNGEN_EXTENSION,
                ExtensionValue::Range(range),
            )],
            ..SpecimenProcessing::default()
        }];
        ClinicalRecord::Specimen(specimen)
    }

    fn mapped(out: &[ClinicalRecord]) -> &Specimen {
        match out {
            [ClinicalRecord::Specimen(s)] => s,
            other => panic!("expected one Specimen, got {other:?}"),
        }
    }

    fn storage_code(specimen: &Specimen) -> Option<&str> {
        find(&specimen.extension, BBMRI_STORAGE_TEMPERATURE_EXTENSION)?
            .value_codeable_concept()?
            .first_code()
    }

    #[test]
    fn known_values_map_back_to_bbmri_codes() {
        let out = rule()
            .map(&mii_specimen("420135007", Range::celsius(-85.0, -60.0)))
            .expect("map specimen");
        let specimen = mapped(&out);

        assert_eq!(specimen.profiles(), [BBMRI_SPECIMEN_PROFILE.to_string()]);
        assert!(specimen
            .specimen_type
            .as_ref()
            .expect("type")
            .has_coding(BBMRI_SAMPLE_MATERIAL_TYPE_SYSTEM, "whole-blood"));
        assert_eq!(storage_code(specimen), Some("temperature-60to-85"));
        assert!(specimen.processing.is_empty());

        let custodian = find(&specimen.extension, BBMRI_CUSTODIAN_EXTENSION)
            .and_then(Extension::value_reference)
            .expect("custodian");
        assert_eq!(custodian.reference.as_deref(), Some("Organization/collection-1"));
        assert!(find(&specimen.extension, MII_DIAGNOSE_EXTENSION).is_none());
    }

    #[test]
    fn fractional_temperature_range_matches_whole_degrees() {
        let out = rule()
            .map(&mii_specimen("420135007", Range::celsius(-35.5, -18.2)))
            .expect("map specimen");
        assert_eq!(storage_code(mapped(&out)), Some("temperature-18to-35"));
    }

    #[test]
    fn unknown_values_use_fallback_codes() {
        let out = rule()
            .map(&mii_specimen("258580003", Range::celsius(-80.0, -70.0)))
            .expect("map specimen");
        let specimen = mapped(&out);

        assert!(specimen
            .specimen_type
            .as_ref()
            .expect("type")
            .has_coding(BBMRI_SAMPLE_MATERIAL_TYPE_SYSTEM, BBMRI_SAMPLE_TYPE_FALLBACK));
        assert_eq!(storage_code(specimen), Some(BBMRI_STORAGE_TEMPERATURE_FALLBACK));
    }

    #[test]
    fn missing_collection_date_produces_nothing() {
        let mut input = specimen(MII_SPECIMEN_PROFILE, None, Vec::new());
        input.specimen_type = Some(CodeableConcept::from_coding(Coding::new(
            SNOMED_SYSTEM,
            "420135007",
        )));

        let out = rule()
            .map(&ClinicalRecord::Specimen(input))
            .expect("map specimen");
        assert!(out.is_empty());
    }
}
