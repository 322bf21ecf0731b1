use crate::constants::{
    BBMRI_BIOBANK_PROFILE, BBMRI_ORGANIZATION_DESCRIPTION_EXTENSION,
    MII_BESCHREIBUNG_SAMMLUNG_EXTENSION,
};
use crate::error::TransformResult;
use crate::record::{ClinicalRecord, RecordKind};
use crate::rules::profiles::InputProfile;
use crate::rules::{wrong_kind, TransformOutput, TransformRule};
use fhir::Resource;

/// MII biobank Organization to BBMRI.de Biobank.
pub(crate) struct OrganizationRule;

impl TransformRule for OrganizationRule {
    fn input_kind(&self) -> RecordKind {
        RecordKind::Organization
    }

    fn name(&self) -> &'static str {
        "mii2bbmri/organization"
    }

    fn map(&self, record: &ClinicalRecord) -> TransformResult<TransformOutput> {
        let ClinicalRecord::Organization(input) = record else {
            return Err(wrong_kind(RecordKind::Organization, record));
        };
        if InputProfile::find(input.profiles(), &[InputProfile::MiiOrganization]).is_none() {
            return Ok(Vec::new());
        }

        let mut out = input.clone();
        out.set_profile(BBMRI_BIOBANK_PROFILE);
        out.extension
            .iter_mut()
            .filter(|e| e.url == MII_BESCHREIBUNG_SAMMLUNG_EXTENSION)
            .for_each(|e| e.url = BBMRI_ORGANIZATION_DESCRIPTION_EXTENSION.to_string());

        Ok(vec![ClinicalRecord::Organization(out)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MII_ORGANIZATION_PROFILE;
    use crate::rules::test_support::meta;
    use fhir::{Extension, ExtensionValue, Organization};

    #[test]
    fn retags_as_biobank() {
        let input = ClinicalRecord::Organization(Organization {
            id: Some("biobank-1".into()),
            meta: meta(MII_ORGANIZATION_PROFILE),
            extension: vec![Extension::new(
                MII_BESCHREIBUNG_SAMMLUNG_EXTENSION,
                ExtensionValue::String("Population cohort".into()),
            )],
            ..Organization::default()
        });

        let out = OrganizationRule.map(&input).expect("map organization");
        let [ClinicalRecord::Organization(mapped)] = out.as_slice() else {
            panic!("expected one Organization, got {out:?}");
        };
        assert_eq!(mapped.profiles(), [BBMRI_BIOBANK_PROFILE.to_string()]);
        assert_eq!(mapped.extension[0].url, BBMRI_ORGANIZATION_DESCRIPTION_EXTENSION);
    }
}
