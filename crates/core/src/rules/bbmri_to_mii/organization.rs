use crate::constants::{
    BBMRI_ORGANIZATION_DESCRIPTION_EXTENSION, MII_BESCHREIBUNG_SAMMLUNG_EXTENSION,
    MII_ORGANIZATION_PROFILE,
};
use crate::error::TransformResult;
use crate::record::{ClinicalRecord, RecordKind};
use crate::rules::profiles::InputProfile;
use crate::rules::{wrong_kind, TransformOutput, TransformRule};
use fhir::{Organization, Resource};

/// BBMRI.de Biobank or Collection to MII biobank Organization.
pub(crate) struct OrganizationRule;

fn organization(input: &Organization) -> Organization {
    let mut out = input.clone();
    out.set_profile(MII_ORGANIZATION_PROFILE);
    for extension in &mut out.extension {
        if extension.url == BBMRI_ORGANIZATION_DESCRIPTION_EXTENSION {
            extension.url = MII_BESCHREIBUNG_SAMMLUNG_EXTENSION.to_string();
        }
    }
    out
}

impl TransformRule for OrganizationRule {
    fn input_kind(&self) -> RecordKind {
        RecordKind::Organization
    }

    fn name(&self) -> &'static str {
        "bbmri2mii/organization"
    }

    fn map(&self, record: &ClinicalRecord) -> TransformResult<TransformOutput> {
        let ClinicalRecord::Organization(input) = record else {
            return Err(wrong_kind(RecordKind::Organization, record));
        };

        let accepted = [InputProfile::BbmriBiobank, InputProfile::BbmriCollection];
        match InputProfile::find(input.profiles(), &accepted) {
            Some(InputProfile::BbmriBiobank | InputProfile::BbmriCollection) => {
                Ok(vec![ClinicalRecord::Organization(organization(input))])
            }
            _ => Ok(Vec::new()),
        }
    }
}
