//! Recognised input profiles.
//!
//! Rules never inspect raw profile URLs. They ask [`InputProfile::find`] which of the profiles
//! they handle a record declares, then match on the result with an explicit arm for "none".

use crate::constants::{
    BBMRI_BIOBANK_PROFILE, BBMRI_CAUSE_OF_DEATH_PROFILE, BBMRI_COLLECTION_PROFILE,
    BBMRI_CONDITION_PROFILE, BBMRI_PATIENT_PROFILE, BBMRI_PATIENT_PROFILE_LEGACY,
    BBMRI_SPECIMEN_PROFILE, MII_DIAGNOSE_PROFILE, MII_ORGANIZATION_PROFILE, MII_PATIENT_PROFILE,
    MII_SPECIMEN_PROFILE, MII_TODESURSACHE_PROFILE,
};

/// A profile some rule knows how to transform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputProfile {
    BbmriPatient,
    BbmriCondition,
    BbmriCauseOfDeath,
    BbmriSpecimen,
    BbmriBiobank,
    BbmriCollection,
    MiiPatient,
    MiiDiagnose,
    MiiTodesursache,
    MiiSpecimen,
    MiiOrganization,
}

impl InputProfile {
    /// Classify a single profile URL.
    pub fn from_url(url: &str) -> Option<Self> {
        let profile = match url {
            BBMRI_PATIENT_PROFILE | BBMRI_PATIENT_PROFILE_LEGACY => InputProfile::BbmriPatient,
            BBMRI_CONDITION_PROFILE => InputProfile::BbmriCondition,
            BBMRI_CAUSE_OF_DEATH_PROFILE => InputProfile::BbmriCauseOfDeath,
            BBMRI_SPECIMEN_PROFILE => InputProfile::BbmriSpecimen,
            BBMRI_BIOBANK_PROFILE => InputProfile::BbmriBiobank,
            BBMRI_COLLECTION_PROFILE => InputProfile::BbmriCollection,
            MII_PATIENT_PROFILE => InputProfile::MiiPatient,
            MII_DIAGNOSE_PROFILE => InputProfile::MiiDiagnose,
            MII_TODESURSACHE_PROFILE => InputProfile::MiiTodesursache,
            MII_SPECIMEN_PROFILE => InputProfile::MiiSpecimen,
            MII_ORGANIZATION_PROFILE => InputProfile::MiiOrganization,
            _ => return None,
        };
        Some(profile)
    }

    /// The first entry of `accepted` (in priority order) that `profiles` declares.
    pub fn find(profiles: &[String], accepted: &[InputProfile]) -> Option<Self> {
        let declared: Vec<InputProfile> = profiles
            .iter()
            .filter_map(|p| InputProfile::from_url(p))
            .collect();
        accepted.iter().copied().find(|a| declared.contains(a))
    }
}
