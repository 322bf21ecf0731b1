//! BBMRI.de biobank records to MII core data set records.
//!
//! Responsibilities:
//! - retag patients, diagnoses, specimens and organizations with their MII profiles
//! - promote BBMRI.de cause-of-death observations to MII Todesursache conditions
//! - split a specimen's sample diagnosis into a separate MII Diagnose condition
//! - pseudonymize patient ids from the `bbmri` into the `mii` id domain

mod condition;
mod observation;
mod organization;
mod patient;
mod specimen;

use super::{PatientIds, RuleContext, TransformRule};
use crate::constants::{BBMRI_ID_DOMAIN, MII_ID_DOMAIN};
use crate::error::TransformResult;
use std::sync::Arc;

/// Rule registry for the `bbmri2mii` direction.
///
/// # Errors
///
/// Returns [`crate::TransformError::InvalidConfig`] if `ctx` carries no sample type table.
pub fn rules(ctx: &RuleContext) -> TransformResult<Vec<Arc<dyn TransformRule>>> {
    let ids = PatientIds::new(ctx.id_mapper.clone(), BBMRI_ID_DOMAIN, MII_ID_DOMAIN);

    Ok(vec![
        Arc::new(patient::PatientRule::new(ids.clone())),
        Arc::new(condition::ConditionRule::new(
            ctx.tables.diagnosis.clone(),
            ids.clone(),
        )),
        Arc::new(observation::CauseOfDeathRule::new(
            ctx.tables.cause_of_death.clone(),
            ids.clone(),
        )),
        Arc::new(specimen::SpecimenRule::new(
            ctx.tables.require_sample_type()?,
            ctx.tables.diagnosis.clone(),
            ctx.id_source.clone(),
            ids,
        )),
        Arc::new(organization::OrganizationRule),
    ])
}
