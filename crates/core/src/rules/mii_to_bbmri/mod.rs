//! MII core data set records to BBMRI.de biobank records.
//!
//! The reverse of [`super::bbmri_to_mii`], with two asymmetries:
//! - sample types without a BBMRI.de counterpart fall back to `derivative-other` instead of
//!   dropping the specimen
//! - a specimen's MII Diagnose link is dropped, since resolving it would need the linked record

mod condition;
mod observation;
mod organization;
mod patient;
mod specimen;

use super::{PatientIds, RuleContext, TransformRule};
use crate::constants::{BBMRI_ID_DOMAIN, MII_ID_DOMAIN};
use crate::error::TransformResult;
use std::sync::Arc;

/// Rule registry for the `mii2bbmri` direction.
///
/// # Errors
///
/// Returns [`crate::TransformError::InvalidConfig`] if `ctx` carries no sample type table.
pub fn rules(ctx: &RuleContext) -> TransformResult<Vec<Arc<dyn TransformRule>>> {
    let ids = PatientIds::new(ctx.id_mapper.clone(), MII_ID_DOMAIN, BBMRI_ID_DOMAIN);

    Ok(vec![
        Arc::new(patient::PatientRule::new(ids.clone())),
        Arc::new(condition::ConditionRule::new(
            ctx.tables.diagnosis.clone(),
            ctx.tables.cause_of_death.clone(),
            ids.clone(),
        )),
        Arc::new(observation::ObservationRule),
        Arc::new(specimen::SpecimenRule::new(
            ctx.tables.require_sample_type()?,
            ids,
        )),
        Arc::new(organization::OrganizationRule),
    ])
}
