//! BBMRI.de biobank records to Beacon v2 catalog records.
//!
//! Only patients and specimens reach the catalog: a patient becomes an individual and a specimen
//! a biosample. Every other record kind is left unregistered, so the router drops it.

mod biosample;
mod individual;
mod terms;

use super::{RuleContext, TransformRule};
use crate::error::TransformResult;
use std::sync::Arc;

/// Rule registry for the `bbmri2beacon` direction.
pub fn rules(_ctx: &RuleContext) -> TransformResult<Vec<Arc<dyn TransformRule>>> {
    Ok(vec![
        Arc::new(individual::IndividualRule),
        Arc::new(biosample::BiosampleRule),
    ])
}
