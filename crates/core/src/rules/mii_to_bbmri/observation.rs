use crate::error::TransformResult;
use crate::record::{ClinicalRecord, RecordKind};
use crate::rules::{wrong_kind, TransformOutput, TransformRule};

/// MII observations have no BBMRI.de counterpart; cause of death travels as a Condition.
pub(crate) struct ObservationRule;

impl TransformRule for ObservationRule {
    fn input_kind(&self) -> RecordKind {
        RecordKind::Observation
    }

    fn name(&self) -> &'static str {
        "mii2bbmri/observation"
    }

    fn map(&self, record: &ClinicalRecord) -> TransformResult<TransformOutput> {
        match record {
            ClinicalRecord::Observation(_) => Ok(Vec::new()),
            _ => Err(wrong_kind(RecordKind::Observation, record)),
        }
    }
}
