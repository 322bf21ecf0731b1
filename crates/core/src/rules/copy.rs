//! Identity rules for moving records between two stores of the same schema.

use super::{wrong_kind, RuleContext, TransformOutput, TransformRule};
use crate::error::TransformResult;
use crate::record::{ClinicalRecord, RecordKind};
use std::sync::Arc;

/// Passes records of one kind through unchanged.
pub struct CopyRule {
    kind: RecordKind,
}

impl CopyRule {
    pub fn new(kind: RecordKind) -> Self {
        Self { kind }
    }
}

impl TransformRule for CopyRule {
    fn input_kind(&self) -> RecordKind {
        self.kind
    }

    fn name(&self) -> &'static str {
        "copy"
    }

    fn map(&self, record: &ClinicalRecord) -> TransformResult<TransformOutput> {
        if record.kind() != self.kind {
            return Err(wrong_kind(self.kind, record));
        }
        Ok(vec![record.clone()])
    }
}

/// Rule registry for the `copy` direction: one identity rule per record kind.
pub fn rules(_ctx: &RuleContext) -> TransformResult<Vec<Arc<dyn TransformRule>>> {
    Ok(RecordKind::ALL
        .into_iter()
        .map(|kind| Arc::new(CopyRule::new(kind)) as Arc<dyn TransformRule>)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn copies_unmodelled_resources_verbatim() {
        let input = json!({
            "resourceType": "ImagingStudy",
            "id": "img-1",
            "status": "available",
            "series": [{ "uid": "1.2.3" }]
        });
        let record = ClinicalRecord::from_json(input.clone()).expect("parse record");

        let out = CopyRule::new(RecordKind::Other)
            .map(&record)
            .expect("copy record");
        assert_eq!(out, vec![record]);
        assert_eq!(out[0].to_json().expect("render"), input);
    }

    #[test]
    fn registers_every_kind() {
        let rules = rules(&RuleContext::default()).expect("copy rules");
        let kinds: Vec<RecordKind> = rules.iter().map(|r| r.input_kind()).collect();
        assert_eq!(kinds, RecordKind::ALL.to_vec());
    }
}
