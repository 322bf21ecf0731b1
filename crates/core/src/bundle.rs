//! Bundle assembly.
//!
//! A batch's output is packaged as one bundle with a fresh id. Each entry is addressed by its
//! record's `<ResourceType>/<id>` token, used both as `fullUrl` and as the `PUT` request URL,
//! so writing the same bundle twice upserts instead of duplicating.

use crate::error::{TransformError, TransformResult};
use crate::record::ClinicalRecord;
use chrono::{SecondsFormat, Utc};
use fhir::bundle::TRANSACTION;
use fhir::{BundleEntry, BundleRequest};
use serde_json::Value;
use std::sync::Arc;
use transfair_uuid::IdSource;

/// One batch of output records with its bundle id.
#[derive(Clone, Debug, PartialEq)]
pub struct Bundle {
    id: String,
    timestamp: Option<String>,
    records: Vec<ClinicalRecord>,
}

impl Bundle {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn timestamp(&self) -> Option<&str> {
        self.timestamp.as_deref()
    }

    pub fn records(&self) -> &[ClinicalRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The FHIR `transaction` bundle carrying every record as a `PUT` entry.
    pub fn to_fhir(&self) -> TransformResult<fhir::Bundle> {
        let mut bundle = fhir::Bundle::new(TRANSACTION);
        bundle.id = Some(self.id.clone());
        bundle.timestamp = self.timestamp.clone();

        for record in &self.records {
            let address = record.address()?;
            bundle.entry.push(BundleEntry {
                full_url: Some(address.clone()),
                resource: Some(record.to_json()?),
                request: Some(BundleRequest::put(address)),
                ..BundleEntry::default()
            });
        }
        Ok(bundle)
    }

    /// JSON rendering of [`Bundle::to_fhir`].
    pub fn to_json(&self) -> TransformResult<Value> {
        serde_json::to_value(self.to_fhir()?).map_err(TransformError::Serialization)
    }
}

/// Step-by-step bundle construction.
#[derive(Debug, Default)]
pub struct BundleBuilder {
    id: Option<String>,
    timestamp: Option<String>,
    records: Vec<ClinicalRecord>,
}

impl BundleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    pub fn record(mut self, record: ClinicalRecord) -> Self {
        self.records.push(record);
        self
    }

    pub fn records(mut self, records: impl IntoIterator<Item = ClinicalRecord>) -> Self {
        self.records.extend(records);
        self
    }

    /// Finalize the bundle.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [`TransformError::MissingBundleId`] if no id was set,
    /// - [`TransformError::MissingRecordId`] if a record cannot be addressed.
    pub fn build(self) -> TransformResult<Bundle> {
        let id = self
            .id
            .filter(|id| !id.is_empty())
            .ok_or(TransformError::MissingBundleId)?;

        for record in &self.records {
            record.address()?;
        }

        Ok(Bundle {
            id,
            timestamp: self.timestamp,
            records: self.records,
        })
    }
}

/// Packages a batch's output into a bundle with a fresh id.
#[derive(Clone)]
pub struct BundleAssembler {
    id_source: Arc<dyn IdSource>,
}

impl BundleAssembler {
    pub fn new(id_source: Arc<dyn IdSource>) -> Self {
        Self { id_source }
    }

    /// Assemble `records` into a new bundle.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::MissingRecordId`] if a record cannot be addressed.
    pub fn assemble(&self, records: Vec<ClinicalRecord>) -> TransformResult<Bundle> {
        BundleBuilder::new()
            .id(self.id_source.next_id().into_string())
            .timestamp(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true))
            .records(records)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordKind;
    use serde_json::json;
    use transfair_uuid::SequentialIds;

    fn record(value: Value) -> ClinicalRecord {
        ClinicalRecord::from_json(value).expect("parse record")
    }

    #[test]
    fn builder_without_id_fails() {
        let err = BundleBuilder::new()
            .record(record(json!({ "resourceType": "Patient", "id": "p-1" })))
            .build()
            .expect_err("should require id");
        assert!(matches!(err, TransformError::MissingBundleId));
    }

    #[test]
    fn builder_rejects_records_without_id() {
        let err = BundleBuilder::new()
            .id("b-1")
            .record(record(json!({ "resourceType": "Specimen" })))
            .build()
            .expect_err("should require record id");
        match err {
            TransformError::MissingRecordId { kind } => assert_eq!(kind, RecordKind::Specimen),
            other => panic!("expected MissingRecordId, got {other:?}"),
        }
    }

    #[test]
    fn entries_are_put_by_address() {
        let assembler = BundleAssembler::new(Arc::new(SequentialIds::new("bundle").expect("ids")));
        let bundle = assembler
            .assemble(vec![
                record(json!({ "resourceType": "Patient", "id": "p-1" })),
                record(json!({ "resourceType": "ImagingStudy", "id": "img-1" })),
            ])
            .expect("assemble");

        assert_eq!(bundle.id(), "bundle-1");
        assert!(bundle.timestamp().is_some());

        let value = bundle.to_json().expect("render");
        assert_eq!(value["resourceType"], json!("Bundle"));
        assert_eq!(value["type"], json!("transaction"));
        assert_eq!(value["id"], json!("bundle-1"));
        assert_eq!(value["entry"][0]["fullUrl"], json!("Patient/p-1"));
        assert_eq!(
            value["entry"][1]["request"],
            json!({ "method": "PUT", "url": "ImagingStudy/img-1" })
        );
        assert_eq!(value["entry"][1]["resource"]["resourceType"], json!("ImagingStudy"));
    }

    #[test]
    fn each_assembly_gets_a_fresh_id() {
        let assembler = BundleAssembler::new(Arc::new(SequentialIds::new("bundle").expect("ids")));
        let first = assembler.assemble(Vec::new()).expect("assemble");
        let second = assembler.assemble(Vec::new()).expect("assemble");
        assert_ne!(first.id(), second.id());
    }
}
