//! Per-batch record cache.
//!
//! Several inputs can map to the same output record (two specimens of one patient both carrying
//! the patient reference, or a copy run seeing the same resource twice). The cache lets the
//! caller keep one record per address token within a batch.
//!
//! Notes:
//! - the caller owns the cache and decides its scope; the job runner creates one per batch
//! - keys are the SHA-256 of the address token, hex encoded

use crate::error::TransformResult;
use crate::record::ClinicalRecord;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Outcome of offering a record to the cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Admission {
    /// First record with this address.
    New,
    /// An identical record was already admitted.
    Duplicate,
    /// A different record with this address was admitted before; it has been replaced.
    Replaced,
}

#[derive(Debug, Default)]
pub struct BatchCache {
    records: HashMap<String, ClinicalRecord>,
}

impl BatchCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer `record` to the cache.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TransformError::MissingRecordId`] if the record has no id.
    pub fn admit(&mut self, record: &ClinicalRecord) -> TransformResult<Admission> {
        let key = cache_key(&record.address()?);

        let admission = match self.records.get(&key) {
            None => Admission::New,
            Some(existing) if existing == record => return Ok(Admission::Duplicate),
            Some(_) => Admission::Replaced,
        };
        self.records.insert(key, record.clone());
        Ok(admission)
    }

    /// The record admitted under `address`, if any.
    pub fn get(&self, address: &str) -> Option<&ClinicalRecord> {
        self.records.get(&cache_key(address))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn cache_key(address: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(address.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fhir::Patient;

    fn patient(id: &str, gender: &str) -> ClinicalRecord {
        ClinicalRecord::Patient(Patient {
            id: Some(id.into()),
            gender: Some(gender.into()),
            ..Patient::default()
        })
    }

    #[test]
    fn admits_by_address() {
        let mut cache = BatchCache::new();

        assert_eq!(cache.admit(&patient("p-1", "female")).expect("admit"), Admission::New);
        assert_eq!(
            cache.admit(&patient("p-1", "female")).expect("admit"),
            Admission::Duplicate
        );
        assert_eq!(
            cache.admit(&patient("p-1", "male")).expect("admit"),
            Admission::Replaced
        );
        assert_eq!(cache.admit(&patient("p-2", "male")).expect("admit"), Admission::New);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("Patient/p-1"), Some(&patient("p-1", "male")));
    }

    #[test]
    fn records_without_id_are_rejected() {
        let mut cache = BatchCache::new();
        let record = ClinicalRecord::Patient(Patient::default());
        assert!(cache.admit(&record).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn key_is_hex_sha256() {
        let key = cache_key("Patient/p-1");
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
