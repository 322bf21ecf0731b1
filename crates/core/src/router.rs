//! Resource router.
//!
//! Holds the explicit rule registry of one direction, keyed by record kind, and dispatches each
//! input record to its rule.
//!
//! Responsibilities:
//! - build the registry for a [`Direction`] once at startup
//! - dispatch records in input order and flatten rule outputs
//! - drop records of unregistered kinds, and rule output without an id, with a warning
//! - count what was dropped so the caller can report it
//!
//! Notes:
//! - the router keeps no state between calls; de-duplication uses a cache the caller passes in

use crate::cache::{Admission, BatchCache};
use crate::concept_map::TranslationTables;
use crate::direction::Direction;
use crate::error::{TransformError, TransformResult};
use crate::id_mapping::IdMapper;
use crate::record::{ClinicalRecord, RecordKind};
use crate::rules::{
    bbmri_to_beacon, bbmri_to_mii, copy, mii_to_bbmri, RuleContext, TransformRule,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use transfair_uuid::IdSource;

/// Output of one router call plus the counts needed for run summaries.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransformReport {
    pub records: Vec<ClinicalRecord>,
    /// Records handed in.
    pub input: usize,
    /// Records handed out.
    pub output: usize,
    /// Records dropped because no rule is registered for their kind.
    pub unmapped: usize,
    /// Records whose rule produced no output.
    pub empty: usize,
    /// Output records dropped because the batch cache already held them, or superseded by a later
    /// record with the same address.
    pub duplicates: usize,
    /// Output records dropped because they have no id.
    pub unaddressable: usize,
}

pub struct Router {
    direction: Direction,
    rules: BTreeMap<RecordKind, Arc<dyn TransformRule>>,
}

impl Router {
    /// Build the registry for `direction`.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::InvalidConfig`] if the direction needs a table `tables` lacks.
    pub fn for_direction(
        direction: Direction,
        tables: TranslationTables,
        id_mapper: Arc<dyn IdMapper>,
        id_source: Arc<dyn IdSource>,
    ) -> TransformResult<Self> {
        let ctx = RuleContext::new(tables, id_mapper, id_source);
        let rules = match direction {
            Direction::Bbmri2Mii => bbmri_to_mii::rules(&ctx)?,
            Direction::Mii2Bbmri => mii_to_bbmri::rules(&ctx)?,
            Direction::Bbmri2Beacon => bbmri_to_beacon::rules(&ctx)?,
            Direction::Copy => copy::rules(&ctx)?,
        };
        Self::new(direction, rules)
    }

    /// Build a router from an explicit rule list.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::InvalidConfig`] if two rules accept the same kind.
    pub fn new(direction: Direction, rules: Vec<Arc<dyn TransformRule>>) -> TransformResult<Self> {
        let mut registry = BTreeMap::new();
        for rule in rules {
            let kind = rule.input_kind();
            if let Some(previous) = registry.insert(kind, rule) {
                return Err(TransformError::InvalidConfig(format!(
                    "{direction}: rule '{}' registered twice for {kind}",
                    previous.name()
                )));
            }
        }
        Ok(Self {
            direction,
            rules: registry,
        })
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Kinds with a registered rule, in registry order.
    pub fn registered_kinds(&self) -> Vec<RecordKind> {
        self.rules.keys().copied().collect()
    }

    /// `(kind, rule name)` pairs, in registry order.
    pub fn rule_names(&self) -> Vec<(RecordKind, &'static str)> {
        self.rules
            .iter()
            .map(|(kind, rule)| (*kind, rule.name()))
            .collect()
    }

    /// Transform a batch.
    ///
    /// # Errors
    ///
    /// Returns the first contract violation raised by a rule.
    pub fn transform(&self, records: &[ClinicalRecord]) -> TransformResult<Vec<ClinicalRecord>> {
        Ok(self.dispatch(records, None)?.records)
    }

    /// Transform a batch and count what was dropped.
    ///
    /// # Errors
    ///
    /// Returns the first contract violation raised by a rule.
    pub fn transform_with_report(
        &self,
        records: &[ClinicalRecord],
    ) -> TransformResult<TransformReport> {
        self.dispatch(records, None)
    }

    /// Transform a batch, dropping output records `cache` already holds.
    ///
    /// A record whose address was already output in this call with different content takes the
    /// earlier record's place, so each address appears at most once.
    ///
    /// # Errors
    ///
    /// Returns the first contract violation raised by a rule.
    pub fn transform_deduplicated(
        &self,
        records: &[ClinicalRecord],
        cache: &mut BatchCache,
    ) -> TransformResult<TransformReport> {
        self.dispatch(records, Some(cache))
    }

    fn dispatch(
        &self,
        records: &[ClinicalRecord],
        mut cache: Option<&mut BatchCache>,
    ) -> TransformResult<TransformReport> {
        let mut report = TransformReport {
            input: records.len(),
            ..TransformReport::default()
        };
        let mut positions: HashMap<String, usize> = HashMap::new();

        for record in records {
            let kind = record.kind();
            let Some(rule) = self.rules.get(&kind) else {
                tracing::warn!(
                    direction = %self.direction,
                    kind = %kind,
                    id = record.id().unwrap_or("<none>"),
                    "no rule registered for record kind; record dropped"
                );
                report.unmapped += 1;
                continue;
            };

            let output = rule.map(record)?;
            if output.is_empty() {
                tracing::debug!(
                    rule = rule.name(),
                    id = record.id().unwrap_or("<none>"),
                    "rule produced no output"
                );
                report.empty += 1;
                continue;
            }

            for produced in output {
                let Ok(address) = produced.address() else {
                    tracing::warn!(
                        rule = rule.name(),
                        kind = %produced.kind(),
                        "rule output has no id and cannot be addressed; record dropped"
                    );
                    report.unaddressable += 1;
                    continue;
                };

                if let Some(cache) = cache.as_deref_mut() {
                    match cache.admit(&produced)? {
                        Admission::New => {}
                        Admission::Duplicate => {
                            report.duplicates += 1;
                            continue;
                        }
                        Admission::Replaced => {
                            if let Some(&index) = positions.get(&address) {
                                tracing::debug!(
                                    address = address.as_str(),
                                    "later record replaces earlier one in batch"
                                );
                                report.records[index] = produced;
                                report.duplicates += 1;
                                continue;
                            }
                        }
                    }
                }
                positions.insert(address, report.records.len());
                report.records.push(produced);
            }
        }

        report.output = report.records.len();
        Ok(report)
    }
}
