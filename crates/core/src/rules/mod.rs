//! Per-type transform rules.
//!
//! A rule handles one record kind for one mapping direction. Every rule follows the same steps:
//! 1. **Profile gate**: classify the record's profile tags into a rule-local enum; records whose
//!    profile the rule does not handle produce no output.
//! 2. **Shape rewrite**: copy what transfers, drop what the target schema has no place for, and
//!    replace the profile tags with the target schema's canonical tag.
//! 3. **Code translation**: look codes up in the direction's [`TranslationTables`] and apply the
//!    rule's documented fallback when a code is missing.
//! 4. **Type promotion/demotion**: emit a record of another kind, or more than one record.
//! 5. **Precondition check**: refuse to emit a record when a required field is absent.
//!
//! Rules never fail on missing optional data. They return [`TransformError::WrongKind`] only when
//! handed a record of a kind they were not registered for.

pub mod bbmri_to_beacon;
pub mod bbmri_to_mii;
pub mod copy;
pub mod mii_to_bbmri;
pub mod profiles;
mod temperature;

use crate::concept_map::{ConceptMap, TranslationTables};
use crate::constants::ICD_O_3_SYSTEM;
use crate::error::{TransformError, TransformResult};
use crate::id_mapping::{IdMapper, IdMappingError, IdentityMapper};
use crate::record::{ClinicalRecord, RecordKind};
use fhir::{CodeableConcept, Coding, Reference};
use std::fmt;
use std::sync::Arc;
use transfair_uuid::{IdSource, RandomIds};

/// Output of one rule invocation: zero or more records.
pub type TransformOutput = Vec<ClinicalRecord>;

/// A transformation of one record kind under one mapping direction.
pub trait TransformRule: Send + Sync {
    /// The record kind this rule accepts.
    fn input_kind(&self) -> RecordKind;

    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Transform one record.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::WrongKind`] if `record` is not of [`TransformRule::input_kind`].
    fn map(&self, record: &ClinicalRecord) -> TransformResult<TransformOutput>;
}

/// Shared, read-only collaborators handed to every rule of a direction.
#[derive(Clone)]
pub struct RuleContext {
    pub tables: TranslationTables,
    pub id_mapper: Arc<dyn IdMapper>,
    pub id_source: Arc<dyn IdSource>,
}

impl RuleContext {
    pub fn new(
        tables: TranslationTables,
        id_mapper: Arc<dyn IdMapper>,
        id_source: Arc<dyn IdSource>,
    ) -> Self {
        Self {
            tables,
            id_mapper,
            id_source,
        }
    }
}

impl Default for RuleContext {
    fn default() -> Self {
        Self::new(
            TranslationTables::default(),
            Arc::new(IdentityMapper),
            Arc::new(RandomIds),
        )
    }
}

/// Contract-violation error for a rule expecting `expected`.
pub(crate) fn wrong_kind(expected: RecordKind, record: &ClinicalRecord) -> TransformError {
    TransformError::WrongKind {
        expected,
        actual: record.kind(),
    }
}

/// Empty output for a record the target schema cannot represent.
pub(crate) fn unrepresentable(
    rule: &'static str,
    id: Option<&str>,
    reason: impl fmt::Display,
) -> TransformOutput {
    tracing::warn!(rule, id = id.unwrap_or("<none>"), "record dropped: {reason}");
    Vec::new()
}

/// Translate `code` through `table`. Without a table codes pass through unchanged.
pub(crate) fn recode<'a>(table: Option<&'a ConceptMap>, code: &'a str) -> Option<&'a str> {
    match table {
        Some(table) => table.lookup(code),
        None => Some(code),
    }
}

/// Translates patient ids and `Patient/<id>` references between two id domains.
#[derive(Clone)]
pub(crate) struct PatientIds {
    mapper: Arc<dyn IdMapper>,
    source_domain: &'static str,
    target_domain: &'static str,
}

impl PatientIds {
    pub(crate) fn new(
        mapper: Arc<dyn IdMapper>,
        source_domain: &'static str,
        target_domain: &'static str,
    ) -> Self {
        Self {
            mapper,
            source_domain,
            target_domain,
        }
    }

    pub(crate) fn map_id(&self, id: &str) -> Result<String, IdMappingError> {
        self.mapper
            .map_id(id, self.source_domain, self.target_domain)
    }

    /// Rewrite the id part of a patient reference; other references are returned unchanged.
    pub(crate) fn map_subject(
        &self,
        subject: Option<&Reference>,
    ) -> Result<Option<Reference>, IdMappingError> {
        let Some(subject) = subject else {
            return Ok(None);
        };
        let Some(id) = subject.id_for("Patient") else {
            return Ok(Some(subject.clone()));
        };

        let mut mapped = subject.clone();
        mapped.reference = Some(format!("Patient/{}", self.map_id(id)?));
        Ok(Some(mapped))
    }
}

/// Re-code a body site in ICD-O-3, keeping the first code present.
pub(crate) fn body_site_in_icd_o_3(body_site: &CodeableConcept) -> Option<CodeableConcept> {
    let code = body_site.first_code()?;
    Some(CodeableConcept::from_coding(Coding::new(ICD_O_3_SYSTEM, code)))
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Record builders shared by rule tests.

    use super::*;
    use crate::concept_map::ConceptMap;
    use fhir::{Extension, Meta, Specimen, SpecimenCollection};
    use transfair_uuid::SequentialIds;

    pub fn meta(profile: &str) -> Option<Meta> {
        Some(Meta {
            profile: vec![profile.to_string()],
            ..Meta::default()
        })
    }

    pub fn specimen(profile: &str, date: Option<&str>, extension: Vec<Extension>) -> Specimen {
        Specimen {
            id: Some("s-1".into()),
            meta: meta(profile),
            subject: Some(Reference::to("Patient", "p-1")),
            collection: Some(SpecimenCollection {
                collected_date_time: date.map(str::to_string),
                ..SpecimenCollection::default()
            }),
            extension,
            ..Specimen::default()
        }
    }

    pub fn table(pairs: &[(&str, &str)]) -> Arc<ConceptMap> {
        Arc::new(
            ConceptMap::from_pairs("test", None, None, pairs.iter().copied())
                .expect("build test table"),
        )
    }

    pub fn context(tables: TranslationTables) -> RuleContext {
        RuleContext::new(
            tables,
            Arc::new(IdentityMapper),
            Arc::new(SequentialIds::new("gen").expect("valid prefix")),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id_mapping::CsvIdMapper;

    #[test]
    fn patient_ids_rewrite_only_patient_references() {
        let mapper = CsvIdMapper::from_reader("bbmri,mii\nb-1,m-1\n".as_bytes()).expect("table");
        let ids = PatientIds::new(Arc::new(mapper), "bbmri", "mii");

        let patient = Reference::to("Patient", "b-1");
        let mapped = ids.map_subject(Some(&patient)).expect("mapped").expect("present");
        assert_eq!(mapped.reference.as_deref(), Some("Patient/m-1"));

        let group = Reference::to("Group", "g-1");
        let kept = ids.map_subject(Some(&group)).expect("kept").expect("present");
        assert_eq!(kept, group);

        assert!(ids.map_subject(None).expect("absent").is_none());
        assert!(ids.map_subject(Some(&Reference::to("Patient", "b-9"))).is_err());
    }

    #[test]
    fn body_site_uses_first_code() {
        let site = CodeableConcept {
            coding: vec![Coding::new("urn:local", "C50.9"), Coding::new("urn:other", "X")],
            ..CodeableConcept::default()
        };
        let recoded = body_site_in_icd_o_3(&site).expect("recoded");
        assert!(recoded.has_coding(ICD_O_3_SYSTEM, "C50.9"));
        assert_eq!(recoded.coding.len(), 1);

        assert!(body_site_in_icd_o_3(&CodeableConcept::default()).is_none());
    }

    #[test]
    fn recode_passes_through_without_table() {
        assert_eq!(recode(None, "C50.9"), Some("C50.9"));

        let table = test_support::table(&[("C50.9", "C50.90")]);
        assert_eq!(recode(Some(table.as_ref()), "C50.9"), Some("C50.90"));
        assert_eq!(recode(Some(table.as_ref()), "C61"), None);
    }
}
