//! # TransFAIR Core
//!
//! Resource transformation engine for moving biobank and clinical records between FHIR
//! profile families (BBMRI.de and the Medical Informatics Initiative) and into a Beacon v2
//! catalog.
//!
//! This crate contains:
//! - the record model the engine dispatches on ([`ClinicalRecord`], [`RecordKind`])
//! - the per-direction rule registries and the [`Router`] that applies them
//! - translation tables ([`ConceptMap`]) and the identifier mapping collaborator ([`IdMapper`])
//! - bundle assembly ([`BundleAssembler`]) and the per-batch [`BatchCache`]
//! - the batch [`pipeline`]: reader, writers, retry wrapper and job runner
//!
//! **No process concerns**: environment variables, `.env` files and logging setup belong in the
//! binaries.

pub mod bundle;
pub mod cache;
pub mod concept_map;
pub mod config;
pub mod constants;
pub mod direction;
pub mod error;
pub mod id_mapping;
pub mod pipeline;
pub mod record;
pub mod router;
pub mod rules;

pub use bundle::{Bundle, BundleAssembler, BundleBuilder};
pub use cache::{Admission, BatchCache};
pub use concept_map::{ConceptMap, ConceptMapError, TranslationTables};
pub use config::{RetryPolicy, TablePaths, TransferConfig};
pub use direction::Direction;
pub use error::{TransformError, TransformResult};
pub use id_mapping::{CsvIdMapper, IdMapper, IdMappingError, IdentityMapper};
pub use record::{ClinicalRecord, RecordKind};
pub use router::{Router, TransformReport};
pub use rules::{RuleContext, TransformRule};
