//! Constants used throughout the TransFAIR core crate.
//!
//! Profile URLs, extension URLs and terminology systems of the BBMRI.de and MII schemas, plus
//! file names and defaults used by the pipeline collaborators. Keeping them here ensures both
//! directions of a mapping agree on the exact strings.

// ============================================================================
// Terminology systems
// ============================================================================

/// SNOMED CT.
pub const SNOMED_SYSTEM: &str = "http://snomed.info/sct";

/// LOINC.
pub const LOINC_SYSTEM: &str = "http://loinc.org";

/// ICD-10 (WHO), used by BBMRI.de.
pub const ICD_10_SYSTEM: &str = "http://hl7.org/fhir/sid/icd-10";

/// ICD-10-GM (German modification), used by MII.
pub const ICD_10_GM_SYSTEM: &str = "http://fhir.de/CodeSystem/bfarm/icd-10-gm";

/// ICD-O-3 topography, used for body sites in both schemas.
pub const ICD_O_3_SYSTEM: &str = "http://terminology.hl7.org/CodeSystem/icd-o-3";

/// BBMRI.de sample material types.
pub const BBMRI_SAMPLE_MATERIAL_TYPE_SYSTEM: &str =
    "https://fhir.bbmri.de/CodeSystem/SampleMaterialType";

/// BBMRI.de storage temperature codes.
pub const BBMRI_STORAGE_TEMPERATURE_SYSTEM: &str =
    "https://fhir.bbmri.de/CodeSystem/StorageTemperature";

// ============================================================================
// BBMRI.de profiles and extensions
// ============================================================================

pub const BBMRI_PATIENT_PROFILE: &str = "https://fhir.bbmri.de/StructureDefinition/Patient";

/// Patient profile URL used by older BBMRI.de stores; accepted on input only.
pub const BBMRI_PATIENT_PROFILE_LEGACY: &str =
    "https://fhir.simplifier.net/bbmri.de/StructureDefinition/Patient";

pub const BBMRI_CONDITION_PROFILE: &str = "https://fhir.bbmri.de/StructureDefinition/Condition";

pub const BBMRI_SPECIMEN_PROFILE: &str = "https://fhir.bbmri.de/StructureDefinition/Specimen";

pub const BBMRI_CAUSE_OF_DEATH_PROFILE: &str =
    "https://fhir.bbmri.de/StructureDefinition/CauseOfDeath";

pub const BBMRI_BIOBANK_PROFILE: &str = "https://fhir.bbmri.de/StructureDefinition/Biobank";

pub const BBMRI_COLLECTION_PROFILE: &str = "https://fhir.bbmri.de/StructureDefinition/Collection";

pub const BBMRI_STORAGE_TEMPERATURE_EXTENSION: &str =
    "https://fhir.bbmri.de/StructureDefinition/StorageTemperature";

pub const BBMRI_SAMPLE_DIAGNOSIS_EXTENSION: &str =
    "https://fhir.bbmri.de/StructureDefinition/SampleDiagnosis";

pub const BBMRI_CUSTODIAN_EXTENSION: &str = "https://fhir.bbmri.de/StructureDefinition/Custodian";

pub const BBMRI_ORGANIZATION_DESCRIPTION_EXTENSION: &str =
    "https://fhir.bbmri.de/StructureDefinition/OrganizationDescription";

/// Sample material type emitted when a SNOMED CT code has no BBMRI.de counterpart.
pub const BBMRI_SAMPLE_TYPE_FALLBACK: &str = "derivative-other";

/// Storage temperature emitted when an MII temperature range matches no BBMRI.de code.
pub const BBMRI_STORAGE_TEMPERATURE_FALLBACK: &str = "temperatureOther";

// ============================================================================
// MII profiles and extensions
// ============================================================================

pub const MII_PATIENT_PROFILE: &str =
    "https://www.medizininformatik-initiative.de/fhir/core/modul-person/StructureDefinition/Patient";

pub const MII_DIAGNOSE_PROFILE: &str =
    "https://www.medizininformatik-initiative.de/fhir/core/modul-diagnose/StructureDefinition/Diagnose";

pub const MII_TODESURSACHE_PROFILE: &str =
    "https://www.medizininformatik-initiative.de/fhir/core/modul-person/StructureDefinition/Todesursache";

pub const MII_SPECIMEN_PROFILE: &str =
    "https://www.medizininformatik-initiative.de/fhir/ext/modul-biobank/StructureDefinition/Specimen";

pub const MII_ORGANIZATION_PROFILE: &str =
    "https://www.medizininformatik-initiative.de/fhir/ext/modul-biobank/StructureDefinition/Organization";

pub const MII_TEMPERATURBEDINGUNGEN_EXTENSION: &str =
    "https://www.medizininformatik-initiative.de/fhir/ext/modul-biobank/StructureDefinition/Temperaturbedingungen";

pub const MII_VERWALTENDE_ORGANISATION_EXTENSION: &str =
    "https://www.medizininformatik-initiative.de/fhir/ext/modul-biobank/StructureDefinition/VerwaltendeOrganisation";

/// Links a specimen to the Condition describing its diagnosis.
pub const MII_DIAGNOSE_EXTENSION: &str =
    "https://www.medizininformatik-initiative.de/fhir/ext/modul-biobank/StructureDefinition/Diagnose";

pub const MII_BESCHREIBUNG_SAMMLUNG_EXTENSION: &str =
    "https://www.medizininformatik-initiative.de/fhir/ext/modul-biobank/StructureDefinition/BeschreibungSammlung";

// ============================================================================
// Fixed codes
// ============================================================================

/// LOINC "Cause of death" observation code used by BBMRI.de.
pub const LOINC_CAUSE_OF_DEATH: &str = "68343-3";

/// LOINC "Cause of death" category used by MII Todesursache.
pub const LOINC_DEATH_CATEGORY: &str = "79378-6";

/// SNOMED CT "Cause of death" category used by MII Todesursache.
pub const SNOMED_DEATH_CATEGORY: &str = "16100001";

// ============================================================================
// Identifier domains
// ============================================================================

/// Identifier domain of BBMRI.de stores.
pub const BBMRI_ID_DOMAIN: &str = "bbmri";

/// Identifier domain of MII stores.
pub const MII_ID_DOMAIN: &str = "mii";

// ============================================================================
// Pipeline defaults
// ============================================================================

/// Default number of write attempts before a batch is given up.
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 10;

/// Default fixed delay between write attempts, in milliseconds.
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 10_000;

/// File name prefix for bundles written to disk (`bundle_<n>.json`).
pub const BUNDLE_FILE_PREFIX: &str = "bundle_";

/// Default output directory for written bundles.
pub const DEFAULT_OUTPUT_DIR: &str = "output";
