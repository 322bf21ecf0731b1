use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use transfair_core::constants::{DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_BACKOFF_MS};
use transfair_core::pipeline::{
    BeaconFileWriter, BundleDirReader, BundleWriter, FileBundleWriter, RetryingWriter,
    TransferJob,
};
use transfair_core::{Direction, RetryPolicy, TablePaths, TransferConfig};
use transfair_uuid::RandomIds;

/// Batch transfer of FHIR bundles between BBMRI.de, MII and Beacon representations.
///
/// Every flag falls back to its environment variable, and a `.env` file in the working
/// directory is read first.
#[derive(Parser, Debug)]
#[command(name = "transfair-run")]
struct Args {
    /// Mapping direction: bbmri2mii, mii2bbmri, bbmri2beacon or copy
    #[arg(long, env = "TRANSFAIR_DIRECTION")]
    direction: Direction,

    /// Directory of input FHIR bundles (*.json)
    #[arg(long, env = "TRANSFAIR_INPUT_DIR")]
    input_dir: PathBuf,

    /// Directory for output bundles or catalog files
    #[arg(long, env = "TRANSFAIR_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Sample type concept map (required for bbmri2mii and mii2bbmri)
    #[arg(long, env = "TRANSFAIR_SAMPLE_TYPE_MAP")]
    sample_type_map: Option<PathBuf>,

    /// Diagnosis ICD-10 concept map
    #[arg(long, env = "TRANSFAIR_DIAGNOSIS_MAP")]
    diagnosis_map: Option<PathBuf>,

    /// Cause-of-death ICD-10 concept map
    #[arg(long, env = "TRANSFAIR_CAUSE_OF_DEATH_MAP")]
    cause_of_death_map: Option<PathBuf>,

    /// CSV file mapping patient ids between the bbmri and mii domains
    #[arg(long, env = "TRANSFAIR_ID_MAPPING_CSV")]
    id_mapping_csv: Option<PathBuf>,

    /// Write attempts per bundle
    #[arg(long, env = "TRANSFAIR_RETRY_ATTEMPTS", default_value_t = DEFAULT_RETRY_ATTEMPTS)]
    retry_attempts: u32,

    /// Pause between write attempts, in milliseconds
    #[arg(long, env = "TRANSFAIR_RETRY_BACKOFF_MS", default_value_t = DEFAULT_RETRY_BACKOFF_MS)]
    retry_backoff_ms: u64,
}

/// Main entry point for the transfer runner
///
/// Resolves configuration, loads translation tables, then drains the input directory one bundle
/// at a time into the output directory.
///
/// # Returns
/// * `Ok(())` - If the run completed, even when some batches failed to write
/// * `Err(anyhow::Error)` - On configuration errors, unreadable input or rule contract violations
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("transfair_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let retry = RetryPolicy::new(
        args.retry_attempts,
        Duration::from_millis(args.retry_backoff_ms),
    )?;
    let config = TransferConfig::new(
        args.direction,
        args.input_dir,
        args.output_dir,
        TablePaths {
            sample_type: args.sample_type_map,
            diagnosis: args.diagnosis_map,
            cause_of_death: args.cause_of_death_map,
        },
        args.id_mapping_csv,
        retry,
    )?;

    tracing::info!(
        "++ Starting {} transfer from {} to {}",
        config.direction(),
        config.input_dir().display(),
        config.output_dir().display()
    );

    let job = TransferJob::from_config(&config, Arc::new(RandomIds))?;
    let mut reader = BundleDirReader::open(config.input_dir())?;

    let mut writer: Box<dyn BundleWriter> = if config.direction().target_is_catalog() {
        Box::new(RetryingWriter::new(
            BeaconFileWriter::new(config.output_dir())?,
            config.retry(),
        ))
    } else {
        Box::new(RetryingWriter::new(
            FileBundleWriter::new(config.output_dir())?,
            config.retry(),
        ))
    };

    let summary = job.run(&mut reader, &mut writer)?;
    if summary.failed_batches > 0 {
        tracing::warn!(
            failed_batches = summary.failed_batches,
            "some batches could not be written"
        );
    }

    Ok(())
}
