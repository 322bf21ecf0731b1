use super::reader::RecordReader;
use super::writer::BundleWriter;
use super::PipelineResult;
use crate::bundle::BundleAssembler;
use crate::cache::BatchCache;
use crate::concept_map::TranslationTables;
use crate::config::TransferConfig;
use crate::id_mapping::{CsvIdMapper, IdMapper, IdentityMapper};
use crate::router::{Router, TransformReport};
use crate::TransformError;
use std::sync::Arc;
use transfair_uuid::IdSource;

/// Counts accumulated over one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub batches: usize,
    pub records_in: usize,
    pub records_out: usize,
    pub unmapped: usize,
    pub empty: usize,
    pub duplicates: usize,
    pub unaddressable: usize,
    pub bundles_written: usize,
    pub failed_batches: usize,
}

impl RunSummary {
    fn absorb(&mut self, report: &TransformReport) {
        self.records_in += report.input;
        self.records_out += report.output;
        self.unmapped += report.unmapped;
        self.empty += report.empty;
        self.duplicates += report.duplicates;
        self.unaddressable += report.unaddressable;
    }
}

/// One transfer: a router for the configured direction plus the bundle assembler.
pub struct TransferJob {
    router: Router,
    assembler: BundleAssembler,
}

impl TransferJob {
    pub fn new(router: Router, assembler: BundleAssembler) -> Self {
        Self { router, assembler }
    }

    /// Load tables and id mapping named in `config` and build the router.
    ///
    /// `id_source` supplies both bundle ids and the ids of records synthesized by rules.
    ///
    /// # Errors
    ///
    /// Returns a [`TransformError`] (wrapped in [`super::PipelineError::Transform`]) if a table or
    /// the id mapping file cannot be loaded, or the direction lacks a table it requires.
    pub fn from_config(
        config: &TransferConfig,
        id_source: Arc<dyn IdSource>,
    ) -> PipelineResult<Self> {
        let tables = TranslationTables::load(config)?;

        let id_mapper: Arc<dyn IdMapper> = match config.id_mapping_csv() {
            Some(path) => {
                let mapper = CsvIdMapper::load(path).map_err(TransformError::from)?;
                tracing::info!(
                    file = %path.display(),
                    entities = mapper.len(),
                    "loaded id mapping"
                );
                Arc::new(mapper)
            }
            None => Arc::new(IdentityMapper),
        };

        let router =
            Router::for_direction(config.direction(), tables, id_mapper, id_source.clone())?;
        tracing::info!(
            direction = %config.direction(),
            rules = router.registered_kinds().len(),
            "router ready"
        );

        Ok(Self::new(router, BundleAssembler::new(id_source)))
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Drain `reader`, writing one bundle per non-empty batch output.
    ///
    /// A batch whose bundle cannot be written is logged and counted, and the run moves on.
    ///
    /// # Errors
    ///
    /// Returns the reader's errors and any contract violation raised by a rule.
    pub fn run<R, W>(&self, reader: &mut R, writer: &mut W) -> PipelineResult<RunSummary>
    where
        R: RecordReader + ?Sized,
        W: BundleWriter + ?Sized,
    {
        let mut summary = RunSummary::default();

        while let Some(batch) = reader.next_batch()? {
            if batch.is_empty() {
                break;
            }
            summary.batches += 1;

            let mut cache = BatchCache::new();
            let report = self.router.transform_deduplicated(&batch, &mut cache)?;
            summary.absorb(&report);

            if report.records.is_empty() {
                tracing::info!(
                    batch = summary.batches,
                    records = report.input,
                    "batch produced no output"
                );
                continue;
            }

            let bundle = self.assembler.assemble(report.records)?;
            match writer.write(&bundle) {
                Ok(()) => {
                    summary.bundles_written += 1;
                    tracing::info!(
                        batch = summary.batches,
                        bundle = bundle.id(),
                        records = bundle.len(),
                        "batch written"
                    );
                }
                Err(err) => {
                    summary.failed_batches += 1;
                    tracing::error!(
                        batch = summary.batches,
                        bundle = bundle.id(),
                        error = %err,
                        "failed to write batch"
                    );
                }
            }
        }

        tracing::info!(
            batches = summary.batches,
            records_in = summary.records_in,
            records_out = summary.records_out,
            unmapped = summary.unmapped,
            empty = summary.empty,
            duplicates = summary.duplicates,
            unaddressable = summary.unaddressable,
            bundles_written = summary.bundles_written,
            failed_batches = summary.failed_batches,
            "run finished"
        );
        Ok(summary)
    }
}
