use crate::{
    error::RunError,
    execution::factory::Components,
    report::{PipelineStage, ResourceOutcome, ResourceReport, RunReport},
    watermark::WatermarkReader,
};
use chrono::{DateTime, Utc};
use engine_config::settings::EtlConfig;
use engine_core::metrics::Metrics;
use engine_processing::{
    fetch::PaginatedFetcher,
    normalize::RecordNormalizer,
    stage::{upload::StageUploader, writer::StageWriter},
};
use model::{core::utils::rfc3339, resource::ResourceKind, watermark::Watermark};
use std::{fmt::Display, time::Instant};
use tracing::{Instrument, error, info, info_span};
use uuid::Uuid;

/// Runs the whole extraction with components built from the configuration.
pub async fn run(config: &EtlConfig) -> Result<RunReport, RunError> {
    let components = Components::from_config(config).await?;
    EtlRunner::new(config, components).execute().await
}

/// Sequential run coordinator: watermark first, then each resource through
/// fetch, normalize, write and upload. A failing resource does not stop the
/// others.
pub struct EtlRunner<'a> {
    config: &'a EtlConfig,
    components: Components,
    metrics: Metrics,
    run_id: Uuid,
    started_at: DateTime<Utc>,
}

impl<'a> EtlRunner<'a> {
    pub fn new(config: &'a EtlConfig, components: Components) -> Self {
        EtlRunner {
            config,
            components,
            metrics: Metrics::new(),
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub async fn execute(self) -> Result<RunReport, RunError> {
        let span = info_span!("etl_run", run_id = %self.run_id, started_at = %rfc3339(&self.started_at));
        self.execute_inner().instrument(span).await
    }

    async fn execute_inner(self) -> Result<RunReport, RunError> {
        info!("Starting helpdesk extraction");

        let watermark = WatermarkReader::new(
            self.components.warehouse.clone(),
            self.config.watermark_query.clone(),
        )
        .read()
        .await?;

        let mut resources = Vec::with_capacity(ResourceKind::ALL.len());
        for resource in ResourceKind::ALL {
            resources.push(self.process(resource, watermark).await);
        }

        let report = RunReport {
            run_id: self.run_id,
            started_at: self.started_at,
            finished_at: Utc::now(),
            watermark,
            resources,
            metrics: self.metrics.snapshot(),
        };

        info!(
            succeeded = report.succeeded(),
            failed = report.failed().count(),
            "Extraction finished"
        );
        Ok(report)
    }

    async fn process(&self, resource: ResourceKind, watermark: Option<Watermark>) -> ResourceReport {
        let started = Instant::now();
        let mut report = ResourceReport {
            resource,
            outcome: ResourceOutcome::Failed {
                stage: PipelineStage::Fetch,
                error: String::new(),
            },
            pages: 0,
            records: 0,
            elapsed_ms: 0,
        };

        let fetcher = PaginatedFetcher::new(
            self.components.source.clone(),
            self.config.page_size,
            self.config.retry.clone(),
            self.config.full_extract_since.clone(),
            self.metrics.clone(),
        );

        report.outcome = match fetcher.fetch(resource, watermark).await {
            Err(err) => self.fail(resource, PipelineStage::Fetch, Some(err.page()), err),
            Ok(fetched) => {
                report.pages = fetched.pages;
                report.records = fetched.row_count();
                self.deliver(resource, &fetched.records).await
            }
        };

        report.elapsed_ms = started.elapsed().as_millis();
        if let ResourceOutcome::Delivered { files, rows, bytes } = &report.outcome {
            info!(
                resource = %resource,
                files,
                rows,
                bytes,
                elapsed_ms = report.elapsed_ms as u64,
                "Resource delivered"
            );
        }
        report
    }

    async fn deliver(
        &self,
        resource: ResourceKind,
        records: &[model::records::record::Record],
    ) -> ResourceOutcome {
        let batch = match RecordNormalizer::new(resource).normalize(records) {
            Ok(batch) => batch,
            Err(err) => return self.fail(resource, PipelineStage::Normalize, None, err),
        };

        let files = match StageWriter::new(self.config.stage.max_file_bytes).write(&batch) {
            Ok(files) => files,
            Err(err) => return self.fail(resource, PipelineStage::Write, None, err),
        };

        let uploader = StageUploader::new(self.components.stage.clone(), self.metrics.clone());
        match uploader.upload(resource, &files).await {
            Ok(summary) => {
                self.metrics.increment_rows(batch.row_count() as u64);
                ResourceOutcome::Delivered {
                    files: files.len(),
                    rows: batch.row_count(),
                    bytes: summary.bytes,
                }
            }
            Err(err) => self.fail(resource, PipelineStage::Upload, None, err),
        }
    }

    fn fail(
        &self,
        resource: ResourceKind,
        stage: PipelineStage,
        page: Option<u32>,
        err: impl Display,
    ) -> ResourceOutcome {
        self.metrics.increment_failures(1);
        error!(
            resource = %resource,
            stage = %stage,
            page,
            run_started_at = %rfc3339(&self.started_at),
            error = %err,
            "Resource failed"
        );
        ResourceOutcome::Failed {
            stage,
            error: err.to_string(),
        }
    }
}
