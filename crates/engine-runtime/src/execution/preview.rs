use crate::{
    error::RunError,
    execution::factory::{connect_warehouse, helpdesk_source},
    watermark::WatermarkReader,
};
use engine_config::settings::EtlConfig;
use engine_core::metrics::Metrics;
use engine_processing::{fetch::PaginatedFetcher, normalize::RecordNormalizer, stage::writer::StageWriter};
use model::resource::ResourceKind;
use tracing::info;

/// Fetches and normalizes one resource and renders it as a single CSV
/// document without touching the stage. The watermark is only consulted when
/// `incremental` is set.
pub async fn preview(
    config: &EtlConfig,
    resource: ResourceKind,
    incremental: bool,
) -> Result<Vec<u8>, RunError> {
    let watermark = if incremental && resource.is_incremental() {
        let warehouse = connect_warehouse(&config.warehouse).await?;
        WatermarkReader::new(warehouse, config.watermark_query.clone())
            .read()
            .await?
    } else {
        None
    };

    let fetcher = PaginatedFetcher::new(
        helpdesk_source(config)?,
        config.page_size,
        config.retry.clone(),
        config.full_extract_since.clone(),
        Metrics::new(),
    );
    let fetched = fetcher.fetch(resource, watermark).await?;
    let batch = RecordNormalizer::new(resource).normalize(&fetched.records)?;

    let csv: Vec<u8> = StageWriter::new(u64::MAX)
        .write(&batch)?
        .into_iter()
        .flat_map(|file| file.bytes.to_vec())
        .collect();

    info!(
        resource = %resource,
        rows = batch.row_count(),
        columns = batch.columns.len(),
        "Rendered preview"
    );
    Ok(csv)
}
