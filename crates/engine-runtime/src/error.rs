use connectors::{
    api::error::ApiError, storage::error::StageError, warehouse::base::error::WarehouseError,
};
use engine_config::error::ConfigError;
use engine_processing::error::{FetchError, NormalizeError, StageWriteError};
use model::watermark::InvalidWatermark;
use thiserror::Error;

/// Errors that abort a run. Failures of a single resource are not run errors;
/// they are recorded in the report.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to read the watermark: {0}")]
    Watermark(#[source] WarehouseError),

    #[error("Warehouse returned an unusable watermark: {0}")]
    InvalidWatermark(#[from] InvalidWatermark),

    #[error("Failed to create helpdesk client: {0}")]
    Client(#[from] ApiError),

    #[error("Failed to open stage: {0}")]
    Stage(#[from] StageError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error(transparent)]
    StageWrite(#[from] StageWriteError),
}
