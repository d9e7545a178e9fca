use connectors::{api::error::ApiError, storage::error::StageError};
use model::resource::ResourceKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request for {resource} page {page} failed: {source}")]
    Api {
        resource: ResourceKind,
        page: u32,
        #[source]
        source: ApiError,
    },

    #[error("Giving up on {resource} page {page} after {attempts} attempts: {source}")]
    RetriesExhausted {
        resource: ResourceKind,
        page: u32,
        attempts: usize,
        #[source]
        source: ApiError,
    },
}

impl FetchError {
    pub fn page(&self) -> u32 {
        match self {
            FetchError::Api { page, .. } | FetchError::RetriesExhausted { page, .. } => *page,
        }
    }

    pub fn api_error(&self) -> &ApiError {
        match self {
            FetchError::Api { source, .. } | FetchError::RetriesExhausted { source, .. } => source,
        }
    }
}

#[derive(Error, Debug)]
pub enum NormalizeError {
    /// The record at `position` (0-based, in fetch order) is not an object or
    /// has no usable identifier.
    #[error("{resource} record #{position} (page {page}) has no '{field}' identifier")]
    MissingIdentifier {
        resource: ResourceKind,
        position: usize,
        page: u32,
        field: &'static str,
    },
}

#[derive(Error, Debug)]
pub enum StageWriteError {
    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error while encoding: {0}")]
    Io(#[from] std::io::Error),

    #[error("Row {row} has {found} values, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Failed to upload {name}: {source}")]
    Upload {
        name: String,
        #[source]
        source: StageError,
    },

    #[error("Failed to clean up stale object {name}: {source}")]
    Cleanup {
        name: String,
        #[source]
        source: StageError,
    },
}
