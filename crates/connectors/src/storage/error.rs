use thiserror::Error;

#[derive(Debug, Error)]
pub enum StageError {
    #[error("Invalid stage URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
