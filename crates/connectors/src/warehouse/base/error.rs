use thiserror::Error;

/// Coarse failure class of a warehouse call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarehouseErrorKind {
    /// The statement could not be compiled: table, schema or column missing.
    Compilation,
    /// The warehouse could not be reached or rejected the session.
    Connectivity,
    /// The statement compiled but failed while executing.
    Execution,
    /// Unexpected response shape.
    Protocol,
}

/// All errors coming from the warehouse layer.
#[derive(Debug, Error)]
pub enum WarehouseError {
    #[error("SQL compilation error: {0}")]
    Compilation(String),

    #[error("Warehouse connectivity error: {0}")]
    Connectivity(String),

    #[error("Statement execution failed: {0}")]
    Execution(String),

    #[error("Unexpected warehouse response: {0}")]
    Protocol(String),

    #[error("Invalid warehouse configuration: {0}")]
    InvalidConfig(String),
}

impl WarehouseError {
    pub fn kind(&self) -> WarehouseErrorKind {
        match self {
            WarehouseError::Compilation(_) => WarehouseErrorKind::Compilation,
            WarehouseError::Connectivity(_) | WarehouseError::InvalidConfig(_) => {
                WarehouseErrorKind::Connectivity
            }
            WarehouseError::Execution(_) => WarehouseErrorKind::Execution,
            WarehouseError::Protocol(_) => WarehouseErrorKind::Protocol,
        }
    }
}
