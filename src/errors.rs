use thiserror::Error;

/// Failures reported by the stores the engine talks to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Recurring transaction {0} not found")]
    NotFound(u64),

    #[error("Store rejected the operation: {0}")]
    Rejected(String),
}
