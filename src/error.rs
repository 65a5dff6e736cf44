use crate::domain::guard::Action;
use crate::domain::payment::{ActorId, PaymentId, PaymentStatus};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PaymentError>;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("payment {0} not found")]
    NotFound(PaymentId),
    #[error("payment {0} already exists")]
    AlreadyExists(PaymentId),
    #[error("actor {actor} is not allowed to {action}")]
    Unauthorized { actor: ActorId, action: Action },
    #[error("cannot {action} a payment in status {current}")]
    InvalidTransition {
        action: Action,
        current: PaymentStatus,
    },
    #[error("Validation error: {0}")]
    ValidationError(String),
    /// The record changed between read and commit. Retried by the executor,
    /// never returned from a public operation.
    #[error("concurrent modification detected")]
    StoreConflict,
    #[error("transaction retry budget exhausted after {attempts} attempts")]
    RetryExhausted { attempts: u32 },
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDbError(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

impl PaymentError {
    /// Returns `true` for failures the executor absorbs by re-running the transaction.
    pub fn is_conflict(&self) -> bool {
        matches!(self, PaymentError::StoreConflict)
    }
}
