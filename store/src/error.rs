use listwise_types::{BusinessId, ClaimId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("key not found: {0}")]
    NotFound(String),

    #[error("duplicate key: {0}")]
    Duplicate(String),

    #[error("{0} already has an owner")]
    AlreadyOwned(BusinessId),

    #[error("{0} has already been decided")]
    AlreadyDecided(ClaimId),

    #[error("{0} has not completed self-service verification")]
    NotVerified(ClaimId),

    #[error("{0} was modified by another request")]
    Stale(ClaimId),

    #[error("conflicting write: {0}")]
    Conflict(String),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("database is corrupted: {0}")]
    Corruption(String),
}
