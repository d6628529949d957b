//! Error types for store and messaging operations

use thiserror::Error;

use crate::domain::{OpportunityId, ProductId};

/// Errors raised by the persistence and messaging layer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Backing store unreachable or failed mid-operation (transient)
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Compare-and-set lost against a concurrent writer
    #[error("Version conflict on opportunity {opportunity_id}: expected {expected}, found {actual}")]
    VersionConflict {
        opportunity_id: OpportunityId,
        expected: u64,
        actual: u64,
    },

    /// Another opportunity for the product is already active
    #[error("Product {0} already has an active opportunity")]
    ActiveOpportunityExists(ProductId),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// NATS connection error
    #[error("NATS connection error: {0}")]
    NatsConnection(String),

    /// NATS publish error
    #[error("NATS publish error: {0}")]
    NatsPublish(String),

    /// NATS subscribe error
    #[error("NATS subscribe error: {0}")]
    NatsSubscribe(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl StoreError {
    /// Lost a compare-and-set race; the caller should reload and retry
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            StoreError::VersionConflict { .. } | StoreError::ActiveOpportunityExists(_)
        )
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

impl From<async_nats::Error> for StoreError {
    fn from(err: async_nats::Error) -> Self {
        StoreError::NatsConnection(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}
