//! Group buying coordination engine
//!
//! Turns individual purchase intents into pooled, threshold-gated group
//! commitments with a hard expiry. Concurrent joins on one opportunity are
//! serialized through a compare-and-set commit, so an opportunity completes
//! exactly once and no participant is lost. The product participation counter
//! and per-user participation records are written in the same commit as the
//! opportunity.

pub mod aggregate;
pub mod carbon;
pub mod clock;
pub mod config;
pub mod domain;
pub mod errors;
pub mod events;
pub mod nats;
pub mod notification;
pub mod service;
pub mod state_machine;
pub mod store;
pub mod subjects;
pub mod sweeper;

// Re-export commonly used types
pub use config::EngineConfig;
pub use errors::{StoreError, StoreResult};
pub use nats::{MessageHandler, NatsClient, NatsConfig};
pub use service::{GroupBuyCoordinator, GroupBuyService, ServiceError, ServiceResult};
