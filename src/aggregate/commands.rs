// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Functional Commands for the Opportunity Aggregate
//!
//! Commands express user intent and can fail validation.
//! They contain all data needed for business rule enforcement.
//!
//! # Command Pattern
//!
//! ```text
//! Command → handle_command(State, Command) → Result<Decision, Error>
//! ```
//!
//! # Time Handling
//!
//! All commands include explicit `timestamp` parameter.
//! **NEVER call `Utc::now()` in domain logic**.
//! Time is passed from the application layer (see [`crate::clock`]).

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{OpportunityId, Product, UserId};

/// Command to open a new opportunity for a product
///
/// This is the initial command that creates the aggregate. The initiator
/// becomes the first participant.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateOpportunityCommand {
    /// Identity for the new opportunity
    pub opportunity_id: OpportunityId,

    /// Current catalog snapshot; its policy is copied into the opportunity
    pub product: Product,

    /// User whose purchase intent opens the opportunity
    pub initiator_id: UserId,

    /// Timestamp when command was issued (explicit time parameter)
    pub timestamp: DateTime<Utc>,

    /// Correlation ID for distributed tracing
    pub correlation_id: Uuid,
}

/// Command to add a user to an opportunity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOpportunityCommand {
    pub user_id: UserId,

    /// Timestamp when command was issued
    pub timestamp: DateTime<Utc>,

    /// Correlation ID for distributed tracing
    pub correlation_id: Uuid,
}

/// Command to expire an opportunity whose window has passed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpireOpportunityCommand {
    /// Observation time; must be after the opportunity's expiry
    pub timestamp: DateTime<Utc>,

    /// Correlation ID for distributed tracing
    pub correlation_id: Uuid,
}

/// Administrative command to withdraw an active opportunity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelOpportunityCommand {
    /// Free-form reason recorded on the event
    pub reason: String,

    pub timestamp: DateTime<Utc>,

    pub correlation_id: Uuid,
}
