// Copyright (c) 2025 - Cowboy AI, Inc.
//! Group Buying Domain Events
//!
//! Events are immutable facts representing state changes that have occurred.
//!
//! # Event Sourcing Principles
//!
//! 1. **Events are immutable**: Once created, events never change
//! 2. **Events are past tense**: Named for what happened (Joined, not Join)
//! 3. **Events include metadata**: correlation_id, timestamp
//! 4. **Events are versioned**: event_version field for schema evolution
//!
//! # Event Flow
//!
//! ```text
//! Command → Handler → Events → apply_event → Opportunity → Store (CAS)
//!   (intent)  (validate)  (facts)              (new record)   (persist + views)
//! ```
//!
//! The coordinator keeps the opportunity record (not the event stream) as the
//! persisted source of truth; events are the unit of decision and logging.

pub mod opportunity;

pub use opportunity::{
    OpportunityCancelled, OpportunityCompleted, OpportunityCreated, OpportunityEvent,
    OpportunityExpired, ParticipantJoined,
};
