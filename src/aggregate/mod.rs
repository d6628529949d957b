// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Functional Aggregates
//!
//! The opportunity aggregate follows the functional decider pattern:
//! - Handlers are pure functions: State → Command → Result<Decision, Error>
//! - State changes are events folded onto the record: [Event] → State
//! - No I/O, no clock, no mutation of shared state
//!
//! # Pattern
//!
//! ```text
//! Command → Handler → Events → apply_event → New Opportunity
//!    ↓          ↓          ↓
//! Intent   Validation  Facts
//! ```
//!
//! The application layer ([`crate::service`]) loads the current record with
//! its version, runs a handler, folds the events and commits the result with
//! a compare-and-set on that version.
//!
//! # Example Usage
//!
//! ```rust
//! use chrono::Utc;
//! use uuid::Uuid;
//! use group_buy_engine::aggregate::*;
//! use group_buy_engine::domain::{OpportunityId, OpportunityStatus, Product, UserId};
//!
//! let events = handle_create_opportunity(CreateOpportunityCommand {
//!     opportunity_id: OpportunityId::new(),
//!     product: Product::with_group_buying("p-1", "Tote Bag").threshold(2),
//!     initiator_id: UserId::new("alice"),
//!     timestamp: Utc::now(),
//!     correlation_id: Uuid::now_v7(),
//! })
//! .unwrap();
//! let opportunity = replay(&events).unwrap();
//!
//! let decision = handle_join(&opportunity, JoinOpportunityCommand {
//!     user_id: UserId::new("bob"),
//!     timestamp: Utc::now(),
//!     correlation_id: Uuid::now_v7(),
//! })
//! .unwrap();
//!
//! if let JoinDecision::Join { events, .. } = decision {
//!     let opportunity = apply_events(opportunity, &events);
//!     assert_eq!(opportunity.status, OpportunityStatus::Completed);
//! }
//! ```

pub mod commands;
pub mod handlers;
pub mod opportunity;

pub use commands::*;
pub use handlers::*;
pub use opportunity::{apply_event, apply_events, replay};
