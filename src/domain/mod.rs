// Copyright (c) 2025 - Cowboy AI, Inc.
//! Group Buying Domain Models
//!
//! Core concepts of the group buying engine: the opportunity record and its
//! lifecycle status, the product policy it is seeded from, and the per-user
//! participation records derived from it.
//!
//! # Source of Truth
//!
//! - [`Opportunity`] - authoritative record of one group purchase
//!
//! # Derived Views
//!
//! - Product participation counter (held by the store)
//! - [`ParticipationRecord`] - per-user history entry
//!
//! # Invariants
//!
//! - [`invariants`] - pure validation of policy, participants and status

pub mod ids;
pub mod invariants;
pub mod opportunity;
pub mod participation;
pub mod product;

pub use ids::{OpportunityId, ProductId, UserId};
pub use invariants::{ValidationError, ValidationResult};
pub use opportunity::{Opportunity, OpportunityStatus, Participant};
pub use participation::ParticipationRecord;
pub use product::Product;
