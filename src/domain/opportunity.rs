// Copyright (c) 2025 - Cowboy AI, Inc.
//! Group-Buy Opportunity
//!
//! A crowd-purchase instance for one product. The opportunity record is the
//! source of truth; the product participation counter and the users'
//! participation records are views derived from it.
//!
//! # Lifecycle
//!
//! ```text
//! Active ──► Completed   (threshold reached)
//!    ├─────► Expired     (expiry passed before threshold)
//!    └─────► Cancelled   (administrative)
//! ```
//!
//! Status never re-enters `Active`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{OpportunityId, ProductId, UserId};

/// Lifecycle status of an opportunity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityStatus {
    /// Accepting participants
    Active,
    /// Threshold reached; discount unlocked
    Completed,
    /// Expiry passed before the threshold was reached
    Expired,
    /// Withdrawn by an administrator
    Cancelled,
}

impl OpportunityStatus {
    /// Terminal states accept no further transitions
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OpportunityStatus::Active)
    }

    /// Check if a transition to `to` is allowed
    pub fn can_transition_to(&self, to: &OpportunityStatus) -> bool {
        matches!(
            (self, to),
            (OpportunityStatus::Active, OpportunityStatus::Completed)
                | (OpportunityStatus::Active, OpportunityStatus::Expired)
                | (OpportunityStatus::Active, OpportunityStatus::Cancelled)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OpportunityStatus::Active => "active",
            OpportunityStatus::Completed => "completed",
            OpportunityStatus::Expired => "expired",
            OpportunityStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OpportunityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user who joined an opportunity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub user_id: UserId,
    pub joined_at: DateTime<Utc>,
}

/// Group-buy opportunity record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: OpportunityId,

    pub product_id: ProductId,

    /// Product name at creation time
    pub product_name: String,

    /// User whose purchase intent created the opportunity
    pub initiator_id: UserId,

    /// Participants required for success
    pub threshold: u32,

    /// Policy values copied from the product at creation
    pub discount_percent: f64,
    pub carbon_saving_percent: f64,
    pub max_participants: Option<u32>,

    pub created_at: DateTime<Utc>,

    /// Fixed at creation: `created_at + product.expiry_days`
    pub expiry_at: DateTime<Utc>,

    /// Join order, unique by user
    pub participants: Vec<Participant>,

    pub status: OpportunityStatus,

    /// Set exactly once, on the transition to `Completed`
    pub completed_at: Option<DateTime<Utc>>,

    /// Timestamp of the latest change
    pub updated_at: DateTime<Utc>,
}

impl Opportunity {
    pub fn participant_count(&self) -> u32 {
        u32::try_from(self.participants.len()).unwrap_or(u32::MAX)
    }

    pub fn has_participant(&self, user_id: &UserId) -> bool {
        self.participants.iter().any(|p| &p.user_id == user_id)
    }

    pub fn participant_ids(&self) -> impl Iterator<Item = &UserId> {
        self.participants.iter().map(|p| &p.user_id)
    }

    pub fn is_active(&self) -> bool {
        self.status == OpportunityStatus::Active
    }

    /// Expiry has passed at `now` (strictly after `expiry_at`)
    pub fn is_past_expiry(&self, now: DateTime<Utc>) -> bool {
        now > self.expiry_at
    }

    /// Active and still inside its window at `now`
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active() && !self.is_past_expiry(now)
    }

    pub fn is_full(&self) -> bool {
        self.max_participants
            .is_some_and(|cap| self.participant_count() >= cap)
    }

    pub fn threshold_reached(&self) -> bool {
        self.participant_count() >= self.threshold
    }

    /// Participants still needed to reach the threshold
    pub fn remaining_to_threshold(&self) -> u32 {
        self.threshold.saturating_sub(self.participant_count())
    }
}
