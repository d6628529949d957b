// Copyright (c) 2025 - Cowboy AI, Inc.
//! Opportunity Domain Events
//!
//! Every change to an opportunity is expressed as one of these facts and
//! folded onto the record by [`crate::aggregate::apply_event`].
//! Events are past tense, carry a correlation id for request tracing and an
//! `event_version` for schema evolution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{OpportunityId, OpportunityStatus, ProductId, UserId};

/// Opportunity Domain Events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OpportunityEvent {
    /// First purchase intent for a product opened an opportunity
    OpportunityCreated(OpportunityCreated),

    /// A user joined
    ParticipantJoined(ParticipantJoined),

    /// Threshold reached
    OpportunityCompleted(OpportunityCompleted),

    /// Expiry passed before the threshold
    OpportunityExpired(OpportunityExpired),

    /// Administrative withdrawal
    OpportunityCancelled(OpportunityCancelled),
}

/// Opportunity was opened with a snapshot of the product policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpportunityCreated {
    /// Event version for schema evolution
    pub event_version: u32,

    /// Unique event identifier (UUID v7 for time ordering)
    pub event_id: Uuid,

    pub opportunity_id: OpportunityId,

    /// When this event occurred
    pub timestamp: DateTime<Utc>,

    /// Correlation ID for request tracing
    pub correlation_id: Uuid,

    pub product_id: ProductId,
    pub product_name: String,
    pub initiator_id: UserId,
    pub threshold: u32,
    pub discount_percent: f64,
    pub carbon_saving_percent: f64,
    pub max_participants: Option<u32>,
    pub expiry_at: DateTime<Utc>,
}

/// A participant was appended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantJoined {
    pub event_version: u32,
    pub event_id: Uuid,
    pub opportunity_id: OpportunityId,
    pub timestamp: DateTime<Utc>,
    pub correlation_id: Uuid,

    pub user_id: UserId,

    /// Participant count including this user
    pub participant_count: u32,
}

/// The opportunity reached its threshold
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpportunityCompleted {
    pub event_version: u32,
    pub event_id: Uuid,
    pub opportunity_id: OpportunityId,
    pub timestamp: DateTime<Utc>,
    pub correlation_id: Uuid,

    pub participant_count: u32,
}

/// The opportunity expired before its threshold
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpportunityExpired {
    pub event_version: u32,
    pub event_id: Uuid,
    pub opportunity_id: OpportunityId,
    pub timestamp: DateTime<Utc>,
    pub correlation_id: Uuid,

    pub participant_count: u32,
}

/// An administrator withdrew the opportunity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpportunityCancelled {
    pub event_version: u32,
    pub event_id: Uuid,
    pub opportunity_id: OpportunityId,
    pub timestamp: DateTime<Utc>,
    pub correlation_id: Uuid,

    pub reason: String,
}

impl OpportunityEvent {
    pub fn opportunity_id(&self) -> OpportunityId {
        match self {
            OpportunityEvent::OpportunityCreated(e) => e.opportunity_id,
            OpportunityEvent::ParticipantJoined(e) => e.opportunity_id,
            OpportunityEvent::OpportunityCompleted(e) => e.opportunity_id,
            OpportunityEvent::OpportunityExpired(e) => e.opportunity_id,
            OpportunityEvent::OpportunityCancelled(e) => e.opportunity_id,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            OpportunityEvent::OpportunityCreated(e) => e.timestamp,
            OpportunityEvent::ParticipantJoined(e) => e.timestamp,
            OpportunityEvent::OpportunityCompleted(e) => e.timestamp,
            OpportunityEvent::OpportunityExpired(e) => e.timestamp,
            OpportunityEvent::OpportunityCancelled(e) => e.timestamp,
        }
    }

    /// Status the opportunity ends up in once this event is applied,
    /// `None` if the event does not change status
    pub fn resulting_status(&self) -> Option<OpportunityStatus> {
        match self {
            OpportunityEvent::OpportunityCreated(_) => Some(OpportunityStatus::Active),
            OpportunityEvent::ParticipantJoined(_) => None,
            OpportunityEvent::OpportunityCompleted(_) => Some(OpportunityStatus::Completed),
            OpportunityEvent::OpportunityExpired(_) => Some(OpportunityStatus::Expired),
            OpportunityEvent::OpportunityCancelled(_) => Some(OpportunityStatus::Cancelled),
        }
    }

    /// Human-readable event type name
    pub fn event_type_name(&self) -> &'static str {
        match self {
            OpportunityEvent::OpportunityCreated(_) => "created",
            OpportunityEvent::ParticipantJoined(_) => "participant_joined",
            OpportunityEvent::OpportunityCompleted(_) => "completed",
            OpportunityEvent::OpportunityExpired(_) => "expired",
            OpportunityEvent::OpportunityCancelled(_) => "cancelled",
        }
    }
}

/// Event version constants
impl OpportunityCreated {
    pub const CURRENT_VERSION: u32 = 1;
}

impl ParticipantJoined {
    pub const CURRENT_VERSION: u32 = 1;
}

impl OpportunityCompleted {
    pub const CURRENT_VERSION: u32 = 1;
}

impl OpportunityExpired {
    pub const CURRENT_VERSION: u32 = 1;
}

impl OpportunityCancelled {
    pub const CURRENT_VERSION: u32 = 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = OpportunityEvent::ParticipantJoined(ParticipantJoined {
            event_version: ParticipantJoined::CURRENT_VERSION,
            event_id: Uuid::now_v7(),
            opportunity_id: OpportunityId::new(),
            timestamp: Utc::now(),
            correlation_id: Uuid::now_v7(),
            user_id: UserId::new("bob"),
            participant_count: 2,
        });

        let json = serde_json::to_value(&event).expect("Failed to serialize");
        assert_eq!(json["type"], "participant_joined");
        assert_eq!(json["user_id"], "bob");

        let back: OpportunityEvent = serde_json::from_value(json).expect("Failed to deserialize");
        assert_eq!(back, event);
        assert_eq!(back.resulting_status(), None);
    }
}
