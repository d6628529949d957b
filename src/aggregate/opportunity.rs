// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Functional Opportunity Aggregate
//!
//! ```text
//! Command → handle_command() → Result<Decision, Error>
//!                                    ↓
//! Events → apply_event() → New Opportunity
//! ```

use crate::domain::{Opportunity, OpportunityStatus, Participant};
use crate::events::opportunity::*;

impl From<&OpportunityCreated> for Opportunity {
    fn from(e: &OpportunityCreated) -> Self {
        Opportunity {
            id: e.opportunity_id,
            product_id: e.product_id.clone(),
            product_name: e.product_name.clone(),
            initiator_id: e.initiator_id.clone(),
            threshold: e.threshold,
            discount_percent: e.discount_percent,
            carbon_saving_percent: e.carbon_saving_percent,
            max_participants: e.max_participants,
            created_at: e.timestamp,
            expiry_at: e.expiry_at,
            participants: Vec::new(),
            status: OpportunityStatus::Active,
            completed_at: None,
            updated_at: e.timestamp,
        }
    }
}

/// Apply event to state (pure function)
///
/// # Invariants
/// - Function is pure (no side effects)
/// - Same event + same state = same result
/// - Never fails (events are facts that happened)
pub fn apply_event(state: Opportunity, event: &OpportunityEvent) -> Opportunity {
    use OpportunityEvent::*;

    match event {
        OpportunityCreated(e) => Opportunity::from(e),

        ParticipantJoined(e) => {
            let mut participants = state.participants;
            if !participants.iter().any(|p| p.user_id == e.user_id) {
                participants.push(Participant {
                    user_id: e.user_id.clone(),
                    joined_at: e.timestamp,
                });
            }
            Opportunity {
                participants,
                updated_at: e.timestamp,
                ..state
            }
        }

        OpportunityCompleted(e) => Opportunity {
            status: OpportunityStatus::Completed,
            completed_at: state.completed_at.or(Some(e.timestamp)),
            updated_at: e.timestamp,
            ..state
        },

        OpportunityExpired(e) => Opportunity {
            status: OpportunityStatus::Expired,
            updated_at: e.timestamp,
            ..state
        },

        OpportunityCancelled(e) => Opportunity {
            status: OpportunityStatus::Cancelled,
            updated_at: e.timestamp,
            ..state
        },
    }
}

/// Apply a batch of events in order
pub fn apply_events(state: Opportunity, events: &[OpportunityEvent]) -> Opportunity {
    events.iter().fold(state, apply_event)
}

/// Reconstruct an opportunity from its full event stream
///
/// Returns `None` unless the stream starts with `OpportunityCreated`.
pub fn replay(events: &[OpportunityEvent]) -> Option<Opportunity> {
    match events.split_first() {
        Some((OpportunityEvent::OpportunityCreated(created), rest)) => {
            Some(apply_events(Opportunity::from(created), rest))
        }
        _ => None,
    }
}
