// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Functional Command Handlers for the Opportunity Aggregate
//!
//! Command handlers are pure functions that:
//! 1. Take current state + command
//! 2. Validate business rules
//! 3. Return a decision carrying events (success) or Error (validation failure)
//!
//! # Handler Pattern
//!
//! ```text
//! handle_command(State, Command) → Result<Decision, CommandError>
//! ```
//!
//! Handlers never read the clock and never touch storage. Whether the
//! decision survives concurrent writers is settled by the store's
//! compare-and-set (see [`crate::store::OpportunityStore::commit`]).
//!
//! # Business Rule Enforcement
//!
//! - Group buying must be enabled and the product policy valid
//! - Status transitions follow [`crate::state_machine::opportunity_lifecycle`]
//! - A user appears at most once; the optional cap is respected
//! - An active opportunity observed past its expiry is expired, not joined

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::aggregate::commands::*;
use crate::domain::invariants::{validate_product_policy, ValidationError};
use crate::domain::{Opportunity, OpportunityStatus};
use crate::events::opportunity::*;
use crate::state_machine::{
    LifecycleCommand, StateMachine, TransitionError, TransitionOutput,
};

/// Command validation error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    /// Product does not offer group buying
    #[error("Group buying is disabled for this product")]
    FeatureDisabled,

    /// Product policy cannot seed an opportunity
    #[error("Invalid product policy: {0}")]
    InvalidPolicy(#[from] ValidationError),

    /// Opportunity already expired
    #[error("Opportunity has expired")]
    AlreadyExpired,

    /// Opportunity is completed or cancelled
    #[error("Opportunity is {0}")]
    NotActive(OpportunityStatus),

    /// Participant cap reached
    #[error("Opportunity is full ({cap} participants)")]
    CapacityReached { cap: u32 },

    /// Expire requested before the expiry instant
    #[error("Opportunity does not expire until {expiry_at}")]
    NotYetExpired { expiry_at: DateTime<Utc> },

    /// Lifecycle transition rejected
    #[error("Lifecycle violation: {0}")]
    Transition(#[from] TransitionError),
}

/// Outcome of [`handle_join`]
#[derive(Debug, Clone, PartialEq)]
pub enum JoinDecision {
    /// User is already a participant; nothing changes
    AlreadyJoined,

    /// The opportunity was still active but its expiry has passed; these
    /// events expire it and the join must be refused
    ExpireInstead(Vec<OpportunityEvent>),

    /// User is appended; `output` carries the lifecycle side effects
    Join {
        events: Vec<OpportunityEvent>,
        output: TransitionOutput,
    },
}

/// Handle CreateOpportunity command
///
/// # Business Rules
/// - Group buying enabled on the product
/// - Product policy valid (threshold ≥ 2, cap ≥ threshold, expiry within 1..=3650 days)
/// - Expiry instant representable from the command timestamp
///
/// # Returns
/// `OpportunityCreated` followed by the initiator's `ParticipantJoined`
pub fn handle_create_opportunity(
    command: CreateOpportunityCommand,
) -> Result<Vec<OpportunityEvent>, CommandError> {
    let product = command.product;

    if !product.group_buying_enabled {
        return Err(CommandError::FeatureDisabled);
    }
    validate_product_policy(&product)?;

    let expiry_at = command
        .timestamp
        .checked_add_signed(Duration::days(i64::from(product.expiry_days)))
        .ok_or(ValidationError::ExpiryWindowTooLong(product.expiry_days))?;

    let created = OpportunityCreated {
        event_version: OpportunityCreated::CURRENT_VERSION,
        event_id: Uuid::now_v7(),
        opportunity_id: command.opportunity_id,
        timestamp: command.timestamp,
        correlation_id: command.correlation_id,
        product_id: product.id,
        product_name: product.name,
        initiator_id: command.initiator_id.clone(),
        threshold: product.threshold,
        discount_percent: product.discount_percent,
        carbon_saving_percent: product.carbon_saving_percent,
        max_participants: product.max_participants,
        expiry_at,
    };

    let joined = ParticipantJoined {
        event_version: ParticipantJoined::CURRENT_VERSION,
        event_id: Uuid::now_v7(),
        opportunity_id: command.opportunity_id,
        timestamp: command.timestamp,
        correlation_id: command.correlation_id,
        user_id: command.initiator_id,
        participant_count: 1,
    };

    Ok(vec![
        OpportunityEvent::OpportunityCreated(created),
        OpportunityEvent::ParticipantJoined(joined),
    ])
}

/// Handle JoinOpportunity command
///
/// # Business Rules (in order)
/// 1. Active but past expiry → expire instead of joining
/// 2. Already a participant → idempotent no-op (any status except expired)
/// 3. Expired → `AlreadyExpired`; completed/cancelled → `NotActive`
/// 4. Cap reached → `CapacityReached`
/// 5. Append; the append that reaches the threshold also completes
pub fn handle_join(
    state: &Opportunity,
    command: JoinOpportunityCommand,
) -> Result<JoinDecision, CommandError> {
    if state.is_active() && state.is_past_expiry(command.timestamp) {
        let events = handle_expire(
            state,
            ExpireOpportunityCommand {
                timestamp: command.timestamp,
                correlation_id: command.correlation_id,
            },
        )?;
        return Ok(JoinDecision::ExpireInstead(events));
    }

    if state.has_participant(&command.user_id) && state.status != OpportunityStatus::Expired {
        return Ok(JoinDecision::AlreadyJoined);
    }

    match state.status {
        OpportunityStatus::Active => {}
        OpportunityStatus::Expired => return Err(CommandError::AlreadyExpired),
        status => return Err(CommandError::NotActive(status)),
    }

    if let Some(cap) = state.max_participants {
        if state.is_full() {
            return Err(CommandError::CapacityReached { cap });
        }
    }

    let participant_count = state.participant_count() + 1;
    let lifecycle = if participant_count >= state.threshold {
        LifecycleCommand::ReachThreshold
    } else {
        LifecycleCommand::Join
    };
    let (_, output) = state.status.transition(&lifecycle)?;

    let mut events = vec![OpportunityEvent::ParticipantJoined(ParticipantJoined {
        event_version: ParticipantJoined::CURRENT_VERSION,
        event_id: Uuid::now_v7(),
        opportunity_id: state.id,
        timestamp: command.timestamp,
        correlation_id: command.correlation_id,
        user_id: command.user_id,
        participant_count,
    })];

    if lifecycle == LifecycleCommand::ReachThreshold {
        events.push(OpportunityEvent::OpportunityCompleted(OpportunityCompleted {
            event_version: OpportunityCompleted::CURRENT_VERSION,
            event_id: Uuid::now_v7(),
            opportunity_id: state.id,
            timestamp: command.timestamp,
            correlation_id: command.correlation_id,
            participant_count,
        }));
    }

    Ok(JoinDecision::Join { events, output })
}

/// Handle ExpireOpportunity command
///
/// # Business Rules
/// - Opportunity must be active
/// - Observation time must be past the expiry instant
pub fn handle_expire(
    state: &Opportunity,
    command: ExpireOpportunityCommand,
) -> Result<Vec<OpportunityEvent>, CommandError> {
    state.status.transition(&LifecycleCommand::Expire)?;

    if !state.is_past_expiry(command.timestamp) {
        return Err(CommandError::NotYetExpired {
            expiry_at: state.expiry_at,
        });
    }

    Ok(vec![OpportunityEvent::OpportunityExpired(OpportunityExpired {
        event_version: OpportunityExpired::CURRENT_VERSION,
        event_id: Uuid::now_v7(),
        opportunity_id: state.id,
        timestamp: command.timestamp,
        correlation_id: command.correlation_id,
        participant_count: state.participant_count(),
    })])
}

/// Handle CancelOpportunity command
///
/// # Business Rules
/// - Opportunity must be active
pub fn handle_cancel(
    state: &Opportunity,
    command: CancelOpportunityCommand,
) -> Result<Vec<OpportunityEvent>, CommandError> {
    state.status.transition(&LifecycleCommand::Cancel)?;

    Ok(vec![OpportunityEvent::OpportunityCancelled(
        OpportunityCancelled {
            event_version: OpportunityCancelled::CURRENT_VERSION,
            event_id: Uuid::now_v7(),
            opportunity_id: state.id,
            timestamp: command.timestamp,
            correlation_id: command.correlation_id,
            reason: command.reason,
        },
    )])
}
