// Copyright (c) 2025 - Cowboy AI, Inc.
//! Opportunity Lifecycle State Machine
//!
//! Formal FSM for [`OpportunityStatus`]. This is a **Mealy Machine**: the
//! output tells the coordinator which side effects the transition carries.
//!
//! # States
//!
//! - Active: accepting participants (initial)
//! - Completed: threshold reached (terminal)
//! - Expired: expiry passed first (terminal)
//! - Cancelled: withdrawn by an administrator (terminal)
//!
//! # Inputs
//!
//! - Join: Active → Active
//! - ReachThreshold: Active → Completed
//! - Expire: Active → Expired
//! - Cancel: Active → Cancelled

use super::{StateMachine, TransitionError, TransitionResult};
use crate::domain::OpportunityStatus;

/// Lifecycle command (FSM input)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleCommand {
    /// Add a participant without crossing the threshold
    Join,

    /// The join that reaches the threshold
    ReachThreshold,

    /// Expiry passed before the threshold
    Expire,

    /// Administrative withdrawal
    Cancel,
}

/// Side effects carried by a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransitionOutput {
    /// Notify every participant that the discount is unlocked
    pub notify_participants: bool,

    /// Opportunity left `Active`: participation records take the new status
    /// and the product counter resets
    pub closes_opportunity: bool,
}

impl TransitionOutput {
    fn stay() -> Self {
        Self::default()
    }

    fn close(notify_participants: bool) -> Self {
        Self {
            notify_participants,
            closes_opportunity: true,
        }
    }
}

impl StateMachine for OpportunityStatus {
    type Input = LifecycleCommand;
    type Output = TransitionOutput;

    fn transition(&self, input: &Self::Input) -> TransitionResult<(Self, Self::Output)> {
        use LifecycleCommand::*;
        use OpportunityStatus::*;

        match (self, input) {
            (Active, Join) => Ok((Active, TransitionOutput::stay())),
            (Active, ReachThreshold) => Ok((Completed, TransitionOutput::close(true))),
            (Active, Expire) => Ok((Expired, TransitionOutput::close(false))),
            (Active, Cancel) => Ok((Cancelled, TransitionOutput::close(false))),

            // Terminal states
            (Completed, Join) | (Expired, Join) | (Cancelled, Join) => {
                Err(TransitionError::BusinessRuleViolation(format!(
                    "Opportunity is {self} and no longer accepts participants"
                )))
            }
            (from, command) => Err(TransitionError::InvalidTransition {
                from: from.to_string(),
                to: target_of(command).to_string(),
            }),
        }
    }

    fn valid_inputs(&self) -> Vec<Self::Input> {
        use LifecycleCommand::*;

        match self {
            OpportunityStatus::Active => vec![Join, ReachThreshold, Expire, Cancel],
            _ => Vec::new(),
        }
    }
}

fn target_of(command: &LifecycleCommand) -> OpportunityStatus {
    match command {
        LifecycleCommand::Join => OpportunityStatus::Active,
        LifecycleCommand::ReachThreshold => OpportunityStatus::Completed,
        LifecycleCommand::Expire => OpportunityStatus::Expired,
        LifecycleCommand::Cancel => OpportunityStatus::Cancelled,
    }
}
