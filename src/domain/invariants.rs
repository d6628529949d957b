// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Validation Functions - Domain Invariants
//!
//! Business rule checks for opportunities and their product policy.
//! All functions are pure (no side effects) and return detailed validation results.
//!
//! # Invariant Categories
//!
//! 1. **Policy Invariants**: Product values an opportunity can be built from
//! 2. **Structural Invariants**: Participant list shape
//! 3. **Transition Invariants**: Monotonic status changes
//! 4. **Consistency Invariants**: Fields that must agree with the status

use std::collections::HashSet;

use super::opportunity::{Opportunity, OpportunityStatus};
use super::product::Product;

/// Smallest threshold that makes a group purchase meaningful
pub const MIN_THRESHOLD: u32 = 2;

/// Longest expiry window a product may ask for (ten years)
pub const MAX_EXPIRY_DAYS: u32 = 3650;

/// Validation result with detailed error information
pub type ValidationResult = Result<(), ValidationError>;

/// Validation error with context
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Threshold below the minimum
    #[error("Threshold must be at least {MIN_THRESHOLD}, got {0}")]
    ThresholdTooLow(u32),

    /// Cap would make the threshold unreachable
    #[error("Participant cap {cap} is below threshold {threshold}")]
    CapBelowThreshold { cap: u32, threshold: u32 },

    /// Expiry window must be at least one day
    #[error("Expiry window must be at least one day")]
    ZeroExpiryWindow,

    /// Expiry window longer than the engine schedules
    #[error("Expiry window of {0} days exceeds the {MAX_EXPIRY_DAYS} day limit")]
    ExpiryWindowTooLong(u32),

    /// Percent value outside 0..=100
    #[error("{field} must be within 0..=100, got {value}")]
    PercentOutOfRange { field: &'static str, value: f64 },

    /// Same user listed twice
    #[error("Duplicate participant: {0}")]
    DuplicateParticipant(String),

    /// More participants than the cap allows
    #[error("Participant count {count} exceeds cap {cap}")]
    CapExceeded { count: u32, cap: u32 },

    /// State transition not allowed
    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition {
        from: OpportunityStatus,
        to: OpportunityStatus,
    },

    /// `completed_at` disagrees with status
    #[error("completed_at must be set if and only if status is completed (status: {0})")]
    CompletionMismatch(OpportunityStatus),

    /// Completed with fewer participants than the threshold
    #[error("Completed with {count} participants, threshold is {threshold}")]
    CompletedBelowThreshold { count: u32, threshold: u32 },
}

/// Validate a product policy can seed an opportunity
///
/// # Rules
/// - Threshold ≥ 2
/// - Optional cap not below the threshold
/// - Expiry window between 1 and [`MAX_EXPIRY_DAYS`] days
/// - Percent values within 0..=100
pub fn validate_product_policy(product: &Product) -> ValidationResult {
    if product.threshold < MIN_THRESHOLD {
        return Err(ValidationError::ThresholdTooLow(product.threshold));
    }

    if let Some(cap) = product.max_participants {
        if cap < product.threshold {
            return Err(ValidationError::CapBelowThreshold {
                cap,
                threshold: product.threshold,
            });
        }
    }

    if product.expiry_days == 0 {
        return Err(ValidationError::ZeroExpiryWindow);
    }
    if product.expiry_days > MAX_EXPIRY_DAYS {
        return Err(ValidationError::ExpiryWindowTooLong(product.expiry_days));
    }

    validate_percent("discount_percent", product.discount_percent)?;
    validate_percent("carbon_saving_percent", product.carbon_saving_percent)?;

    Ok(())
}

fn validate_percent(field: &'static str, value: f64) -> ValidationResult {
    if !(0.0..=100.0).contains(&value) {
        return Err(ValidationError::PercentOutOfRange { field, value });
    }
    Ok(())
}

/// Validate the participant list
///
/// # Rules
/// - No duplicate user ids
/// - Count within the optional cap
pub fn validate_participants(opportunity: &Opportunity) -> ValidationResult {
    let mut seen = HashSet::new();
    for participant in &opportunity.participants {
        if !seen.insert(&participant.user_id) {
            return Err(ValidationError::DuplicateParticipant(
                participant.user_id.to_string(),
            ));
        }
    }

    if let Some(cap) = opportunity.max_participants {
        let count = opportunity.participant_count();
        if count > cap {
            return Err(ValidationError::CapExceeded { count, cap });
        }
    }

    Ok(())
}

/// Validate state transition is allowed
///
/// # Rules
/// - Active → Completed, Expired, Cancelled
/// - Completed, Expired, Cancelled → (terminal)
pub fn validate_state_transition(
    from: OpportunityStatus,
    to: OpportunityStatus,
) -> ValidationResult {
    if !from.can_transition_to(&to) {
        return Err(ValidationError::InvalidTransition { from, to });
    }
    Ok(())
}

/// Validate status-dependent fields
///
/// # Rules
/// - `completed_at` is set exactly when status is Completed
/// - A completed opportunity reached its threshold
pub fn validate_completion(opportunity: &Opportunity) -> ValidationResult {
    let completed = opportunity.status == OpportunityStatus::Completed;
    if completed != opportunity.completed_at.is_some() {
        return Err(ValidationError::CompletionMismatch(opportunity.status));
    }

    if completed && !opportunity.threshold_reached() {
        return Err(ValidationError::CompletedBelowThreshold {
            count: opportunity.participant_count(),
            threshold: opportunity.threshold,
        });
    }

    Ok(())
}

/// Run all stateless opportunity invariants
pub fn validate_opportunity(opportunity: &Opportunity) -> ValidationResult {
    if opportunity.threshold < MIN_THRESHOLD {
        return Err(ValidationError::ThresholdTooLow(opportunity.threshold));
    }
    validate_participants(opportunity)?;
    validate_completion(opportunity)?;
    Ok(())
}
