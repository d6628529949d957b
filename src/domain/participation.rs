// Copyright (c) 2025 - Cowboy AI, Inc.
//! User Participation Record
//!
//! One append-only entry per (user, opportunity). The record snapshots the
//! opportunity status and the carbon estimate at join time. Only `status`
//! ever changes afterwards, when the referenced opportunity leaves `Active`.
//! Records are never deleted and the estimate is never recomputed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{OpportunityId, ProductId, UserId};
use super::opportunity::OpportunityStatus;
use crate::carbon::CarbonImpact;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipationRecord {
    pub user_id: UserId,
    pub opportunity_id: OpportunityId,
    pub product_id: ProductId,
    pub status: OpportunityStatus,
    pub joined_at: DateTime<Utc>,

    /// Estimate computed with the participant count right after this join
    pub potential_carbon_saving: CarbonImpact,

    pub updated_at: DateTime<Utc>,
}

impl ParticipationRecord {
    /// Record status with the lifecycle timestamp that changed it
    pub fn with_status(mut self, status: OpportunityStatus, at: DateTime<Utc>) -> Self {
        self.status = status;
        self.updated_at = at;
        self
    }
}
