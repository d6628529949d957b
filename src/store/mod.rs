// Copyright (c) 2025 - Cowboy AI, Inc.
//! Store Abstraction
//!
//! Interfaces to the persisted state the coordinator works against:
//!
//! - [`ProductCatalog`] - read access to product policy
//! - [`UserDirectory`] - existence checks for users
//! - [`OpportunityStore`] - opportunities (source of truth) together with the
//!   derived views: the per-product participation counter and the per-user
//!   participation log
//!
//! # Consistency Contract
//!
//! ```text
//! load (record + version) → decide (pure) → commit(UnitOfWork)
//!                                              ↓
//!                       CAS on version ─► opportunity + counter + records
//! ```
//!
//! A [`UnitOfWork`] is applied atomically or not at all:
//!
//! 1. **Compare-and-set**: the opportunity is written only if its stored
//!    version still equals the expected one; a new opportunity is inserted
//!    only if no other opportunity for the product is active
//! 2. **Derived views ride along**: the counter value and participation
//!    record changes are applied in the same step, never on their own
//! 3. **Versioning**: every successful commit bumps the version by one
//!
//! Losing the CAS yields [`StoreError::VersionConflict`] or
//! [`StoreError::ActiveOpportunityExists`]; the caller reloads and decides
//! again.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    OpportunityId, OpportunityStatus, Opportunity, ParticipationRecord, Product, ProductId, UserId,
};
use crate::errors::StoreResult;

pub mod memory;

pub use memory::InMemoryStore;

/// A stored value with its optimistic-concurrency version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Versioned<T> {
    pub value: T,
    pub version: u64,
}

/// Precondition on the stored version of the opportunity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// Insert; no record with this id may exist
    New,
    /// Update; stored version must equal this value
    Exactly(u64),
}

/// Change to a user's participation log
#[derive(Debug, Clone, PartialEq)]
pub enum RecordChange {
    /// Append a record; ignored if the (user, opportunity) entry exists
    Append(ParticipationRecord),

    /// Update the status of an existing record
    SetStatus {
        user_id: UserId,
        opportunity_id: OpportunityId,
        status: OpportunityStatus,
        at: DateTime<Utc>,
    },
}

/// Atomic write of one opportunity and its derived views
#[derive(Debug, Clone, PartialEq)]
pub struct UnitOfWork {
    /// New state of the opportunity
    pub opportunity: Opportunity,

    pub expected_version: ExpectedVersion,

    /// Value for the product's participation counter
    pub participation_count: u32,

    /// Participation log changes
    pub records: Vec<RecordChange>,
}

impl UnitOfWork {
    /// Unit whose counter follows the opportunity: participant count while
    /// active, zero once it left `Active`
    pub fn for_opportunity(opportunity: Opportunity, expected_version: ExpectedVersion) -> Self {
        let participation_count = if opportunity.is_active() {
            opportunity.participant_count()
        } else {
            0
        };
        Self {
            opportunity,
            expected_version,
            participation_count,
            records: Vec::new(),
        }
    }

    pub fn with_record(mut self, change: RecordChange) -> Self {
        self.records.push(change);
        self
    }

    pub fn with_records(mut self, changes: impl IntoIterator<Item = RecordChange>) -> Self {
        self.records.extend(changes);
        self
    }
}

/// Read access to catalog products
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Look up a product by id
    async fn get_product(&self, product_id: &ProductId) -> StoreResult<Option<Product>>;
}

/// Existence checks against the user store
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn user_exists(&self, user_id: &UserId) -> StoreResult<bool>;
}

/// Opportunity persistence with derived views
#[async_trait]
pub trait OpportunityStore: Send + Sync {
    /// Load one opportunity with its version
    async fn load(&self, id: OpportunityId) -> StoreResult<Option<Versioned<Opportunity>>>;

    /// Opportunities of a product whose status is `Active`, regardless of expiry
    async fn find_active_for_product(
        &self,
        product_id: &ProductId,
    ) -> StoreResult<Vec<Versioned<Opportunity>>>;

    /// Active opportunities whose expiry is strictly before `now`
    async fn find_expired_active(
        &self,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<Versioned<Opportunity>>>;

    /// The user's participation log, oldest first
    async fn participation_records(&self, user_id: &UserId)
        -> StoreResult<Vec<ParticipationRecord>>;

    /// Current value of the product's participation counter
    async fn participation_count(&self, product_id: &ProductId) -> StoreResult<u32>;

    /// Apply a unit of work atomically
    ///
    /// # Returns
    /// The opportunity's version after the commit
    ///
    /// # Errors
    /// - `VersionConflict` if the stored version differs from the expected one
    /// - `ActiveOpportunityExists` when inserting while another opportunity
    ///   for the product is active
    /// - `Unavailable` on I/O failure (nothing was written)
    async fn commit(&self, unit: UnitOfWork) -> StoreResult<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Participant;
    use chrono::Duration;

    fn opportunity(status: OpportunityStatus, participants: usize) -> Opportunity {
        let now = Utc::now();
        Opportunity {
            id: OpportunityId::new(),
            product_id: ProductId::new("p-1"),
            product_name: "Cotton Tote".to_string(),
            initiator_id: UserId::new("u-0"),
            threshold: 5,
            discount_percent: 10.0,
            carbon_saving_percent: 15.0,
            max_participants: None,
            created_at: now,
            expiry_at: now + Duration::days(7),
            participants: (0..participants)
                .map(|i| Participant {
                    user_id: UserId::new(format!("u-{i}")),
                    joined_at: now,
                })
                .collect(),
            status,
            completed_at: None,
            updated_at: now,
        }
    }

    #[test]
    fn test_counter_follows_active_opportunity() {
        let unit = UnitOfWork::for_opportunity(
            opportunity(OpportunityStatus::Active, 3),
            ExpectedVersion::Exactly(2),
        );
        assert_eq!(unit.participation_count, 3);

        for status in [
            OpportunityStatus::Completed,
            OpportunityStatus::Expired,
            OpportunityStatus::Cancelled,
        ] {
            let unit = UnitOfWork::for_opportunity(opportunity(status, 3), ExpectedVersion::New);
            assert_eq!(unit.participation_count, 0);
        }
    }
}
