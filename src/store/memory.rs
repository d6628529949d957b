// Copyright (c) 2025 - Cowboy AI, Inc.
//! In-Memory Store
//!
//! Implements [`ProductCatalog`], [`UserDirectory`] and [`OpportunityStore`]
//! over a single `RwLock`, so every [`UnitOfWork`] is applied under one
//! write guard. Used by the host binary and by tests; a database-backed
//! store must provide the same atomicity with a transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

use super::{
    ExpectedVersion, OpportunityStore, ProductCatalog, RecordChange, UnitOfWork, UserDirectory,
    Versioned,
};
use crate::domain::{Opportunity, OpportunityId, ParticipationRecord, Product, ProductId, UserId};
use crate::errors::{StoreError, StoreResult};

#[derive(Debug, Default)]
struct StoreState {
    products: HashMap<ProductId, Product>,
    /// `None` accepts every user id
    users: Option<HashSet<UserId>>,
    opportunities: HashMap<OpportunityId, Versioned<Opportunity>>,
    counters: HashMap<ProductId, u32>,
    /// Append-only, in insertion order
    records: Vec<ParticipationRecord>,
}

/// Process-local store
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
    unavailable: AtomicBool,
}

impl InMemoryStore {
    /// Empty store that accepts any user id
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty store that only knows the given users
    pub fn with_registered_users(users: impl IntoIterator<Item = UserId>) -> Self {
        Self {
            state: RwLock::new(StoreState {
                users: Some(users.into_iter().collect()),
                ..StoreState::default()
            }),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Add or replace a catalog product
    pub async fn upsert_product(&self, product: Product) {
        let mut state = self.state.write().await;
        state.products.insert(product.id.clone(), product);
    }

    /// Register a user (only meaningful with a closed directory)
    pub async fn register_user(&self, user_id: UserId) {
        let mut state = self.state.write().await;
        if let Some(users) = state.users.as_mut() {
            users.insert(user_id);
        }
    }

    /// Simulate an outage: every operation fails with `Unavailable`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "in-memory store marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ProductCatalog for InMemoryStore {
    async fn get_product(&self, product_id: &ProductId) -> StoreResult<Option<Product>> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(state.products.get(product_id).cloned())
    }
}

#[async_trait]
impl UserDirectory for InMemoryStore {
    async fn user_exists(&self, user_id: &UserId) -> StoreResult<bool> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(state
            .users
            .as_ref()
            .map_or(true, |users| users.contains(user_id)))
    }
}

#[async_trait]
impl OpportunityStore for InMemoryStore {
    async fn load(&self, id: OpportunityId) -> StoreResult<Option<Versioned<Opportunity>>> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(state.opportunities.get(&id).cloned())
    }

    async fn find_active_for_product(
        &self,
        product_id: &ProductId,
    ) -> StoreResult<Vec<Versioned<Opportunity>>> {
        self.ensure_available()?;
        let state = self.state.read().await;
        let mut found: Vec<_> = state
            .opportunities
            .values()
            .filter(|o| &o.value.product_id == product_id && o.value.is_active())
            .cloned()
            .collect();
        found.sort_by_key(|o| o.value.created_at);
        Ok(found)
    }

    async fn find_expired_active(
        &self,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<Versioned<Opportunity>>> {
        self.ensure_available()?;
        let state = self.state.read().await;
        let mut found: Vec<_> = state
            .opportunities
            .values()
            .filter(|o| o.value.is_active() && o.value.expiry_at < now)
            .cloned()
            .collect();
        found.sort_by_key(|o| o.value.expiry_at);
        Ok(found)
    }

    async fn participation_records(
        &self,
        user_id: &UserId,
    ) -> StoreResult<Vec<ParticipationRecord>> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(state
            .records
            .iter()
            .filter(|r| &r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn participation_count(&self, product_id: &ProductId) -> StoreResult<u32> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(state.counters.get(product_id).copied().unwrap_or(0))
    }

    async fn commit(&self, unit: UnitOfWork) -> StoreResult<u64> {
        self.ensure_available()?;
        let mut state = self.state.write().await;

        let id = unit.opportunity.id;
        let product_id = unit.opportunity.product_id.clone();

        // Preconditions first; nothing is written unless all hold
        let next_version = match unit.expected_version {
            ExpectedVersion::New => {
                if let Some(existing) = state.opportunities.get(&id) {
                    return Err(StoreError::VersionConflict {
                        opportunity_id: id,
                        expected: 0,
                        actual: existing.version,
                    });
                }
                let active_exists = state
                    .opportunities
                    .values()
                    .any(|o| o.value.product_id == product_id && o.value.is_active());
                if active_exists && unit.opportunity.is_active() {
                    return Err(StoreError::ActiveOpportunityExists(product_id));
                }
                1
            }
            ExpectedVersion::Exactly(expected) => {
                let actual = state.opportunities.get(&id).map_or(0, |o| o.version);
                if actual != expected {
                    return Err(StoreError::VersionConflict {
                        opportunity_id: id,
                        expected,
                        actual,
                    });
                }
                expected + 1
            }
        };

        state.opportunities.insert(
            id,
            Versioned {
                value: unit.opportunity,
                version: next_version,
            },
        );
        state
            .counters
            .insert(product_id.clone(), unit.participation_count);

        for change in unit.records {
            match change {
                RecordChange::Append(record) => {
                    let exists = state.records.iter().any(|r| {
                        r.user_id == record.user_id && r.opportunity_id == record.opportunity_id
                    });
                    if !exists {
                        state.records.push(record);
                    }
                }
                RecordChange::SetStatus {
                    user_id,
                    opportunity_id,
                    status,
                    at,
                } => {
                    if let Some(record) = state
                        .records
                        .iter_mut()
                        .find(|r| r.user_id == user_id && r.opportunity_id == opportunity_id)
                    {
                        record.status = status;
                        record.updated_at = at;
                    }
                }
            }
        }

        debug!(
            opportunity_id = %id,
            product_id = %product_id,
            version = next_version,
            "Committed opportunity unit of work"
        );

        Ok(next_version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carbon;
    use crate::domain::{OpportunityStatus, Participant};
    use chrono::Duration;

    fn opportunity(product: &str, user: &str) -> Opportunity {
        let now = Utc::now();
        Opportunity {
            id: OpportunityId::new(),
            product_id: ProductId::new(product),
            product_name: "Glass Jar".to_string(),
            initiator_id: UserId::new(user),
            threshold: 3,
            discount_percent: 10.0,
            carbon_saving_percent: 15.0,
            max_participants: None,
            created_at: now,
            expiry_at: now + Duration::days(7),
            participants: vec![Participant {
                user_id: UserId::new(user),
                joined_at: now,
            }],
            status: OpportunityStatus::Active,
            completed_at: None,
            updated_at: now,
        }
    }

    fn record(opp: &Opportunity, user: &str) -> ParticipationRecord {
        ParticipationRecord {
            user_id: UserId::new(user),
            opportunity_id: opp.id,
            product_id: opp.product_id.clone(),
            status: OpportunityStatus::Active,
            joined_at: opp.created_at,
            potential_carbon_saving: carbon::estimate(Some(10.0), 1, 15.0),
            updated_at: opp.created_at,
        }
    }

    #[test]
    fn test_insert_and_cas_update() {
        tokio_test::block_on(async {
            let store = InMemoryStore::new();
            let opp = opportunity("p-1", "alice");

            let unit = UnitOfWork::for_opportunity(opp.clone(), ExpectedVersion::New)
                .with_record(RecordChange::Append(record(&opp, "alice")));
            assert_eq!(store.commit(unit).await.unwrap(), 1);
            assert_eq!(store.participation_count(&opp.product_id).await.unwrap(), 1);

            // Stale writer loses
            let stale = UnitOfWork::for_opportunity(opp.clone(), ExpectedVersion::Exactly(0));
            let err = store.commit(stale).await.unwrap_err();
            assert!(err.is_conflict());

            let fresh = UnitOfWork::for_opportunity(opp.clone(), ExpectedVersion::Exactly(1));
            assert_eq!(store.commit(fresh).await.unwrap(), 2);
            assert_eq!(store.load(opp.id).await.unwrap().unwrap().version, 2);
        });
    }

    #[test]
    fn test_one_active_opportunity_per_product() {
        tokio_test::block_on(async {
            let store = InMemoryStore::new();
            let first = opportunity("p-1", "alice");
            let second = opportunity("p-1", "bob");

            store
                .commit(UnitOfWork::for_opportunity(first, ExpectedVersion::New))
                .await
                .unwrap();
            let err = store
                .commit(UnitOfWork::for_opportunity(second, ExpectedVersion::New))
                .await
                .unwrap_err();
            assert_eq!(err, StoreError::ActiveOpportunityExists(ProductId::new("p-1")));
        });
    }

    #[test]
    fn test_append_is_idempotent_and_status_updates() {
        tokio_test::block_on(async {
            let store = InMemoryStore::new();
            let opp = opportunity("p-1", "alice");
            let unit = UnitOfWork::for_opportunity(opp.clone(), ExpectedVersion::New)
                .with_record(RecordChange::Append(record(&opp, "alice")))
                .with_record(RecordChange::Append(record(&opp, "alice")));
            store.commit(unit).await.unwrap();

            let mut expired = opp.clone();
            expired.status = OpportunityStatus::Expired;
            let later = opp.expiry_at + Duration::days(1);
            let unit = UnitOfWork::for_opportunity(expired, ExpectedVersion::Exactly(1))
                .with_record(RecordChange::SetStatus {
                    user_id: UserId::new("alice"),
                    opportunity_id: opp.id,
                    status: OpportunityStatus::Expired,
                    at: later,
                });
            store.commit(unit).await.unwrap();

            let records = store
                .participation_records(&UserId::new("alice"))
                .await
                .unwrap();
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].status, OpportunityStatus::Expired);
            assert_eq!(records[0].updated_at, later);
            assert_eq!(store.participation_count(&opp.product_id).await.unwrap(), 0);
            assert!(store
                .find_active_for_product(&opp.product_id)
                .await
                .unwrap()
                .is_empty());
        });
    }

    #[test]
    fn test_unavailable_store_writes_nothing() {
        tokio_test::block_on(async {
            let store = InMemoryStore::new();
            let opp = opportunity("p-1", "alice");
            store.set_unavailable(true);

            let err = store
                .commit(UnitOfWork::for_opportunity(opp.clone(), ExpectedVersion::New))
                .await
                .unwrap_err();
            assert!(matches!(err, StoreError::Unavailable(_)));

            store.set_unavailable(false);
            assert!(store.load(opp.id).await.unwrap().is_none());
        });
    }

    #[test]
    fn test_closed_user_directory() {
        tokio_test::block_on(async {
            let store = InMemoryStore::with_registered_users([UserId::new("alice")]);
            assert!(store.user_exists(&UserId::new("alice")).await.unwrap());
            assert!(!store.user_exists(&UserId::new("mallory")).await.unwrap());

            store.register_user(UserId::new("mallory")).await;
            assert!(store.user_exists(&UserId::new("mallory")).await.unwrap());

            let open = InMemoryStore::new();
            assert!(open.user_exists(&UserId::new("anyone")).await.unwrap());
        });
    }
}
