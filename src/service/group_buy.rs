// Copyright (c) 2025 - Cowboy AI, Inc.
//! Group Buying Service Layer
//!
//! [`GroupBuyCoordinator`] is the Membership Coordinator and the Expiry
//! Sweeper. Every write follows the same transaction:
//!
//! 1. Read the clock once
//! 2. Load the opportunity with its version
//! 3. Decide with a pure handler ([`crate::aggregate::handlers`])
//! 4. Fold the events and commit a [`UnitOfWork`] (compare-and-set on the version)
//! 5. On a lost compare-and-set, go back to 2, at most `max_commit_attempts` times
//! 6. After a completing commit, notify every participant once
//!
//! Business-rule rejections leave the loop immediately and are never retried.
//! Because the threshold decision is made on the loaded version, only the
//! commit that wins the race can complete an opportunity, so notifications
//! fire exactly once.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::aggregate::commands::*;
use crate::aggregate::handlers::*;
use crate::aggregate::{apply_events, replay};
use crate::carbon::CarbonPolicy;
use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::domain::invariants::ValidationError;
use crate::domain::{
    Opportunity, OpportunityId, OpportunityStatus, ParticipationRecord, Product, ProductId, UserId,
};
use crate::errors::StoreError;
use crate::events::OpportunityEvent;
use crate::notification::{Notification, NotificationSink};
use crate::store::{
    ExpectedVersion, OpportunityStore, ProductCatalog, RecordChange, UnitOfWork, UserDirectory,
    Versioned,
};

/// Service layer result type
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Which referenced entity was missing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "entity", content = "id", rename_all = "snake_case")]
pub enum NotFoundKind {
    Opportunity(OpportunityId),
    Product(ProductId),
    User(UserId),
}

impl std::fmt::Display for NotFoundKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotFoundKind::Opportunity(id) => write!(f, "opportunity {id}"),
            NotFoundKind::Product(id) => write!(f, "product {id}"),
            NotFoundKind::User(id) => write!(f, "user {id}"),
        }
    }
}

/// Errors returned to callers of [`GroupBuyService`]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServiceError {
    /// Product does not offer group buying
    #[error("Group buying is disabled for product {0}")]
    FeatureDisabled(ProductId),

    /// Product policy cannot seed an opportunity
    #[error("Product {product_id} has an invalid group buying policy: {reason}")]
    InvalidProduct {
        product_id: ProductId,
        reason: ValidationError,
    },

    /// Referenced entity missing
    #[error("Not found: {0}")]
    NotFound(NotFoundKind),

    /// Operation attempted against a non-active opportunity
    #[error("Opportunity is {0}")]
    InvalidState(OpportunityStatus),

    /// Opportunity expired (possibly discovered by this call)
    #[error("Opportunity {0} has expired")]
    Expired(OpportunityId),

    /// Participant cap reached
    #[error("Opportunity {opportunity_id} is full ({cap} participants)")]
    CapacityReached {
        opportunity_id: OpportunityId,
        cap: u32,
    },

    /// Transient store failure
    #[error("Store unavailable: {0}")]
    StoreUnavailable(StoreError),

    /// Compare-and-set lost on every attempt
    #[error("Gave up after {attempts} conflicting commit attempts")]
    Contention { attempts: u32 },
}

impl ServiceError {
    /// Transient failure the caller may retry; business-rule errors are final
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ServiceError::StoreUnavailable(_) | ServiceError::Contention { .. }
        )
    }

    /// Stable machine-readable name
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::FeatureDisabled(_) => "feature_disabled",
            ServiceError::InvalidProduct { .. } => "invalid_product",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::InvalidState(_) => "invalid_state",
            ServiceError::Expired(_) => "expired",
            ServiceError::CapacityReached { .. } => "capacity_reached",
            ServiceError::StoreUnavailable(_) => "store_unavailable",
            ServiceError::Contention { .. } => "contention",
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        ServiceError::StoreUnavailable(err)
    }
}

/// One opportunity the sweep could not reconcile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepFailure {
    pub opportunity_id: OpportunityId,
    pub error: String,
    pub retryable: bool,
}

/// Outcome of one expiry sweep
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Opportunities this sweep moved to `Expired`
    pub expired: Vec<OpportunityId>,
    /// Opportunities left for the next sweep
    pub failures: Vec<SweepFailure>,
}

impl SweepReport {
    /// Number of opportunities reconciled
    pub fn reconciled(&self) -> usize {
        self.expired.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Group buying operations exposed to request handlers
#[async_trait]
pub trait GroupBuyService: Send + Sync {
    /// Join the product's open opportunity, or open one with the user as
    /// initiator when none is open
    async fn create_or_join(
        &self,
        product_id: &ProductId,
        user_id: &UserId,
    ) -> ServiceResult<Opportunity>;

    /// Join a specific opportunity
    ///
    /// The opportunity is looked up before the user, so an unknown
    /// opportunity reports `NotFound(Opportunity)` first. An unknown user
    /// gets `NotFound(User)` without the lazy expiry a known user's join
    /// would apply; a stale opportunity then waits for the sweep.
    async fn join(
        &self,
        opportunity_id: OpportunityId,
        user_id: &UserId,
    ) -> ServiceResult<Opportunity>;

    /// Opportunities of the product that are active and inside their window
    async fn get_active_for_product(
        &self,
        product_id: &ProductId,
    ) -> ServiceResult<Vec<Opportunity>>;

    /// Opportunities the user joined, in join order
    async fn get_for_user(&self, user_id: &UserId) -> ServiceResult<Vec<Opportunity>>;

    async fn get_opportunity(&self, opportunity_id: OpportunityId) -> ServiceResult<Opportunity>;

    /// The user's participation records, in join order
    async fn participation_history(
        &self,
        user_id: &UserId,
    ) -> ServiceResult<Vec<ParticipationRecord>>;

    /// Current value of the product's participation counter
    async fn product_participation_count(&self, product_id: &ProductId) -> ServiceResult<u32>;

    /// Administrative cancellation of an active opportunity
    async fn cancel(
        &self,
        opportunity_id: OpportunityId,
        reason: String,
    ) -> ServiceResult<Opportunity>;

    /// Expire every active opportunity whose window has passed
    async fn sweep_expired(&self) -> ServiceResult<SweepReport>;
}

/// Outcome of one optimistic attempt
enum Attempt<T> {
    Done(T),
    Conflict,
}

/// Membership Coordinator and Expiry Sweeper over injected collaborators
pub struct GroupBuyCoordinator {
    catalog: Arc<dyn ProductCatalog>,
    users: Arc<dyn UserDirectory>,
    store: Arc<dyn OpportunityStore>,
    notifier: Arc<dyn NotificationSink>,
    clock: Arc<dyn Clock>,
    carbon: CarbonPolicy,
    max_commit_attempts: u32,
}

impl GroupBuyCoordinator {
    /// Coordinator on the system clock
    pub fn new(
        catalog: Arc<dyn ProductCatalog>,
        users: Arc<dyn UserDirectory>,
        store: Arc<dyn OpportunityStore>,
        notifier: Arc<dyn NotificationSink>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            catalog,
            users,
            store,
            notifier,
            clock: Arc::new(SystemClock),
            carbon: CarbonPolicy::default().with_fallback_baseline(config.fallback_baseline_kg),
            max_commit_attempts: config.max_commit_attempts.max(1),
        }
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Run `attempt` until it stops conflicting
    async fn retrying<T, F, Fut>(&self, operation: &'static str, mut attempt: F) -> ServiceResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ServiceResult<Attempt<T>>>,
    {
        for n in 1..=self.max_commit_attempts {
            match attempt().await? {
                Attempt::Done(value) => return Ok(value),
                Attempt::Conflict => {
                    debug!(operation, attempt = n, "Commit conflict, reloading");
                }
            }
        }
        warn!(
            operation,
            attempts = self.max_commit_attempts,
            "Giving up after repeated commit conflicts"
        );
        Err(ServiceError::Contention {
            attempts: self.max_commit_attempts,
        })
    }

    /// Commit; `None` when a concurrent writer won
    async fn commit(&self, unit: UnitOfWork) -> ServiceResult<Option<u64>> {
        let opportunity_id = unit.opportunity.id;
        match self.store.commit(unit).await {
            Ok(version) => Ok(Some(version)),
            Err(e) if e.is_conflict() => {
                debug!(opportunity_id = %opportunity_id, error = %e, "Lost compare-and-set");
                Ok(None)
            }
            Err(e) => {
                error!(opportunity_id = %opportunity_id, error = %e, "Commit failed");
                Err(ServiceError::StoreUnavailable(e))
            }
        }
    }

    async fn load(&self, opportunity_id: OpportunityId) -> ServiceResult<Versioned<Opportunity>> {
        self.store
            .load(opportunity_id)
            .await?
            .ok_or(ServiceError::NotFound(NotFoundKind::Opportunity(
                opportunity_id,
            )))
    }

    async fn ensure_user(&self, user_id: &UserId) -> ServiceResult<()> {
        if self.users.user_exists(user_id).await? {
            Ok(())
        } else {
            Err(ServiceError::NotFound(NotFoundKind::User(user_id.clone())))
        }
    }

    /// Catalog baseline of the product behind an opportunity
    async fn baseline_for(&self, product_id: &ProductId) -> ServiceResult<Option<f64>> {
        let product = self.catalog.get_product(product_id).await?;
        if product.is_none() {
            debug!(product_id = %product_id, "Product left the catalog, using fallback baseline");
        }
        Ok(product.and_then(|p| p.baseline_carbon_footprint))
    }

    fn participation_record(
        &self,
        opportunity: &Opportunity,
        user_id: &UserId,
        baseline: Option<f64>,
        now: DateTime<Utc>,
    ) -> ParticipationRecord {
        ParticipationRecord {
            user_id: user_id.clone(),
            opportunity_id: opportunity.id,
            product_id: opportunity.product_id.clone(),
            status: opportunity.status,
            joined_at: now,
            potential_carbon_saving: self.carbon.estimate(
                baseline,
                opportunity.participant_count(),
                opportunity.carbon_saving_percent,
            ),
            updated_at: now,
        }
    }

    /// Unit moving an opportunity out of `Active` together with every
    /// participant's record and the product counter
    fn closing_unit(
        loaded: &Versioned<Opportunity>,
        events: &[OpportunityEvent],
        now: DateTime<Utc>,
    ) -> UnitOfWork {
        let closed = apply_events(loaded.value.clone(), events);
        let status = closed.status;
        let changes: Vec<RecordChange> = closed
            .participant_ids()
            .map(|user_id| RecordChange::SetStatus {
                user_id: user_id.clone(),
                opportunity_id: closed.id,
                status,
                at: now,
            })
            .collect();
        UnitOfWork::for_opportunity(closed, ExpectedVersion::Exactly(loaded.version))
            .with_records(changes)
    }

    /// Expire `loaded` if it is active and past expiry
    ///
    /// `Done(true)` when this call expired it, `Done(false)` when there was
    /// nothing to do.
    async fn try_expire(
        &self,
        loaded: &Versioned<Opportunity>,
        now: DateTime<Utc>,
    ) -> ServiceResult<Attempt<bool>> {
        let opportunity = &loaded.value;
        if !opportunity.is_active() || !opportunity.is_past_expiry(now) {
            return Ok(Attempt::Done(false));
        }

        let events = handle_expire(
            opportunity,
            ExpireOpportunityCommand {
                timestamp: now,
                correlation_id: Uuid::now_v7(),
            },
        )
        .map_err(|e| reject(e, opportunity))?;

        let unit = Self::closing_unit(loaded, &events, now);
        match self.commit(unit).await? {
            Some(_) => {
                info!(
                    opportunity_id = %opportunity.id,
                    product_id = %opportunity.product_id,
                    participants = opportunity.participant_count(),
                    transition = "active -> expired",
                    "Opportunity expired"
                );
                Ok(Attempt::Done(true))
            }
            None => Ok(Attempt::Conflict),
        }
    }

    /// One attempt at joining the loaded opportunity
    async fn try_join(
        &self,
        loaded: Versioned<Opportunity>,
        user_id: &UserId,
        baseline: Option<f64>,
        now: DateTime<Utc>,
    ) -> ServiceResult<Attempt<Opportunity>> {
        let decision = handle_join(
            &loaded.value,
            JoinOpportunityCommand {
                user_id: user_id.clone(),
                timestamp: now,
                correlation_id: Uuid::now_v7(),
            },
        )
        .map_err(|e| reject(e, &loaded.value))?;

        match decision {
            JoinDecision::AlreadyJoined => {
                debug!(
                    opportunity_id = %loaded.value.id,
                    user_id = %user_id,
                    "User already participates"
                );
                Ok(Attempt::Done(loaded.value))
            }

            JoinDecision::ExpireInstead(events) => {
                let unit = Self::closing_unit(&loaded, &events, now);
                match self.commit(unit).await? {
                    Some(_) => {
                        info!(
                            opportunity_id = %loaded.value.id,
                            product_id = %loaded.value.product_id,
                            user_id = %user_id,
                            transition = "active -> expired",
                            "Join found opportunity past expiry"
                        );
                        Err(ServiceError::Expired(loaded.value.id))
                    }
                    None => Ok(Attempt::Conflict),
                }
            }

            JoinDecision::Join { events, output } => {
                debug!(
                    opportunity_id = %loaded.value.id,
                    user_id = %user_id,
                    version = loaded.version,
                    events = ?events.iter().map(OpportunityEvent::event_type_name).collect::<Vec<_>>(),
                    "Join decided"
                );
                let updated = apply_events(loaded.value.clone(), &events);
                let record = self.participation_record(&updated, user_id, baseline, now);

                let mut unit = UnitOfWork::for_opportunity(
                    updated.clone(),
                    ExpectedVersion::Exactly(loaded.version),
                )
                .with_record(RecordChange::Append(record));
                if output.closes_opportunity {
                    unit = unit.with_records(
                        updated
                            .participant_ids()
                            .filter(|id| *id != user_id)
                            .map(|id| RecordChange::SetStatus {
                                user_id: id.clone(),
                                opportunity_id: updated.id,
                                status: updated.status,
                                at: now,
                            }),
                    );
                }

                if self.commit(unit).await?.is_none() {
                    return Ok(Attempt::Conflict);
                }

                info!(
                    opportunity_id = %updated.id,
                    product_id = %updated.product_id,
                    user_id = %user_id,
                    participants = updated.participant_count(),
                    threshold = updated.threshold,
                    "Participant joined"
                );

                if output.notify_participants {
                    info!(
                        opportunity_id = %updated.id,
                        product_id = %updated.product_id,
                        participants = updated.participant_count(),
                        transition = "active -> completed",
                        "Threshold reached"
                    );
                    self.notify_participants(&updated).await;
                }

                Ok(Attempt::Done(updated))
            }
        }
    }

    /// One attempt at create-or-join for `product`
    async fn try_create_or_join(
        &self,
        product: &Product,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> ServiceResult<Attempt<Opportunity>> {
        let active = self.store.find_active_for_product(&product.id).await?;

        // Reconcile stale ones so the product can open a fresh opportunity
        for stale in active.iter().filter(|o| o.value.is_past_expiry(now)) {
            if let Attempt::Conflict = self.try_expire(stale, now).await? {
                return Ok(Attempt::Conflict);
            }
        }

        if let Some(open) = active.into_iter().find(|o| o.value.is_open_at(now)) {
            return self
                .try_join(open, user_id, product.baseline_carbon_footprint, now)
                .await;
        }

        let events = handle_create_opportunity(CreateOpportunityCommand {
            opportunity_id: OpportunityId::new(),
            product: product.clone(),
            initiator_id: user_id.clone(),
            timestamp: now,
            correlation_id: Uuid::now_v7(),
        })
        .map_err(|e| match e {
            CommandError::InvalidPolicy(reason) => ServiceError::InvalidProduct {
                product_id: product.id.clone(),
                reason,
            },
            _ => ServiceError::FeatureDisabled(product.id.clone()),
        })?;

        let opportunity = replay(&events).ok_or_else(|| {
            StoreError::Serialization("event stream does not open an opportunity".to_string())
        })?;
        let record =
            self.participation_record(&opportunity, user_id, product.baseline_carbon_footprint, now);
        let unit = UnitOfWork::for_opportunity(opportunity.clone(), ExpectedVersion::New)
            .with_record(RecordChange::Append(record));

        if self.commit(unit).await?.is_none() {
            return Ok(Attempt::Conflict);
        }

        info!(
            opportunity_id = %opportunity.id,
            product_id = %opportunity.product_id,
            user_id = %user_id,
            threshold = opportunity.threshold,
            expiry_at = %opportunity.expiry_at,
            "Opportunity created"
        );
        Ok(Attempt::Done(opportunity))
    }

    /// One notification per participant, delivered concurrently; failures
    /// are logged only
    async fn notify_participants(&self, opportunity: &Opportunity) {
        let deliveries = opportunity.participant_ids().map(|user_id| async move {
            let notification = Notification::threshold_reached(opportunity, user_id.clone());
            if let Err(e) = self.notifier.notify(notification).await {
                warn!(
                    opportunity_id = %opportunity.id,
                    user_id = %user_id,
                    error = %e,
                    "Notification delivery failed"
                );
            }
        });
        join_all(deliveries).await;
    }
}

/// Translate a handler rejection into the caller-facing taxonomy
fn reject(err: CommandError, opportunity: &Opportunity) -> ServiceError {
    match err {
        CommandError::FeatureDisabled => {
            ServiceError::FeatureDisabled(opportunity.product_id.clone())
        }
        CommandError::InvalidPolicy(reason) => ServiceError::InvalidProduct {
            product_id: opportunity.product_id.clone(),
            reason,
        },
        CommandError::AlreadyExpired => ServiceError::Expired(opportunity.id),
        CommandError::NotActive(status) => ServiceError::InvalidState(status),
        CommandError::CapacityReached { cap } => ServiceError::CapacityReached {
            opportunity_id: opportunity.id,
            cap,
        },
        CommandError::NotYetExpired { .. } | CommandError::Transition(_) => {
            ServiceError::InvalidState(opportunity.status)
        }
    }
}

#[async_trait]
impl GroupBuyService for GroupBuyCoordinator {
    #[instrument(
        skip(self, product_id, user_id),
        fields(product_id = %product_id, user_id = %user_id)
    )]
    async fn create_or_join(
        &self,
        product_id: &ProductId,
        user_id: &UserId,
    ) -> ServiceResult<Opportunity> {
        let now = self.clock.now();

        let product = self
            .catalog
            .get_product(product_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(NotFoundKind::Product(product_id.clone())))?;
        if !product.group_buying_enabled {
            return Err(ServiceError::FeatureDisabled(product_id.clone()));
        }
        self.ensure_user(user_id).await?;

        self.retrying("create_or_join", || {
            self.try_create_or_join(&product, user_id, now)
        })
        .await
    }

    #[instrument(
        skip(self, opportunity_id, user_id),
        fields(opportunity_id = %opportunity_id, user_id = %user_id)
    )]
    async fn join(
        &self,
        opportunity_id: OpportunityId,
        user_id: &UserId,
    ) -> ServiceResult<Opportunity> {
        let now = self.clock.now();

        let first = self.load(opportunity_id).await?;
        self.ensure_user(user_id).await?;
        let baseline = self.baseline_for(&first.value.product_id).await?;

        let mut preloaded = Some(first);
        self.retrying("join", || {
            let preloaded = preloaded.take();
            async move {
                let loaded = match preloaded {
                    Some(loaded) => loaded,
                    None => self.load(opportunity_id).await?,
                };
                self.try_join(loaded, user_id, baseline, now).await
            }
        })
        .await
    }

    async fn get_active_for_product(
        &self,
        product_id: &ProductId,
    ) -> ServiceResult<Vec<Opportunity>> {
        let now = self.clock.now();
        Ok(self
            .store
            .find_active_for_product(product_id)
            .await?
            .into_iter()
            .map(|o| o.value)
            .filter(|o| o.is_open_at(now))
            .collect())
    }

    async fn get_for_user(&self, user_id: &UserId) -> ServiceResult<Vec<Opportunity>> {
        let records = self.store.participation_records(user_id).await?;
        let mut opportunities = Vec::with_capacity(records.len());
        for record in records {
            match self.store.load(record.opportunity_id).await? {
                Some(loaded) => opportunities.push(loaded.value),
                None => warn!(
                    opportunity_id = %record.opportunity_id,
                    user_id = %user_id,
                    "Participation record references a missing opportunity"
                ),
            }
        }
        Ok(opportunities)
    }

    async fn get_opportunity(&self, opportunity_id: OpportunityId) -> ServiceResult<Opportunity> {
        Ok(self.load(opportunity_id).await?.value)
    }

    async fn participation_history(
        &self,
        user_id: &UserId,
    ) -> ServiceResult<Vec<ParticipationRecord>> {
        Ok(self.store.participation_records(user_id).await?)
    }

    async fn product_participation_count(&self, product_id: &ProductId) -> ServiceResult<u32> {
        Ok(self.store.participation_count(product_id).await?)
    }

    #[instrument(skip(self, opportunity_id, reason), fields(opportunity_id = %opportunity_id))]
    async fn cancel(
        &self,
        opportunity_id: OpportunityId,
        reason: String,
    ) -> ServiceResult<Opportunity> {
        let now = self.clock.now();

        self.retrying("cancel", || {
            let reason = reason.clone();
            async move {
                let loaded = self.load(opportunity_id).await?;
                let events = handle_cancel(
                    &loaded.value,
                    CancelOpportunityCommand {
                        reason: reason.clone(),
                        timestamp: now,
                        correlation_id: Uuid::now_v7(),
                    },
                )
                .map_err(|e| reject(e, &loaded.value))?;

                let unit = Self::closing_unit(&loaded, &events, now);
                let cancelled = unit.opportunity.clone();
                if self.commit(unit).await?.is_none() {
                    return Ok(Attempt::Conflict);
                }

                info!(
                    opportunity_id = %cancelled.id,
                    product_id = %cancelled.product_id,
                    reason = %reason,
                    transition = "active -> cancelled",
                    "Opportunity cancelled"
                );
                Ok(Attempt::Done(cancelled))
            }
        })
        .await
    }

    #[instrument(skip(self))]
    async fn sweep_expired(&self) -> ServiceResult<SweepReport> {
        let now = self.clock.now();
        let candidates = self.store.find_expired_active(now).await?;
        let mut report = SweepReport::default();

        for candidate in candidates {
            let opportunity_id = candidate.value.id;
            let mut preloaded = Some(candidate);

            let outcome = self
                .retrying("sweep_expired", || {
                    let preloaded = preloaded.take();
                    async move {
                        let loaded = match preloaded {
                            Some(loaded) => loaded,
                            None => self.load(opportunity_id).await?,
                        };
                        self.try_expire(&loaded, now).await
                    }
                })
                .await;

            match outcome {
                Ok(true) => report.expired.push(opportunity_id),
                Ok(false) => {
                    debug!(opportunity_id = %opportunity_id, "Already reconciled elsewhere");
                }
                Err(e) => {
                    error!(
                        opportunity_id = %opportunity_id,
                        error = %e,
                        transition = "active -> expired",
                        "Failed to expire opportunity"
                    );
                    report.failures.push(SweepFailure {
                        opportunity_id,
                        retryable: e.is_retryable(),
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            reconciled = report.reconciled(),
            failures = report.failures.len(),
            "Expiry sweep finished"
        );
        Ok(report)
    }
}
