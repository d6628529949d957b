// Copyright (c) 2025 - Cowboy AI, Inc.
//! Expiry Sweep Triggers
//!
//! Two ways to drive [`GroupBuyService::sweep_expired`]:
//!
//! - [`SweepRunner`] - a background task on a fixed interval, stopped through
//!   a `watch` channel
//! - [`SweepTriggerHandler`] - on-demand sweeps from `groupbuy.sweep.trigger`
//!
//! Both may run at the same time as each other and as joins; the sweep is
//! idempotent per opportunity.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::errors::StoreResult;
use crate::nats::MessageHandler;
use crate::service::{GroupBuyService, ServiceReply};
use crate::subjects;

/// Periodic sweep loop
pub struct SweepRunner<S: ?Sized> {
    service: Arc<S>,
    interval: Duration,
}

impl<S: GroupBuyService + ?Sized + 'static> SweepRunner<S> {
    pub fn new(service: Arc<S>, interval: Duration) -> Self {
        Self { service, interval }
    }

    /// Run one sweep now, logging the outcome
    pub async fn tick(&self) {
        match self.service.sweep_expired().await {
            Ok(report) if report.is_clean() => {
                if report.reconciled() > 0 {
                    info!(reconciled = report.reconciled(), "Periodic sweep expired opportunities");
                }
            }
            Ok(report) => warn!(
                reconciled = report.reconciled(),
                failures = report.failures.len(),
                "Periodic sweep left opportunities for the next run"
            ),
            Err(e) => error!(error = %e, "Periodic sweep failed"),
        }
    }

    /// Spawn the loop; the first sweep runs immediately
    ///
    /// The task ends when `shutdown` turns `true` or its sender is dropped.
    pub fn spawn(self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            info!(interval_secs = self.interval.as_secs(), "Expiry sweeper started");
            loop {
                tokio::select! {
                    _ = ticker.tick() => self.tick().await,
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }
            info!("Expiry sweeper stopped");
        })
    }
}

/// Runs a sweep for every message on `groupbuy.sweep.trigger`
///
/// Replies with the [`crate::service::SweepReport`] when the trigger was a
/// request.
pub struct SweepTriggerHandler<S: ?Sized> {
    service: Arc<S>,
}

impl<S: GroupBuyService + ?Sized> SweepTriggerHandler<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self { service }
    }
}

#[async_trait::async_trait]
impl<S: GroupBuyService + ?Sized + 'static> MessageHandler for SweepTriggerHandler<S> {
    type Message = serde_json::Value;

    async fn handle(&self, _message: serde_json::Value) -> StoreResult<Option<serde_json::Value>> {
        let result = self.service.sweep_expired().await;
        if let Err(e) = &result {
            error!(error = %e, "Triggered sweep failed");
        }
        ServiceReply::from(result).to_json().map(Some)
    }

    fn subject(&self) -> String {
        subjects::sweep_trigger()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::EngineConfig;
    use crate::domain::{OpportunityStatus, Product, ProductId, UserId};
    use crate::notification::InMemoryNotificationSink;
    use crate::service::GroupBuyCoordinator;
    use crate::store::InMemoryStore;
    use chrono::{TimeZone, Utc};

    async fn service(clock: Arc<ManualClock>) -> Arc<GroupBuyCoordinator> {
        let store = Arc::new(InMemoryStore::new());
        store
            .upsert_product(Product::with_group_buying("p-1", "Tote").expiry_days(7))
            .await;
        Arc::new(
            GroupBuyCoordinator::new(
                store.clone(),
                store.clone(),
                store,
                Arc::new(InMemoryNotificationSink::new()),
                &EngineConfig::default(),
            )
            .with_clock(clock),
        )
    }

    #[tokio::test]
    async fn test_trigger_replies_with_report() {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 1, 19, 12, 0, 0).unwrap(),
        ));
        let service = service(clock.clone()).await;
        let opp = service
            .create_or_join(&ProductId::new("p-1"), &UserId::new("alice"))
            .await
            .unwrap();
        clock.advance(chrono::Duration::days(8));

        let handler = SweepTriggerHandler::new(service.clone());
        let reply = handler.handle(serde_json::Value::Null).await.unwrap().unwrap();
        assert_eq!(reply["outcome"], "ok");
        assert_eq!(reply["data"]["expired"].as_array().map(Vec::len), Some(1));

        let opp = service.get_opportunity(opp.id).await.unwrap();
        assert_eq!(opp.status, OpportunityStatus::Expired);
        assert_eq!(handler.subject(), "groupbuy.sweep.trigger");
    }

    #[tokio::test(start_paused = true)]
    async fn test_runner_sweeps_until_shutdown() {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 1, 19, 12, 0, 0).unwrap(),
        ));
        let service = service(clock.clone()).await;
        let opp = service
            .create_or_join(&ProductId::new("p-1"), &UserId::new("alice"))
            .await
            .unwrap();
        clock.advance(chrono::Duration::days(8));

        let (tx, rx) = watch::channel(false);
        let task = SweepRunner::new(service.clone(), Duration::from_secs(3600)).spawn(rx);

        tokio::time::sleep(Duration::from_secs(1)).await;
        let opp = service.get_opportunity(opp.id).await.unwrap();
        assert_eq!(opp.status, OpportunityStatus::Expired);

        tx.send(true).unwrap();
        task.await.unwrap();
    }
}
