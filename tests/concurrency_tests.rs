// Copyright (c) 2025 - Cowboy AI, Inc.
//! Concurrency tests for the group buying coordinator
//!
//! Many tasks race on one opportunity on a multi-threaded runtime. Whatever
//! the interleaving, the opportunity completes exactly once, no successful
//! join is lost and notifications fire once per participant.

mod fixtures;

use chrono::Duration;
use futures::future::join_all;
use std::collections::HashSet;

use fixtures::*;
use group_buy_engine::clock::Clock;
use group_buy_engine::domain::{OpportunityStatus, Product};
use group_buy_engine::service::{GroupBuyService, ServiceError};

fn product(threshold: u32) -> Product {
    Product::with_group_buying("prod-race", "Bulk Oat Flour").threshold(threshold)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_racing_joins_up_to_threshold_all_land() {
    const RACERS: u32 = 24;
    // Initiator + racers reach the threshold together
    let h = Harness::for_racers([product(RACERS + 1)], RACERS).await;
    let pid = product_id("prod-race");

    let opp = h.service.create_or_join(&pid, &user("initiator")).await.unwrap();

    let tasks = (0..RACERS).map(|i| {
        let service = h.service.clone();
        tokio::spawn(async move { service.join(opp.id, &user(&format!("racer-{i}"))).await })
    });
    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.expect("task panicked"))
        .collect();

    assert!(results.iter().all(Result::is_ok), "{results:?}");
    let completing = results
        .iter()
        .filter_map(|r| r.as_ref().ok())
        .filter(|o| o.status == OpportunityStatus::Completed)
        .count();
    assert_eq!(completing, 1);

    let stored = h.service.get_opportunity(opp.id).await.unwrap();
    assert_eq!(stored.status, OpportunityStatus::Completed);
    assert_eq!(stored.participant_count(), RACERS + 1);
    let unique: HashSet<_> = stored.participant_ids().collect();
    assert_eq!(unique.len(), stored.participants.len());

    let delivered = h.sink.delivered().await;
    assert_eq!(delivered.len() as u32, RACERS + 1);
    let notified: HashSet<_> = delivered.iter().map(|n| n.user_id.clone()).collect();
    assert_eq!(notified.len() as u32, RACERS + 1);

    assert_eq!(h.service.product_participation_count(&pid).await.unwrap(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_racing_past_threshold_completes_exactly_once() {
    const RACERS: u32 = 24;
    const THRESHOLD: u32 = 5;
    let h = Harness::for_racers([product(THRESHOLD)], RACERS).await;
    let pid = product_id("prod-race");

    let opp = h.service.create_or_join(&pid, &user("initiator")).await.unwrap();

    let tasks = (0..RACERS).map(|i| {
        let service = h.service.clone();
        tokio::spawn(async move { service.join(opp.id, &user(&format!("racer-{i}"))).await })
    });
    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.expect("task panicked"))
        .collect();

    let admitted = results.iter().filter(|r| r.is_ok()).count() as u32;
    let too_late = results
        .iter()
        .filter(|r| **r == Err(ServiceError::InvalidState(OpportunityStatus::Completed)))
        .count() as u32;
    assert_eq!(admitted, THRESHOLD - 1);
    assert_eq!(admitted + too_late, RACERS);

    let stored = h.service.get_opportunity(opp.id).await.unwrap();
    assert_eq!(stored.status, OpportunityStatus::Completed);
    assert_eq!(stored.participant_count(), THRESHOLD);
    assert_eq!(h.sink.delivered().await.len() as u32, THRESHOLD);

    // The single completing result carries the stored completion instant
    let completing: Vec<_> = results
        .iter()
        .filter_map(|r| r.as_ref().ok())
        .filter(|o| o.status == OpportunityStatus::Completed)
        .collect();
    assert_eq!(completing.len(), 1);
    assert_eq!(stored.completed_at, Some(h.clock.now()));
    assert_eq!(stored.completed_at, completing[0].completed_at);

    // Later calls never move it
    h.clock.advance(Duration::hours(3));
    let rejoined = h.service.join(opp.id, &user("initiator")).await.unwrap();
    assert_eq!(rejoined.completed_at, stored.completed_at);
    assert!(h.service.join(opp.id, &user("latecomer")).await.is_err());
    h.clock.advance(Duration::days(30));
    h.service.sweep_expired().await.unwrap();
    let after = h.service.get_opportunity(opp.id).await.unwrap();
    assert_eq!(after.status, OpportunityStatus::Completed);
    assert_eq!(after.completed_at, stored.completed_at);

    // Every admitted racer has exactly one record, marked completed
    for participant in stored.participant_ids() {
        let history = h.service.participation_history(participant).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, OpportunityStatus::Completed);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_racing_creates_share_one_opportunity() {
    const RACERS: u32 = 16;
    let h = Harness::for_racers([product(RACERS + 1)], RACERS).await;
    let pid = product_id("prod-race");

    let tasks = (0..RACERS).map(|i| {
        let service = h.service.clone();
        let pid = pid.clone();
        tokio::spawn(async move {
            service
                .create_or_join(&pid, &user(&format!("buyer-{i}")))
                .await
        })
    });
    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.expect("task panicked"))
        .collect();

    let ids: HashSet<_> = results
        .iter()
        .map(|r| r.as_ref().expect("create_or_join failed").id)
        .collect();
    assert_eq!(ids.len(), 1);

    let active = h.service.get_active_for_product(&pid).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].participant_count(), RACERS);
    assert_eq!(
        h.service.product_participation_count(&pid).await.unwrap(),
        RACERS
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_sweep_racing_joins_keeps_views_consistent() {
    let h = Harness::for_racers([product(50)], 16).await;
    let pid = product_id("prod-race");

    let opp = h.service.create_or_join(&pid, &user("initiator")).await.unwrap();
    h.clock.advance(chrono::Duration::days(8));

    let sweep = {
        let service = h.service.clone();
        tokio::spawn(async move { service.sweep_expired().await })
    };
    let joins = (0..8).map(|i| {
        let service = h.service.clone();
        tokio::spawn(async move { service.join(opp.id, &user(&format!("late-{i}"))).await })
    });
    let join_results: Vec<_> = join_all(joins)
        .await
        .into_iter()
        .map(|joined| joined.expect("task panicked"))
        .collect();
    let report = sweep.await.expect("task panicked").unwrap();

    assert!(join_results
        .iter()
        .all(|r| *r == Err(ServiceError::Expired(opp.id))));
    assert!(report.reconciled() <= 1);
    assert!(report.is_clean());

    let stored = h.service.get_opportunity(opp.id).await.unwrap();
    assert_eq!(stored.status, OpportunityStatus::Expired);
    assert_eq!(stored.participant_count(), 1);
    assert_eq!(h.service.product_participation_count(&pid).await.unwrap(), 0);
    let history = h
        .service
        .participation_history(&user("initiator"))
        .await
        .unwrap();
    assert_eq!(history[0].status, OpportunityStatus::Expired);
}
