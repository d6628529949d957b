// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for group-buy-engine
//!
//! Deterministic products, users and clock for the integration suites.
//! Every harness starts at the same fixed instant and only moves when a test
//! advances the [`ManualClock`].

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use std::sync::Arc;

use group_buy_engine::clock::ManualClock;
use group_buy_engine::config::EngineConfig;
use group_buy_engine::domain::{Product, ProductId, UserId};
use group_buy_engine::notification::InMemoryNotificationSink;
use group_buy_engine::service::GroupBuyCoordinator;
use group_buy_engine::store::InMemoryStore;

/// Fixed test timestamp (2026-01-19T12:00:00Z)
pub const FIXED_TIMESTAMP: &str = "2026-01-19T12:00:00Z";

pub const PRODUCT_TOTE: &str = "prod-tote";
pub const PRODUCT_KETTLE: &str = "prod-kettle";
pub const PRODUCT_CAPPED: &str = "prod-capped";

pub fn fixed_timestamp() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(FIXED_TIMESTAMP)
        .expect("Invalid timestamp in test fixture")
        .with_timezone(&Utc)
}

pub fn user(name: &str) -> UserId {
    UserId::new(name)
}

pub fn product_id(id: &str) -> ProductId {
    ProductId::new(id)
}

/// threshold 3, 7 day window, 15% carbon saving, 10 kg baseline
pub fn tote_bag() -> Product {
    Product::with_group_buying(PRODUCT_TOTE, "Organic Cotton Tote")
        .threshold(3)
        .discount_percent(12.0)
        .expiry_days(7)
        .carbon_saving_percent(15.0)
        .baseline_carbon_footprint(10.0)
        .category("bags")
}

/// Group buying switched off
pub fn kettle() -> Product {
    Product::with_group_buying(PRODUCT_KETTLE, "Steel Kettle").disabled()
}

/// threshold 2, at most 2 participants
pub fn capped() -> Product {
    Product::with_group_buying(PRODUCT_CAPPED, "Refill Station Kit")
        .threshold(2)
        .max_participants(2)
}

pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub sink: Arc<InMemoryNotificationSink>,
    pub clock: Arc<ManualClock>,
    pub service: Arc<GroupBuyCoordinator>,
}

impl Harness {
    /// Catalog with [`tote_bag`], [`kettle`] and [`capped`]
    pub async fn new() -> Self {
        Self::with_products([tote_bag(), kettle(), capped()]).await
    }

    pub async fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        Self::build(products, EngineConfig::default()).await
    }

    /// Enough commit attempts for `racers` concurrent callers to all land
    pub async fn for_racers(products: impl IntoIterator<Item = Product>, racers: u32) -> Self {
        let config = EngineConfig {
            max_commit_attempts: racers * 2,
            ..EngineConfig::default()
        };
        Self::build(products, config).await
    }

    async fn build(products: impl IntoIterator<Item = Product>, config: EngineConfig) -> Self {
        let store = Arc::new(InMemoryStore::new());
        for product in products {
            store.upsert_product(product).await;
        }
        let sink = Arc::new(InMemoryNotificationSink::new());
        let clock = Arc::new(ManualClock::new(fixed_timestamp()));
        let service = Arc::new(
            GroupBuyCoordinator::new(
                store.clone(),
                store.clone(),
                store.clone(),
                sink.clone(),
                &config,
            )
            .with_clock(clock.clone()),
        );
        Self {
            store,
            sink,
            clock,
            service,
        }
    }
}
