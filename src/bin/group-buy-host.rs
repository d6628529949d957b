// Copyright (c) 2025 - Cowboy AI, Inc.
//! Group Buy Host
//!
//! Runs the coordinator over the in-memory store with:
//! - `groupbuy.commands.{create_or_join,join,get_active_for_product,get_for_user}`
//!   request-reply intake
//! - `groupbuy.sweep.trigger` on-demand sweeps
//! - a periodic sweeper (`GROUP_BUY_SWEEP_INTERVAL_SECS`)
//! - threshold notifications published to `groupbuy.notifications.<user_id>`
//!
//! Run with: cargo run --bin group-buy-host
//!
//! Environment:
//! - `NATS_URL`, `NATS_CLIENT_NAME`
//! - `GROUP_BUY_CATALOG` - path to a JSON array of products to seed
//! - `GROUP_BUY_*` engine settings (see `EngineConfig`)
//! - `RUST_LOG` - tracing filter

use anyhow::{Context, Result};
use group_buy_engine::{
    config::EngineConfig,
    domain::Product,
    nats::{MessageProcessor, NatsClient},
    notification::NatsNotificationSink,
    service::{
        CreateOrJoinHandler, GetActiveForProductHandler, GetForUserHandler, GroupBuyCoordinator,
        JoinHandler,
    },
    store::InMemoryStore,
    sweeper::{SweepRunner, SweepTriggerHandler},
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

async fn seed_catalog(store: &InMemoryStore) -> Result<usize> {
    let Ok(path) = std::env::var("GROUP_BUY_CATALOG") else {
        return Ok(0);
    };
    let raw = tokio::fs::read(&path)
        .await
        .with_context(|| format!("Failed to read catalog {path}"))?;
    let products: Vec<Product> =
        serde_json::from_slice(&raw).with_context(|| format!("Invalid catalog {path}"))?;
    let count = products.len();
    for product in products {
        store.upsert_product(product).await;
    }
    Ok(count)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting group buy host");

    let config = EngineConfig::from_env().context("Invalid configuration")?;
    info!(
        nats = ?config.nats.servers,
        sweep_interval_secs = config.sweep_interval.as_secs(),
        max_commit_attempts = config.max_commit_attempts,
        "Configuration loaded"
    );

    let store = Arc::new(InMemoryStore::new());
    let seeded = seed_catalog(&store).await?;
    info!(products = seeded, "Catalog seeded");

    let nats = NatsClient::new(config.nats.clone())
        .await
        .context("Failed to connect to NATS")?;

    let service = Arc::new(GroupBuyCoordinator::new(
        store.clone(),
        store.clone(),
        store.clone(),
        Arc::new(NatsNotificationSink::new(nats.clone())),
        &config,
    ));

    let processor = MessageProcessor::new(nats.clone());
    let handlers = vec![
        processor
            .run_handler(Arc::new(CreateOrJoinHandler::new(service.clone())))
            .await?,
        processor
            .run_handler(Arc::new(JoinHandler::new(service.clone())))
            .await?,
        processor
            .run_handler(Arc::new(GetActiveForProductHandler::new(service.clone())))
            .await?,
        processor
            .run_handler(Arc::new(GetForUserHandler::new(service.clone())))
            .await?,
        processor
            .run_handler(Arc::new(SweepTriggerHandler::new(service.clone())))
            .await?,
    ];

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = SweepRunner::new(service.clone(), config.sweep_interval).spawn(shutdown_rx);

    info!("Group buy host ready");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    info!("Shutting down");
    shutdown_tx.send(true).ok();
    sweeper.await.context("Sweeper task panicked")?;
    for handler in handlers {
        handler.abort();
    }
    nats.flush().await?;

    info!("Group buy host stopped");
    Ok(())
}
