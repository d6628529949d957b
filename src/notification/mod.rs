// Copyright (c) 2025 - Cowboy AI, Inc.
//! Notification Sink
//!
//! One-way delivery of "threshold reached" messages to participants. The
//! coordinator calls [`NotificationSink::notify`] once per participant after
//! the completing commit succeeded; delivery guarantees (retries, dedup on
//! the consumer side) belong to the sink.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{Opportunity, ProductId, UserId};
use crate::errors::StoreResult;

pub mod memory;
pub mod nats;

pub use memory::InMemoryNotificationSink;
pub use nats::NatsNotificationSink;

/// Message delivered to one participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub product_name: String,
    pub discount_percent: f64,
    pub title: String,
    pub message: String,
}

impl Notification {
    /// Threshold-reached message for one participant of `opportunity`
    pub fn threshold_reached(opportunity: &Opportunity, user_id: UserId) -> Self {
        Self {
            user_id,
            product_id: opportunity.product_id.clone(),
            product_name: opportunity.product_name.clone(),
            discount_percent: opportunity.discount_percent,
            title: "Group buy unlocked".to_string(),
            message: format!(
                "{} reached {} participants. Your {}% group discount is now available.",
                opportunity.product_name,
                opportunity.participant_count(),
                opportunity.discount_percent
            ),
        }
    }
}

/// Delivery channel for participant notifications
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, notification: Notification) -> StoreResult<()>;
}
