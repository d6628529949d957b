// Copyright (c) 2025 - Cowboy AI, Inc.
//! Recording sink for tests and local runs

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

use super::{Notification, NotificationSink};
use crate::domain::UserId;
use crate::errors::{StoreError, StoreResult};

/// Keeps every delivered notification in memory
#[derive(Debug, Default)]
pub struct InMemoryNotificationSink {
    delivered: Mutex<Vec<Notification>>,
    failing: AtomicBool,
}

impl InMemoryNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every delivery while set
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Snapshot of delivered notifications in delivery order
    pub async fn delivered(&self) -> Vec<Notification> {
        self.delivered.lock().await.clone()
    }

    pub async fn delivered_to(&self, user_id: &UserId) -> Vec<Notification> {
        self.delivered
            .lock()
            .await
            .iter()
            .filter(|n| &n.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl NotificationSink for InMemoryNotificationSink {
    async fn notify(&self, notification: Notification) -> StoreResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::NatsPublish(format!(
                "delivery to {} rejected",
                notification.user_id
            )));
        }
        self.delivered.lock().await.push(notification);
        Ok(())
    }
}
