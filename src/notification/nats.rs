// Copyright (c) 2025 - Cowboy AI, Inc.
//! NATS-backed notification sink
//!
//! Publishes each [`Notification`] as JSON to
//! `groupbuy.notifications.{user_id}`; push delivery is left to whatever
//! subscribes there.

use async_trait::async_trait;
use tracing::debug;

use super::{Notification, NotificationSink};
use crate::errors::StoreResult;
use crate::nats::NatsClient;
use crate::subjects;

/// Fire-and-forget publisher over core NATS
#[derive(Clone)]
pub struct NatsNotificationSink {
    client: NatsClient,
}

impl NatsNotificationSink {
    pub fn new(client: NatsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NotificationSink for NatsNotificationSink {
    async fn notify(&self, notification: Notification) -> StoreResult<()> {
        let subject = subjects::notification_subject(&notification.user_id);
        self.client.publish(&subject, &notification).await?;
        debug!(
            user_id = %notification.user_id,
            product_id = %notification.product_id,
            subject = %subject,
            "Published notification"
        );
        Ok(())
    }
}
