//! NATS client abstraction for notification delivery and command intake

use async_nats::{Client, ConnectOptions, Subscriber};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::errors::{StoreError, StoreResult};

/// Configuration for NATS connection
#[derive(Debug, Clone, PartialEq)]
pub struct NatsConfig {
    /// NATS server URLs
    pub servers: Vec<String>,
    /// Client name
    pub name: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Request timeout
    pub request_timeout: Duration,
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            servers: vec!["nats://localhost:4222".to_string()],
            name: "group-buy-engine".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(5),
        }
    }
}

/// NATS client wrapper
#[derive(Clone)]
pub struct NatsClient {
    client: Client,
}

impl NatsClient {
    /// Connect with the given configuration
    pub async fn new(config: NatsConfig) -> StoreResult<Self> {
        let connect_options = ConnectOptions::new()
            .name(&config.name)
            .connection_timeout(config.connect_timeout)
            .request_timeout(Some(config.request_timeout));

        let client = async_nats::connect_with_options(config.servers.join(","), connect_options)
            .await
            .map_err(|e| StoreError::NatsConnection(e.to_string()))?;

        info!(servers = ?config.servers, name = %config.name, "Connected to NATS");

        Ok(Self { client })
    }

    /// Publish a JSON message to a subject
    pub async fn publish<T>(&self, subject: &str, message: &T) -> StoreResult<()>
    where
        T: Serialize,
    {
        let payload = serde_json::to_vec(message)?;
        let payload_len = payload.len();

        self.client
            .publish(subject.to_string(), payload.into())
            .await
            .map_err(|e| StoreError::NatsPublish(e.to_string()))?;

        debug!(subject, bytes = payload_len, "Published message");
        Ok(())
    }

    /// Subscribe to a subject
    pub async fn subscribe(&self, subject: &str) -> StoreResult<Subscriber> {
        let subscriber = self
            .client
            .subscribe(subject.to_string())
            .await
            .map_err(|e| StoreError::NatsSubscribe(e.to_string()))?;

        info!(subject, "Subscribed");
        Ok(subscriber)
    }

    /// Request-reply with JSON payloads
    pub async fn request<T, R>(&self, subject: &str, request: &T) -> StoreResult<R>
    where
        T: Serialize,
        R: for<'de> Deserialize<'de>,
    {
        let payload = serde_json::to_vec(request)?;

        let response = self
            .client
            .request(subject.to_string(), payload.into())
            .await
            .map_err(|e| StoreError::NatsPublish(e.to_string()))?;

        let result: R = serde_json::from_slice(&response.payload)?;
        Ok(result)
    }

    /// Flush buffered publishes
    pub async fn flush(&self) -> StoreResult<()> {
        self.client
            .flush()
            .await
            .map_err(|e| StoreError::NatsPublish(e.to_string()))
    }
}

/// Handler for messages arriving on one subject
///
/// A returned value is sent back when the message carries a reply subject.
#[async_trait::async_trait]
pub trait MessageHandler: Send + Sync {
    /// The type of message this handler processes
    type Message: for<'de> Deserialize<'de> + Send;

    /// Handle a message
    async fn handle(&self, message: Self::Message) -> StoreResult<Option<serde_json::Value>>;

    /// Get the subject this handler subscribes to
    fn subject(&self) -> String;
}

/// Message processor that runs handlers for subscriptions
pub struct MessageProcessor {
    client: NatsClient,
}

impl MessageProcessor {
    pub fn new(client: NatsClient) -> Self {
        Self { client }
    }

    /// Subscribe and drive `handler` on a background task
    ///
    /// Every message is handled on its own task, so a slow request never
    /// holds up the ones queued behind it.
    pub async fn run_handler<H>(&self, handler: Arc<H>) -> StoreResult<JoinHandle<()>>
    where
        H: MessageHandler + 'static,
    {
        let subject = handler.subject();
        let mut subscriber = self.client.subscribe(&subject).await?;
        let client = self.client.clone();

        let task = tokio::spawn(async move {
            while let Some(msg) = subscriber.next().await {
                let handler = handler.clone();
                let client = client.clone();
                let subject = subject.clone();

                tokio::spawn(async move {
                    let Some(body) = respond(handler.as_ref(), &subject, &msg.payload).await else {
                        return;
                    };
                    if let Some(reply_to) = msg.reply {
                        if let Err(e) = client.publish(&reply_to.to_string(), &body).await {
                            warn!(subject = %subject, error = %e, "Failed to send reply");
                        }
                    }
                });
            }
        });

        Ok(task)
    }
}

/// Decode one payload and run the handler on it
///
/// An empty payload is decoded as JSON `null`, so unit-like triggers can be
/// sent with `nats pub <subject> ""`. Handler errors become an `{"error": ..}`
/// body; undecodable payloads are dropped.
pub async fn respond<H>(handler: &H, subject: &str, payload: &[u8]) -> Option<serde_json::Value>
where
    H: MessageHandler + ?Sized,
{
    let payload: &[u8] = if payload.is_empty() { b"null" } else { payload };
    let message = match serde_json::from_slice::<H::Message>(payload) {
        Ok(message) => message,
        Err(e) => {
            error!(subject, error = %e, "Dropping undecodable message");
            return None;
        }
    };

    match handler.handle(message).await {
        Ok(reply) => reply,
        Err(e) => {
            error!(subject, error = %e, "Handler failed");
            Some(serde_json::json!({ "error": e.to_string() }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    struct Echo;

    #[async_trait::async_trait]
    impl MessageHandler for Echo {
        type Message = Value;

        async fn handle(&self, message: Value) -> StoreResult<Option<Value>> {
            if message == json!("fail") {
                return Err(StoreError::Unavailable("backend down".to_string()));
            }
            Ok(Some(json!({ "echo": message })))
        }

        fn subject(&self) -> String {
            "groupbuy.test.echo".to_string()
        }
    }

    #[tokio::test]
    async fn test_empty_payload_is_null() {
        let body = respond(&Echo, "groupbuy.test.echo", b"").await;
        assert_eq!(body, Some(json!({ "echo": null })));
    }

    #[tokio::test]
    async fn test_handler_error_becomes_error_body() {
        let body = respond(&Echo, "groupbuy.test.echo", br#""fail""#).await.unwrap();
        assert!(body["error"].as_str().unwrap().contains("backend down"));
    }

    #[tokio::test]
    async fn test_undecodable_payload_is_dropped() {
        struct Typed;

        #[async_trait::async_trait]
        impl MessageHandler for Typed {
            type Message = u32;

            async fn handle(&self, message: u32) -> StoreResult<Option<Value>> {
                Ok(Some(json!(message)))
            }

            fn subject(&self) -> String {
                "groupbuy.test.typed".to_string()
            }
        }

        assert_eq!(respond(&Typed, "groupbuy.test.typed", b"{not json").await, None);
        assert_eq!(respond(&Typed, "groupbuy.test.typed", b"7").await, Some(json!(7)));
    }
}
