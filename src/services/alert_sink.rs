use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    #[error("alert rejected: {0}")]
    Rejected(String),

    #[error("alert transport failed: {0}")]
    Transport(String),
}

/// Delivers rendered alert text to a destination.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn deliver(&self, destination: &str, text: &str) -> Result<(), SinkError>;
}

/// Payload pushed to `/events` subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub channel: String,
    pub text: String,
}

/// Publishes alerts on the app's broadcast channel (streamed to SSE clients).
#[derive(Clone)]
pub struct BroadcastSink {
    events_tx: broadcast::Sender<String>,
}

impl BroadcastSink {
    pub fn new(events_tx: broadcast::Sender<String>) -> Self {
        Self { events_tx }
    }
}

#[async_trait]
impl AlertSink for BroadcastSink {
    async fn deliver(&self, destination: &str, text: &str) -> Result<(), SinkError> {
        let evt = AlertEvent {
            channel: destination.to_string(),
            text: text.to_string(),
        };
        let payload =
            serde_json::to_string(&evt).map_err(|e| SinkError::Rejected(e.to_string()))?;

        // no subscribers right now is fine
        let _ = self.events_tx.send(payload);
        Ok(())
    }
}

/// Delivers to every inner sink; reports the first failure after trying all.
pub struct FanoutSink {
    sinks: Vec<Arc<dyn AlertSink>>,
}

impl FanoutSink {
    pub fn new(sinks: Vec<Arc<dyn AlertSink>>) -> Self {
        Self { sinks }
    }
}

#[async_trait]
impl AlertSink for FanoutSink {
    async fn deliver(&self, destination: &str, text: &str) -> Result<(), SinkError> {
        let mut first_err = None;

        for sink in &self.sinks {
            if let Err(e) = sink.deliver(destination, text).await {
                first_err.get_or_insert(e);
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
