//! services/api/src/trigger.rs
//!
//! The snapshot trigger: asks the export endpoint to rebuild the snapshot once
//! per trigger lifetime and publishes a tri-state status while doing so.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::Deserialize;
use tokio::sync::watch;
use tracing::{error, info};

/// Message reported when a failed response carries no usable body.
pub const FALLBACK_FAILURE_MESSAGE: &str = "Failed to update data";

/// Where a trigger attempt stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerStatus {
    /// The request is in flight (or about to be sent).
    Loading,
    Failed(String),
    Succeeded(String),
}

impl TriggerStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, TriggerStatus::Loading)
    }
}

#[derive(Debug, thiserror::Error)]
enum TriggerError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("{0}")]
    Rejected(String),
}

#[derive(Deserialize)]
struct MessageBody {
    message: Option<String>,
}

/// Fires one POST at the export endpoint for the lifetime of the value.
pub struct SnapshotTrigger {
    client: reqwest::Client,
    url: String,
    fired: AtomicBool,
    status: watch::Sender<TriggerStatus>,
}

impl SnapshotTrigger {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        let (status, _) = watch::channel(TriggerStatus::Loading);
        Self {
            client,
            url: url.into(),
            fired: AtomicBool::new(false),
            status,
        }
    }

    /// Current status.
    pub fn status(&self) -> TriggerStatus {
        self.status.borrow().clone()
    }

    /// A receiver that observes every status change.
    pub fn subscribe(&self) -> watch::Receiver<TriggerStatus> {
        self.status.subscribe()
    }

    /// Sends the export request the first time it is called and returns the
    /// settled status. Later calls send nothing and return `None`.
    pub async fn fire_once(&self) -> Option<TriggerStatus> {
        if self.fired.swap(true, Ordering::SeqCst) {
            return None;
        }

        self.status.send_replace(TriggerStatus::Loading);
        let settled = match self.request().await {
            Ok(message) => {
                info!("{}", message);
                TriggerStatus::Succeeded(message)
            }
            Err(e) => {
                error!("Error: {}", e);
                TriggerStatus::Failed(e.to_string())
            }
        };
        self.status.send_replace(settled.clone());
        Some(settled)
    }

    async fn request(&self) -> Result<String, TriggerError> {
        let response = self.client.post(&self.url).send().await?;
        let ok = response.status().is_success();
        let message = response
            .json::<MessageBody>()
            .await
            .ok()
            .and_then(|body| body.message);

        if ok {
            Ok(message.unwrap_or_default())
        } else {
            Err(TriggerError::Rejected(
                message.unwrap_or_else(|| FALLBACK_FAILURE_MESSAGE.to_string()),
            ))
        }
    }
}
