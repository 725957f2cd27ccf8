//! Batch dispatch to the push backend.

use async_trait::async_trait;
use chatpush_config::FcmSettings;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::recipient::OutgoingMessage;

#[derive(Debug, Error)]
pub enum PushError {
    #[error("push backend request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("push backend unavailable: {0}")]
    Unavailable(String),
}

pub type PushResult<T> = Result<T, PushError>;

/// Outcome for one message, positionally aligned with the input batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResponse {
    pub success_count: u32,
    pub failure_count: u32,
    pub responses: Vec<SendOutcome>,
}

/// Batch-send seam. One call per request; an individual delivery failure is a
/// failure outcome inside the response, not an `Err`.
#[async_trait]
pub trait PushSend: Send + Sync {
    async fn send_batch(&self, messages: &[OutgoingMessage]) -> PushResult<BatchResponse>;
}

/// FCM v1 HTTP client. The batch call fans the per-token posts out
/// concurrently, the way the provider SDKs do internally.
pub struct FcmClient {
    client: reqwest::Client,
    settings: FcmSettings,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    #[serde(skip_serializing_if = "is_false")]
    validate_only: bool,
    message: &'a OutgoingMessage,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// FCM answers a successful send with `{"name": "projects/.../messages/<id>"}`.
#[derive(Deserialize)]
struct SendResponse {
    name: String,
}

impl FcmClient {
    pub fn new(settings: FcmSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            settings,
        }
    }

    async fn send_one(&self, message: &OutgoingMessage) -> Result<SendOutcome, reqwest::Error> {
        let response = self
            .client
            .post(&self.settings.endpoint)
            .bearer_auth(&self.settings.server_key)
            .json(&SendRequest {
                validate_only: self.settings.dry_run,
                message,
            })
            .send()
            .await?;

        if response.status().is_success() {
            let message_id = response.json::<SendResponse>().await.ok().map(|r| r.name);
            Ok(SendOutcome {
                success: true,
                message_id,
                error: None,
            })
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Ok(SendOutcome {
                success: false,
                message_id: None,
                error: Some(format!("{status}: {body}")),
            })
        }
    }
}

#[async_trait]
impl PushSend for FcmClient {
    async fn send_batch(&self, messages: &[OutgoingMessage]) -> PushResult<BatchResponse> {
        if self.settings.server_key.is_empty() {
            return Err(PushError::Unavailable(
                "FCM server key is not configured".to_string(),
            ));
        }

        let results = join_all(messages.iter().map(|m| self.send_one(m))).await;

        let mut responses = Vec::with_capacity(results.len());
        for result in results {
            // A transport-level error fails the whole batch; a rejected token
            // is already a failure outcome inside the Ok.
            responses.push(result?);
        }

        let success_count = responses.iter().filter(|o| o.success).count() as u32;
        let failure_count = responses.len() as u32 - success_count;
        debug!(success_count, failure_count, "Push batch dispatched");

        Ok(BatchResponse {
            success_count,
            failure_count,
            responses,
        })
    }
}
