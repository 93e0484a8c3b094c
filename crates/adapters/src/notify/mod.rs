// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run notifications
//!
//! Fire-and-forget: the engine sends a payload at run start and again at
//! the terminal outcome. Delivery failures are logged by the caller and
//! never affect the run itself.

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeNotifier;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use porter_core::{RunLog, RunLogId, RunStatus, TaskId, TaskKind};
use serde::Serialize;
use thiserror::Error;

/// Errors from notification delivery
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Which run event a payload describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyTrigger {
    RunStart,
    RunSuccess,
    RunFailure,
}

/// Webhook payload for one run event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotifyPayload {
    pub trigger: NotifyTrigger,
    pub task_id: TaskId,
    pub task_name: String,
    pub kind: TaskKind,
    pub run_log_id: RunLogId,
    pub status: RunStatus,
    /// Owner of the task, for recipient routing downstream
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes_transferred: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_transferred: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NotifyPayload {
    /// Payload describing the current state of a run log
    pub fn from_log(
        trigger: NotifyTrigger,
        log: &RunLog,
        user_id: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            trigger,
            task_id: log.task_id,
            task_name: log.task_name.clone(),
            kind: log.kind,
            run_log_id: log.id,
            status: log.status,
            user_id,
            timestamp,
            detail: log.detail.clone(),
            bytes_transferred: log.bytes_transferred,
            items_transferred: log.items_transferred,
            error: log.error.clone(),
        }
    }
}

/// Adapter for delivering run notifications
#[async_trait]
pub trait Notifier: Clone + Send + Sync + 'static {
    async fn notify(&self, payload: &NotifyPayload) -> Result<(), NotifyError>;
}

/// Notifier that drops everything
#[derive(Clone, Default)]
pub struct NoOpNotifier;

#[async_trait]
impl Notifier for NoOpNotifier {
    async fn notify(&self, _payload: &NotifyPayload) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Notifier that POSTs payloads as JSON to a webhook endpoint.
///
/// The HTTP client is blocking, so the request runs on the blocking pool.
#[derive(Clone)]
pub struct WebhookNotifier {
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, payload: &NotifyPayload) -> Result<(), NotifyError> {
        let url = self.url.clone();
        let payload = payload.clone();
        let result = tokio::task::spawn_blocking(move || {
            ureq::post(&url)
                .send_json(&payload)
                .map(|_| ())
                .map_err(|e| NotifyError::Delivery(format!("POST {url}: {e}")))
        })
        .await;

        match result {
            Ok(sent) => sent,
            Err(join) => Err(NotifyError::Delivery(format!("webhook task failed: {join}"))),
        }
    }
}
