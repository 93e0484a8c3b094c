// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake notifier for testing

use super::{Notifier, NotifyError, NotifyPayload};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Fake [`Notifier`] that records every payload
#[derive(Clone, Default)]
pub struct FakeNotifier {
    sent: Arc<Mutex<Vec<NotifyPayload>>>,
    fail: Arc<Mutex<bool>>,
}

impl FakeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// All payloads seen so far, in delivery order
    pub fn sent(&self) -> Vec<NotifyPayload> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Make subsequent deliveries fail
    pub fn fail_deliveries(&self) {
        *self.fail.lock().unwrap_or_else(|e| e.into_inner()) = true;
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn notify(&self, payload: &NotifyPayload) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(payload.clone());
        if *self.fail.lock().unwrap_or_else(|e| e.into_inner()) {
            return Err(NotifyError::Delivery("scripted failure".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
