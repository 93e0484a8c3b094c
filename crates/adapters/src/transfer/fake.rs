// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake transfer backend for testing

use super::{TransferBackend, TransferError, TransferSummary};
use async_trait::async_trait;
use porter_core::{Task, TaskId};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

/// Scripted [`TransferBackend`] that records calls.
///
/// Results are served from a queue (empty queue means success). A holding
/// fake parks each transfer on a gate until the test releases it, which
/// makes in-flight concurrency observable deterministically.
#[derive(Clone)]
pub struct FakeTransfer {
    calls: Arc<Mutex<Vec<TaskId>>>,
    results: Arc<Mutex<VecDeque<Result<TransferSummary, TransferError>>>>,
    gate: Option<Arc<Semaphore>>,
}

impl FakeTransfer {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            results: Arc::new(Mutex::new(VecDeque::new())),
            gate: None,
        }
    }

    /// A fake whose transfers block until [`release`](Self::release) grants
    /// them passage
    pub fn holding() -> Self {
        Self {
            gate: Some(Arc::new(Semaphore::new(0))),
            ..Self::new()
        }
    }

    /// Queue the result for the next unscripted transfer
    pub fn push_result(&self, result: Result<TransferSummary, TransferError>) {
        self.results
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(result);
    }

    /// Let `n` held transfers proceed
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    /// Tasks passed to `transfer`, in call order
    pub fn calls(&self) -> Vec<TaskId> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Default for FakeTransfer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransferBackend for FakeTransfer {
    async fn transfer(&self, task: &Task) -> Result<TransferSummary, TransferError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(task.id);

        if let Some(gate) = &self.gate {
            // Closed-semaphore acquire cannot fail; the gate is never closed
            let permit = gate.acquire().await;
            if let Ok(permit) = permit {
                permit.forget();
            }
        }

        let scripted = self
            .results
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        scripted.unwrap_or_else(|| Ok(TransferSummary::default()))
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
