// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Execution slot controller
//!
//! Enforces two admission rules for task executions:
//! - a global ceiling on concurrently running executions
//! - per-task mutual exclusion (at most one in-flight run per task)
//!
//! Acquisition is non-blocking: a denied request returns immediately with
//! the reason, and the caller decides whether to skip or surface the error.
//! A granted slot is held by a [`SlotGuard`] and released on drop, so every
//! exit path of an execution (success, failure, panic unwind in the
//! spawning task) gives the slot back.

use crate::task::TaskId;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Why a slot request was denied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SlotDenied {
    #[error("concurrency ceiling reached")]
    CeilingReached,
    #[error("task already running")]
    SelfOverlap,
}

struct Inner {
    max_concurrent: usize,
    in_flight: HashSet<TaskId>,
}

/// Shared slot controller, cheap to clone
#[derive(Clone)]
pub struct ExecutionSlots {
    inner: Arc<Mutex<Inner>>,
}

impl ExecutionSlots {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                max_concurrent,
                in_flight: HashSet::new(),
            })),
        }
    }

    /// Try to claim a slot for `task`.
    ///
    /// Per-task exclusion is checked before the ceiling, so a duplicate
    /// request for a running task reports [`SlotDenied::SelfOverlap`]
    /// even when the pool is also full.
    pub fn try_acquire(&self, task: TaskId) -> Result<SlotGuard, SlotDenied> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if inner.in_flight.contains(&task) {
            return Err(SlotDenied::SelfOverlap);
        }
        if inner.in_flight.len() >= inner.max_concurrent {
            return Err(SlotDenied::CeilingReached);
        }
        inner.in_flight.insert(task);
        Ok(SlotGuard {
            slots: self.inner.clone(),
            task,
        })
    }

    /// Whether `task` currently holds a slot
    pub fn is_running(&self, task: TaskId) -> bool {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.in_flight.contains(&task)
    }

    /// Number of executions currently in flight
    pub fn in_flight(&self) -> usize {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.in_flight.len()
    }

    /// Tasks currently holding a slot, in no particular order
    pub fn running_tasks(&self) -> Vec<TaskId> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.in_flight.iter().copied().collect()
    }

    pub fn max_concurrent(&self) -> usize {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.max_concurrent
    }
}

/// RAII handle on a claimed slot; dropping it releases the slot
pub struct SlotGuard {
    slots: Arc<Mutex<Inner>>,
    task: TaskId,
}

impl SlotGuard {
    pub fn task(&self) -> TaskId {
        self.task
    }
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        let mut inner = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        inner.in_flight.remove(&self.task);
    }
}

impl std::fmt::Debug for SlotGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotGuard").field("task", &self.task).finish()
    }
}

#[cfg(test)]
#[path = "slots_tests.rs"]
mod tests;
