// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Armed-timer registry
//!
//! A min-heap of pending fire times keyed by task. Re-arming a task bumps a
//! per-task generation counter instead of searching the heap: stale entries
//! stay in the heap but are discarded lazily when popped, so arm/disarm are
//! O(log n) and a disarm can never swallow a later re-arm.

use crate::task::TaskId;
use chrono::{DateTime, Utc};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// A timer that has come due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fire {
    pub task: TaskId,
    /// The instant the timer was armed for, not the instant it was observed
    pub scheduled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Entry {
    at: DateTime<Utc>,
    task: TaskId,
    generation: u64,
}

#[derive(Debug, Clone, Copy)]
struct Armed {
    generation: u64,
    at: DateTime<Utc>,
}

/// Pending timers for all scheduled tasks
#[derive(Default)]
pub struct TimerHeap {
    heap: BinaryHeap<Reverse<Entry>>,
    /// Live timer per task; heap entries with an older generation are stale
    /// and ignored.
    armed: HashMap<TaskId, Armed>,
    /// Monotonic per task, surviving disarm, so a heap entry left over from
    /// before a disarm can never match a later re-arm.
    generations: HashMap<TaskId, u64>,
}

impl TimerHeap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (or re-arm) the timer for `task`. Any previously armed time for
    /// the same task is superseded.
    pub fn arm(&mut self, task: TaskId, at: DateTime<Utc>) {
        let generation = self.generations.entry(task).or_insert(0);
        *generation += 1;
        let generation = *generation;
        self.armed.insert(task, Armed { generation, at });
        self.heap.push(Reverse(Entry {
            at,
            task,
            generation,
        }));
    }

    /// Disarm the timer for `task`, if any
    pub fn disarm(&mut self, task: TaskId) {
        self.armed.remove(&task);
    }

    /// Whether `task` currently has an armed timer
    pub fn is_armed(&self, task: TaskId) -> bool {
        self.armed.contains_key(&task)
    }

    /// The armed fire time for `task`, if any
    pub fn next_fire(&self, task: TaskId) -> Option<DateTime<Utc>> {
        self.armed.get(&task).map(|armed| armed.at)
    }

    /// All live timers, in no particular order
    pub fn armed(&self) -> Vec<(TaskId, DateTime<Utc>)> {
        self.armed
            .iter()
            .map(|(task, armed)| (*task, armed.at))
            .collect()
    }

    /// The earliest armed fire time, skipping stale entries
    pub fn peek_next(&mut self) -> Option<DateTime<Utc>> {
        while let Some(Reverse(entry)) = self.heap.peek() {
            if self.is_live(entry) {
                return Some(entry.at);
            }
            self.heap.pop();
        }
        None
    }

    /// Pop every timer due at or before `now`.
    ///
    /// Popped tasks are disarmed; the caller re-arms after handling the
    /// fire. At most one fire per task is returned since arming supersedes.
    pub fn pop_due(&mut self, now: DateTime<Utc>) -> Vec<Fire> {
        let mut due = Vec::new();
        while let Some(Reverse(entry)) = self.heap.peek() {
            if entry.at > now {
                break;
            }
            let entry = match self.heap.pop() {
                Some(Reverse(entry)) => entry,
                None => break,
            };
            if !self.is_live(&entry) {
                continue;
            }
            self.armed.remove(&entry.task);
            due.push(Fire {
                task: entry.task,
                scheduled_at: entry.at,
            });
        }
        due
    }

    fn is_live(&self, entry: &Entry) -> bool {
        self.armed
            .get(&entry.task)
            .is_some_and(|armed| armed.generation == entry.generation)
    }

    /// Number of live timers
    pub fn len(&self) -> usize {
        self.armed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.armed.is_empty()
    }
}

#[cfg(test)]
#[path = "timer_tests.rs"]
mod tests;
