// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timer-driven dispatch
//!
//! One armed timer per active task. `tick` pops due timers and, for each
//! fire, re-fetches the task fresh from the repository so deletes and edits
//! made after arming take effect without any timer bookkeeping. A fire that
//! cannot get an execution slot is skipped, not queued: it leaves no run
//! log and the task simply re-arms from the current time.

use crate::error::ScheduleError;
use crate::runner::TaskRunner;
use chrono::{DateTime, Utc};
use porter_adapters::{Backends, Notifier, RepositoryError, TaskRepository};
use porter_core::{
    Clock, CronExpr, EngineConfig, ExecutionSlots, Fire, RunLog, RunLogId, SlotGuard, Task,
    TaskId, TimerHeap,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Snapshot of scheduler state for diagnostics
#[derive(Debug, Clone)]
pub struct SchedulerStatus {
    /// Armed timers and their fire times
    pub armed: Vec<(TaskId, DateTime<Utc>)>,
    /// Tasks currently holding an execution slot
    pub in_flight: Vec<TaskId>,
    pub stopping: bool,
}

/// The scheduling engine
pub struct Scheduler<R, B, N, C> {
    repo: R,
    runner: TaskRunner<R, B, N, C>,
    clock: C,
    slots: ExecutionSlots,
    timers: Mutex<TimerHeap>,
    running: Mutex<Vec<JoinHandle<()>>>,
    stopping: AtomicBool,
    utc_offset_minutes: i32,
}

impl<R, B, N, C> Scheduler<R, B, N, C>
where
    R: TaskRepository,
    B: Backends,
    N: Notifier,
    C: Clock,
{
    pub fn new(repo: R, backends: B, notifier: N, clock: C, config: &EngineConfig) -> Arc<Self> {
        Arc::new(Self {
            runner: TaskRunner::new(repo.clone(), backends, notifier, clock.clone()),
            repo,
            clock,
            slots: ExecutionSlots::new(config.max_concurrent),
            timers: Mutex::new(TimerHeap::new()),
            running: Mutex::new(Vec::new()),
            stopping: AtomicBool::new(false),
            utc_offset_minutes: config.utc_offset_minutes,
        })
    }

    fn timers(&self) -> MutexGuard<'_, TimerHeap> {
        self.timers.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Arm every active task from the repository. Tasks whose stored
    /// schedule no longer parses are logged and skipped, never fatal.
    pub async fn load(&self) -> Result<usize, ScheduleError> {
        let mut armed = 0;
        for task in self.repo.list_tasks().await? {
            match self.schedule_task(&task).await {
                Ok(Some(_)) => armed += 1,
                Ok(None) => {}
                Err(e) => {
                    tracing::error!(
                        task = %task.id,
                        name = %task.name,
                        error = %e,
                        "skipping unschedulable task"
                    );
                }
            }
        }
        tracing::info!(armed, "scheduler loaded");
        Ok(armed)
    }

    /// Arm (or disarm) a task after it was created or updated.
    ///
    /// Validation is synchronous: an invalid schedule arms nothing.
    /// Returns the armed fire time, or `None` for an inactive task.
    pub async fn schedule_task(&self, task: &Task) -> Result<Option<DateTime<Utc>>, ScheduleError> {
        if !task.active {
            self.timers().disarm(task.id);
            self.clear_next_run(task.id).await;
            return Ok(None);
        }

        let cron = CronExpr::parse(&task.schedule)?;
        let next = cron
            .next_after_in_offset(self.clock.now(), self.utc_offset_minutes)
            .ok_or(ScheduleError::NoUpcomingFire)?;
        self.timers().arm(task.id, next);
        self.repo.set_next_run(task.id, Some(next)).await?;
        tracing::info!(task = %task.id, name = %task.name, next = %next, "armed");
        Ok(Some(next))
    }

    /// Disarm a task after deletion. An in-flight run is not preempted; it
    /// completes and is recorded, but nothing further is armed.
    pub async fn unschedule_task(&self, id: TaskId) {
        self.timers().disarm(id);
        self.clear_next_run(id).await;
        tracing::info!(task = %id, "disarmed");
    }

    // A deleted task has no row to clear; that is not an error here.
    async fn clear_next_run(&self, id: TaskId) {
        match self.repo.set_next_run(id, None).await {
            Ok(()) | Err(RepositoryError::TaskNotFound(_)) => {}
            Err(e) => tracing::error!(task = %id, error = %e, "failed to clear next_run"),
        }
    }

    /// Dispatch every timer due at the clock's current time
    pub async fn tick(self: &Arc<Self>) {
        if self.stopping.load(Ordering::SeqCst) {
            return;
        }
        let now = self.clock.now();
        let fires = self.timers().pop_due(now);
        for fire in fires {
            self.dispatch_fire(fire, now).await;
        }
        self.reap_finished();
    }

    async fn dispatch_fire(self: &Arc<Self>, fire: Fire, now: DateTime<Utc>) {
        // Always the fresh task, never state captured at arm time
        let task = match self.repo.get_task(fire.task).await {
            Ok(Some(task)) => task,
            Ok(None) => {
                tracing::info!(task = %fire.task, "dropping fire for deleted task");
                return;
            }
            Err(e) => {
                tracing::error!(task = %fire.task, error = %e, "task fetch failed at fire time");
                return;
            }
        };
        if !task.active {
            tracing::info!(task = %task.id, "dropping fire for inactive task");
            self.clear_next_run(task.id).await;
            return;
        }

        let guard = match self.slots.try_acquire(task.id) {
            Ok(guard) => guard,
            Err(denied) => {
                // skipped, not queued: no run log, re-arm from now
                tracing::info!(
                    task = %task.id,
                    name = %task.name,
                    reason = %denied,
                    "fire skipped"
                );
                self.rearm(&task, now).await;
                return;
            }
        };

        if let Err(e) = self.repo.set_last_run(task.id, now).await {
            tracing::error!(task = %task.id, error = %e, "failed to record last_run");
        }
        match self.runner.start(&task, false).await {
            Ok(log) => self.spawn_execution(task, log, guard),
            Err(e) => {
                tracing::error!(task = %task.id, error = %e, "failed to open run log");
                drop(guard);
                self.rearm(&task, self.clock.now()).await;
            }
        }
    }

    fn spawn_execution(self: &Arc<Self>, task: Task, log: RunLog, guard: SlotGuard) {
        let scheduler = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let task_id = task.id;
            scheduler.runner.run(task, log).await;
            drop(guard);
            scheduler.finish_execution(task_id).await;
        });
        self.running
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(handle);
    }

    // Re-arm after a run resolves. The task is fetched again: deletes and
    // deactivations during the run win.
    async fn finish_execution(&self, id: TaskId) {
        if self.stopping.load(Ordering::SeqCst) {
            return;
        }
        match self.repo.get_task(id).await {
            Ok(Some(task)) if task.active => {
                let now = self.clock.now();
                self.rearm(&task, now).await;
            }
            Ok(Some(_)) | Ok(None) => {}
            Err(e) => tracing::error!(task = %id, error = %e, "re-arm fetch failed"),
        }
    }

    // Next fire computed from `now`, never from the missed fire time, so a
    // long run produces no catch-up burst.
    async fn rearm(&self, task: &Task, now: DateTime<Utc>) {
        let cron = match task.cron() {
            Ok(cron) => cron,
            Err(e) => {
                tracing::error!(task = %task.id, error = %e, "stored schedule no longer parses");
                return;
            }
        };
        match cron.next_after_in_offset(now, self.utc_offset_minutes) {
            Some(next) => {
                self.timers().arm(task.id, next);
                if let Err(e) = self.repo.set_next_run(task.id, Some(next)).await {
                    tracing::error!(task = %task.id, error = %e, "failed to persist next_run");
                }
            }
            None => {
                tracing::warn!(task = %task.id, "schedule has no upcoming fire, leaving unarmed");
            }
        }
    }

    /// Run a task immediately, outside its schedule. Slot rules still
    /// apply; denial surfaces to the caller instead of being a silent skip.
    /// Returns the run log ID before the transfer completes.
    pub async fn run_task_now(self: &Arc<Self>, id: TaskId) -> Result<RunLogId, ScheduleError> {
        if self.stopping.load(Ordering::SeqCst) {
            return Err(ScheduleError::ShuttingDown);
        }
        let task = self
            .repo
            .get_task(id)
            .await?
            .ok_or(ScheduleError::Repository(RepositoryError::TaskNotFound(id)))?;
        let guard = self.slots.try_acquire(task.id)?;
        if let Err(e) = self.repo.set_last_run(task.id, self.clock.now()).await {
            tracing::error!(task = %task.id, error = %e, "failed to record last_run");
        }
        let log = self.runner.start(&task, true).await?;
        let log_id = log.id;
        self.spawn_execution(task, log, guard);
        Ok(log_id)
    }

    pub fn status(&self) -> SchedulerStatus {
        SchedulerStatus {
            armed: self.timers().armed(),
            in_flight: self.slots.running_tasks(),
            stopping: self.stopping.load(Ordering::SeqCst),
        }
    }

    fn reap_finished(&self) {
        self.running
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|handle| !handle.is_finished());
    }

    /// Stop arming and dispatching, then wait up to `grace` for in-flight
    /// runs. Runs still going after the grace period are left to finish or
    /// die with the process; their logs are reconciled at next startup.
    pub async fn shutdown(&self, grace: Duration) {
        self.stopping.store(true, Ordering::SeqCst);
        let handles: Vec<JoinHandle<()>> =
            std::mem::take(&mut *self.running.lock().unwrap_or_else(|e| e.into_inner()));
        if handles.is_empty() {
            tracing::info!("scheduler stopped");
            return;
        }

        tracing::info!(in_flight = handles.len(), "waiting for in-flight runs");
        let drain = async {
            for handle in handles {
                let _ = handle.await;
            }
        };
        if tokio::time::timeout(grace, drain).await.is_err() {
            tracing::warn!("shutdown grace expired with runs still in flight");
        } else {
            tracing::info!("scheduler stopped");
        }
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
