//! crates/momentum_core/src/service.rs
//!
//! Runs the engine against a `TaskStore`: read the task, compute the
//! transition, commit it conditionally on the version that was read.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use tracing::{info, warn};

use crate::clock;
use crate::domain::{CheckIn, CheckInReport, NewTask, Task, TaskPatch};
use crate::engine::{self, ReplayOffer};
use crate::error::DomainResult;
use crate::ports::{PortError, TaskStore};
use crate::stats::{self, DayActivity, GlobalStats, TaskStats};

/// A task whose next check-in has passed.
#[derive(Debug, Clone)]
pub struct PendingCheckIn {
    pub task: Task,
    pub overdue_minutes: i64,
}

/// The stored result of a processed check-in.
#[derive(Debug, Clone)]
pub struct CheckInReceipt {
    pub check_in: CheckIn,
    pub task: Task,
    pub replay_offer: Option<ReplayOffer>,
}

#[derive(Debug, Clone)]
pub struct TaskStatsEntry {
    pub task_id: String,
    pub task_name: String,
    pub stats: TaskStats,
}

#[derive(Debug, Clone)]
pub struct StatsOverview {
    pub global: GlobalStats,
    pub per_task: Vec<TaskStatsEntry>,
}

#[derive(Clone)]
pub struct CheckInService {
    store: Arc<dyn TaskStore>,
}

impl CheckInService {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    pub async fn create_task(
        &self,
        user_id: &str,
        new_task: &NewTask,
        now: DateTime<Utc>,
    ) -> DomainResult<Task> {
        new_task.validate()?;
        let task = self.store.create_task(user_id, new_task, now).await?;
        info!(task_id = %task.id, user_id, "task created");
        Ok(task)
    }

    /// Applies a direct user edit, version-guarded like check-ins so it
    /// cannot interleave with a replay commit. An empty edit writes nothing.
    pub async fn edit_task(
        &self,
        task_id: &str,
        user_id: &str,
        edit: &TaskPatch,
    ) -> DomainResult<Task> {
        edit.validate_edit()?;

        let mut retried = false;
        loop {
            let task = self.store.get_task(task_id, user_id).await?;
            if edit.is_empty() {
                return Ok(task);
            }
            let patch = engine::edit_task(&task, edit)?;

            match self
                .store
                .update_task_if_version(task_id, user_id, task.version, &patch)
                .await
            {
                Ok(task) => return Ok(task),
                Err(PortError::Conflict(what)) if !retried => {
                    warn!(task_id, %what, "task edit lost a version race, retrying once");
                    retried = true;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Applies one check-in report.
    ///
    /// A version conflict re-reads the task and reapplies the same report once;
    /// a second conflict is surfaced as `ConcurrencyConflict`.
    pub async fn process_check_in(
        &self,
        task_id: &str,
        user_id: &str,
        report: &CheckInReport,
        now: DateTime<Utc>,
    ) -> DomainResult<CheckInReceipt> {
        report.validate()?;

        let mut retried = false;
        loop {
            let task = self.store.get_task(task_id, user_id).await?;
            let outcome = engine::process_check_in(&task, report, now)?;

            match self
                .store
                .record_check_in(task_id, user_id, task.version, &outcome.patch, &outcome.check_in)
                .await
            {
                Ok((task, check_in)) => {
                    info!(
                        task_id,
                        streak = task.streak,
                        defeat = check_in.was_defeat,
                        in_replay = task.is_in_replay_mode,
                        "check-in recorded"
                    );
                    return Ok(CheckInReceipt {
                        check_in,
                        task,
                        replay_offer: outcome.replay_offer,
                    });
                }
                Err(PortError::Conflict(what)) if !retried => {
                    warn!(task_id, %what, "check-in lost a version race, retrying once");
                    retried = true;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Puts a task into replay mode with a reduced goal, with the same
    /// retry-once conflict policy as check-ins.
    pub async fn commit_replay(
        &self,
        task_id: &str,
        user_id: &str,
        replay_goal: i32,
        now: DateTime<Utc>,
    ) -> DomainResult<Task> {
        let mut retried = false;
        loop {
            let task = self.store.get_task(task_id, user_id).await?;
            let patch = engine::commit_replay(&task, replay_goal, now)?;

            match self
                .store
                .update_task_if_version(task_id, user_id, task.version, &patch)
                .await
            {
                Ok(task) => {
                    info!(task_id, replay_goal, "replay committed");
                    return Ok(task);
                }
                Err(PortError::Conflict(what)) if !retried => {
                    warn!(task_id, %what, "replay commit lost a version race, retrying once");
                    retried = true;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Active tasks that are due at `now`, most overdue first.
    pub async fn due_check_ins(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<Vec<PendingCheckIn>> {
        let tasks = self.store.list_tasks(user_id).await?;
        let mut pending: Vec<PendingCheckIn> = tasks
            .into_iter()
            .filter(|task| clock::is_due(task, now))
            .map(|task| PendingCheckIn {
                overdue_minutes: clock::overdue_minutes(&task, now),
                task,
            })
            .collect();
        pending.sort_by(|a, b| a.task.next_checkin_at.cmp(&b.task.next_checkin_at));
        Ok(pending)
    }

    pub async fn task_stats(
        &self,
        task_id: &str,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<TaskStats> {
        // Surfaces NotFound for unknown or foreign tasks instead of empty stats.
        self.store.get_task(task_id, user_id).await?;
        let history = self.store.list_check_ins(task_id, user_id).await?;
        Ok(stats::task_stats(&history, now))
    }

    pub async fn global_stats(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<StatsOverview> {
        let tasks = self.store.list_tasks(user_id).await?;
        let histories = try_join_all(
            tasks
                .iter()
                .map(|task| self.store.list_check_ins(&task.id, user_id)),
        )
        .await?;

        let per_task: Vec<TaskStatsEntry> = tasks
            .iter()
            .zip(histories.iter())
            .map(|(task, history)| TaskStatsEntry {
                task_id: task.id.clone(),
                task_name: task.name.clone(),
                stats: stats::task_stats(history, now),
            })
            .collect();
        let only_stats: Vec<TaskStats> = per_task.iter().map(|entry| entry.stats).collect();

        Ok(StatsOverview {
            global: stats::global_stats(&tasks, &only_stats),
            per_task,
        })
    }

    pub async fn daily_activity(&self, user_id: &str) -> DomainResult<Vec<DayActivity>> {
        let history = self.store.list_all_check_ins(user_id).await?;
        Ok(stats::daily_activity(&history))
    }
}
