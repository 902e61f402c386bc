#![allow(dead_code)]

use api_lib::adapters::MemoryAdapter;
use api_lib::config::Config;
use api_lib::web::{build_router, AppState};
use async_trait::async_trait;
use axum::Router;
use chrono::{DateTime, TimeZone, Utc};
use momentum_core::domain::{CheckIn, MetricType, NewCheckIn, NewTask, Task, TaskPatch};
use momentum_core::ports::{PortResult, TaskStore};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// A fixed instant so schedule assertions are exact.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 4, 2, 10, 0, 0).unwrap()
}

pub fn new_task(name: &str, target: i32, interval_minutes: i32) -> NewTask {
    NewTask {
        name: name.to_string(),
        category: "Focus".to_string(),
        metric_type: MetricType::Duration,
        target,
        interval_minutes,
    }
}

pub fn test_config() -> Arc<Config> {
    Arc::new(Config::from_lookup(|_| None).expect("default config"))
}

/// A router over a fresh in-memory store.
pub fn test_router() -> Router {
    let memory = Arc::new(MemoryAdapter::new());
    let state = AppState::new(memory.clone(), memory, test_config());
    build_router(Arc::new(state))
}

/// Wraps the in-memory store and lets a simulated concurrent writer bump a
/// task between the engine's read and its conditional write.
pub struct InterferingStore {
    pub inner: Arc<MemoryAdapter>,
    interferences: AtomicU32,
    interloper_streak: i32,
}

impl InterferingStore {
    pub fn new(inner: Arc<MemoryAdapter>, interferences: u32, interloper_streak: i32) -> Self {
        Self {
            inner,
            interferences: AtomicU32::new(interferences),
            interloper_streak,
        }
    }

    async fn maybe_interfere(&self, task_id: &str, user_id: &str) -> PortResult<()> {
        let remaining = self.interferences.load(Ordering::SeqCst);
        if remaining > 0 {
            self.interferences.store(remaining - 1, Ordering::SeqCst);
            let bump = TaskPatch {
                streak: Some(self.interloper_streak),
                ..TaskPatch::default()
            };
            self.inner.update_task(task_id, user_id, &bump).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl TaskStore for InterferingStore {
    async fn get_task(&self, task_id: &str, user_id: &str) -> PortResult<Task> {
        self.inner.get_task(task_id, user_id).await
    }

    async fn list_tasks(&self, user_id: &str) -> PortResult<Vec<Task>> {
        self.inner.list_tasks(user_id).await
    }

    async fn create_task(
        &self,
        user_id: &str,
        new_task: &NewTask,
        now: DateTime<Utc>,
    ) -> PortResult<Task> {
        self.inner.create_task(user_id, new_task, now).await
    }

    async fn update_task(
        &self,
        task_id: &str,
        user_id: &str,
        patch: &TaskPatch,
    ) -> PortResult<Task> {
        self.inner.update_task(task_id, user_id, patch).await
    }

    async fn update_task_if_version(
        &self,
        task_id: &str,
        user_id: &str,
        expected_version: i64,
        patch: &TaskPatch,
    ) -> PortResult<Task> {
        self.maybe_interfere(task_id, user_id).await?;
        self.inner
            .update_task_if_version(task_id, user_id, expected_version, patch)
            .await
    }

    async fn delete_task(&self, task_id: &str, user_id: &str) -> PortResult<()> {
        self.inner.delete_task(task_id, user_id).await
    }

    async fn create_check_in(&self, check_in: &NewCheckIn) -> PortResult<CheckIn> {
        self.inner.create_check_in(check_in).await
    }

    async fn record_check_in(
        &self,
        task_id: &str,
        user_id: &str,
        expected_version: i64,
        patch: &TaskPatch,
        check_in: &NewCheckIn,
    ) -> PortResult<(Task, CheckIn)> {
        self.maybe_interfere(task_id, user_id).await?;
        self.inner
            .record_check_in(task_id, user_id, expected_version, patch, check_in)
            .await
    }

    async fn list_check_ins(&self, task_id: &str, user_id: &str) -> PortResult<Vec<CheckIn>> {
        self.inner.list_check_ins(task_id, user_id).await
    }

    async fn list_all_check_ins(&self, user_id: &str) -> PortResult<Vec<CheckIn>> {
        self.inner.list_all_check_ins(user_id).await
    }
}
