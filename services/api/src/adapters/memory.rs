//! services/api/src/adapters/memory.rs
//!
//! An in-process implementation of the storage ports. Used when no
//! `DATABASE_URL` is configured and by the integration tests.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use momentum_core::domain::{
    Category, CheckIn, JournalEntry, NewCheckIn, NewTask, Task, TaskPatch, User,
};
use momentum_core::ports::{PortError, PortResult, ProfileStore, TaskStore};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    users: HashMap<String, User>,
    tasks: HashMap<String, Task>,
    check_ins: Vec<CheckIn>,
    categories: Vec<Category>,
    journal: Vec<JournalEntry>,
}

/// All tables live behind one lock, so every port call is atomic.
#[derive(Default)]
pub struct MemoryAdapter {
    tables: RwLock<Tables>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

fn task_not_found(task_id: &str) -> PortError {
    PortError::NotFound(format!("Task {} not found", task_id))
}

impl Tables {
    fn owned_task_mut(&mut self, task_id: &str, user_id: &str) -> PortResult<&mut Task> {
        self.tasks
            .get_mut(task_id)
            .filter(|task| task.user_id == user_id)
            .ok_or_else(|| task_not_found(task_id))
    }

    fn patch_task(
        &mut self,
        task_id: &str,
        user_id: &str,
        expected_version: Option<i64>,
        patch: &TaskPatch,
    ) -> PortResult<Task> {
        let task = self.owned_task_mut(task_id, user_id)?;
        if let Some(expected) = expected_version {
            if task.version != expected {
                return Err(PortError::Conflict(format!(
                    "Task {} is at version {}, expected {}",
                    task_id, task.version, expected
                )));
            }
        }
        patch.apply_to(task);
        task.version += 1;
        Ok(task.clone())
    }

    fn append_check_in(&mut self, record: &NewCheckIn) -> CheckIn {
        let check_in = CheckIn {
            id: Uuid::new_v4().to_string(),
            task_id: record.task_id.clone(),
            user_id: record.user_id.clone(),
            value: record.value,
            was_defeat: record.was_defeat,
            was_replay: record.was_replay,
            replay_goal: record.replay_goal,
            checked_in_at: record.checked_in_at.unwrap_or_else(Utc::now),
        };
        self.check_ins.push(check_in.clone());
        check_in
    }
}

fn most_recent_first(mut check_ins: Vec<CheckIn>) -> Vec<CheckIn> {
    check_ins.sort_by(|a, b| b.checked_in_at.cmp(&a.checked_in_at));
    check_ins
}

//=========================================================================================
// `TaskStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl TaskStore for MemoryAdapter {
    async fn get_task(&self, task_id: &str, user_id: &str) -> PortResult<Task> {
        let tables = self.tables.read().await;
        tables
            .tasks
            .get(task_id)
            .filter(|task| task.user_id == user_id)
            .cloned()
            .ok_or_else(|| task_not_found(task_id))
    }

    async fn list_tasks(&self, user_id: &str) -> PortResult<Vec<Task>> {
        let tables = self.tables.read().await;
        let mut tasks: Vec<Task> = tables
            .tasks
            .values()
            .filter(|task| task.user_id == user_id && task.is_active)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(tasks)
    }

    async fn create_task(
        &self,
        user_id: &str,
        new_task: &NewTask,
        now: chrono::DateTime<Utc>,
    ) -> PortResult<Task> {
        let task = Task {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: new_task.name.clone(),
            category: new_task.category.clone(),
            metric_type: new_task.metric_type,
            target: new_task.target,
            interval_minutes: new_task.interval_minutes,
            streak: 0,
            is_active: true,
            next_checkin_at: now + Duration::minutes(i64::from(new_task.interval_minutes)),
            is_in_replay_mode: false,
            replay_target: None,
            original_target: None,
            created_at: now,
            version: 1,
        };
        let mut tables = self.tables.write().await;
        tables.tasks.insert(task.id.clone(), task.clone());
        Ok(task)
    }

    async fn update_task(
        &self,
        task_id: &str,
        user_id: &str,
        patch: &TaskPatch,
    ) -> PortResult<Task> {
        self.tables
            .write()
            .await
            .patch_task(task_id, user_id, None, patch)
    }

    async fn update_task_if_version(
        &self,
        task_id: &str,
        user_id: &str,
        expected_version: i64,
        patch: &TaskPatch,
    ) -> PortResult<Task> {
        self.tables
            .write()
            .await
            .patch_task(task_id, user_id, Some(expected_version), patch)
    }

    async fn delete_task(&self, task_id: &str, user_id: &str) -> PortResult<()> {
        let deactivate = TaskPatch {
            is_active: Some(false),
            ..TaskPatch::default()
        };
        self.tables
            .write()
            .await
            .patch_task(task_id, user_id, None, &deactivate)?;
        Ok(())
    }

    async fn create_check_in(&self, check_in: &NewCheckIn) -> PortResult<CheckIn> {
        let mut tables = self.tables.write().await;
        tables.owned_task_mut(&check_in.task_id, &check_in.user_id)?;
        Ok(tables.append_check_in(check_in))
    }

    async fn record_check_in(
        &self,
        task_id: &str,
        user_id: &str,
        expected_version: i64,
        patch: &TaskPatch,
        check_in: &NewCheckIn,
    ) -> PortResult<(Task, CheckIn)> {
        let mut tables = self.tables.write().await;
        // The patch is validated first so a conflict leaves no check-in behind.
        let task = tables.patch_task(task_id, user_id, Some(expected_version), patch)?;
        let check_in = tables.append_check_in(check_in);
        Ok((task, check_in))
    }

    async fn list_check_ins(&self, task_id: &str, user_id: &str) -> PortResult<Vec<CheckIn>> {
        let tables = self.tables.read().await;
        let history = tables
            .check_ins
            .iter()
            .filter(|c| c.task_id == task_id && c.user_id == user_id)
            .cloned()
            .collect();
        Ok(most_recent_first(history))
    }

    async fn list_all_check_ins(&self, user_id: &str) -> PortResult<Vec<CheckIn>> {
        let tables = self.tables.read().await;
        let history = tables
            .check_ins
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        Ok(most_recent_first(history))
    }
}

//=========================================================================================
// `ProfileStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl ProfileStore for MemoryAdapter {
    async fn get_user(&self, user_id: &str) -> PortResult<Option<User>> {
        Ok(self.tables.read().await.users.get(user_id).cloned())
    }

    async fn get_or_create_user(&self, user_id: &str, email: Option<&str>) -> PortResult<User> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .entry(user_id.to_string())
            .or_insert_with(|| User {
                id: user_id.to_string(),
                email: email.map(str::to_string),
                created_at: Utc::now(),
            });
        Ok(user.clone())
    }

    async fn list_categories(&self, user_id: &str) -> PortResult<Vec<Category>> {
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_category(&self, user_id: &str, name: &str) -> PortResult<Category> {
        let category = Category {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        self.tables.write().await.categories.push(category.clone());
        Ok(category)
    }

    async fn list_journal_entries(&self, user_id: &str) -> PortResult<Vec<JournalEntry>> {
        let tables = self.tables.read().await;
        let mut entries: Vec<JournalEntry> = tables
            .journal
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }

    async fn create_journal_entry(
        &self,
        user_id: &str,
        content: &str,
    ) -> PortResult<JournalEntry> {
        let entry = JournalEntry {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            content: content.to_string(),
            created_at: Utc::now(),
        };
        self.tables.write().await.journal.push(entry.clone());
        Ok(entry)
    }

    async fn get_journal_entry(&self, entry_id: &str, user_id: &str) -> PortResult<JournalEntry> {
        let tables = self.tables.read().await;
        tables
            .journal
            .iter()
            .find(|e| e.id == entry_id && e.user_id == user_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Journal entry {} not found", entry_id)))
    }
}
