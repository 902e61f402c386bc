//! crates/momentum_core/src/ports.rs
//!
//! Defines the storage contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the concrete database behind them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Category, CheckIn, JournalEntry, NewCheckIn, NewTask, Task, TaskPatch, User,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from the underlying storage.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Version conflict: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Storage Ports (Traits)
//=========================================================================================

/// Tasks and their check-in history.
///
/// Every operation is scoped to `user_id`; rows owned by another user are
/// reported as `NotFound`.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn get_task(&self, task_id: &str, user_id: &str) -> PortResult<Task>;

    /// Active tasks only.
    async fn list_tasks(&self, user_id: &str) -> PortResult<Vec<Task>>;

    /// Creates an active task with a zero streak, due one interval after `now`.
    async fn create_task(
        &self,
        user_id: &str,
        new_task: &NewTask,
        now: DateTime<Utc>,
    ) -> PortResult<Task>;

    /// Unconditional merge-patch.
    async fn update_task(
        &self,
        task_id: &str,
        user_id: &str,
        patch: &TaskPatch,
    ) -> PortResult<Task>;

    /// Merge-patch applied only if the stored version still equals
    /// `expected_version`, otherwise `PortError::Conflict`.
    async fn update_task_if_version(
        &self,
        task_id: &str,
        user_id: &str,
        expected_version: i64,
        patch: &TaskPatch,
    ) -> PortResult<Task>;

    /// Soft delete: marks the task inactive.
    async fn delete_task(&self, task_id: &str, user_id: &str) -> PortResult<()>;

    async fn create_check_in(&self, check_in: &NewCheckIn) -> PortResult<CheckIn>;

    /// Applies a version-guarded task patch and appends a check-in as one
    /// all-or-nothing unit.
    async fn record_check_in(
        &self,
        task_id: &str,
        user_id: &str,
        expected_version: i64,
        patch: &TaskPatch,
        check_in: &NewCheckIn,
    ) -> PortResult<(Task, CheckIn)>;

    /// Most recent first.
    async fn list_check_ins(&self, task_id: &str, user_id: &str) -> PortResult<Vec<CheckIn>>;

    /// Most recent first.
    async fn list_all_check_ins(&self, user_id: &str) -> PortResult<Vec<CheckIn>>;
}

/// Users and the per-user side records (categories, journal).
#[async_trait]
pub trait ProfileStore: Send + Sync {
    // --- User Management ---
    async fn get_user(&self, user_id: &str) -> PortResult<Option<User>>;

    async fn get_or_create_user(&self, user_id: &str, email: Option<&str>) -> PortResult<User>;

    // --- Categories ---
    async fn list_categories(&self, user_id: &str) -> PortResult<Vec<Category>>;

    async fn create_category(&self, user_id: &str, name: &str) -> PortResult<Category>;

    // --- Journal ---
    async fn list_journal_entries(&self, user_id: &str) -> PortResult<Vec<JournalEntry>>;

    async fn create_journal_entry(&self, user_id: &str, content: &str)
        -> PortResult<JournalEntry>;

    async fn get_journal_entry(&self, entry_id: &str, user_id: &str) -> PortResult<JournalEntry>;
}
