//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the storage ports from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use momentum_core::domain::{
    Category, CheckIn, JournalEntry, MetricType, NewCheckIn, NewTask, Task, TaskPatch, User,
};
use momentum_core::ports::{PortError, PortResult, ProfileStore, TaskStore};
use sqlx::{FromRow, PgConnection, PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

const TASK_COLUMNS: &str = "id, user_id, name, category, metric_type, target, interval_minutes, \
     streak, is_active, next_checkin_at, is_in_replay_mode, replay_target, original_target, \
     created_at, version";

const CHECK_IN_COLUMNS: &str =
    "id, task_id, user_id, value, was_defeat, was_replay, replay_goal, checked_in_at";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `TaskStore` and `ProfileStore` ports.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn task_not_found(task_id: &str) -> PortError {
    PortError::NotFound(format!("Task {} not found", task_id))
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: String,
    email: Option<String>,
    created_at: DateTime<Utc>,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            email: self.email,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct TaskRecord {
    id: String,
    user_id: String,
    name: String,
    category: String,
    metric_type: String,
    target: i32,
    interval_minutes: i32,
    streak: i32,
    is_active: bool,
    next_checkin_at: DateTime<Utc>,
    is_in_replay_mode: bool,
    replay_target: Option<i32>,
    original_target: Option<i32>,
    created_at: DateTime<Utc>,
    version: i64,
}
impl TaskRecord {
    fn to_domain(self) -> PortResult<Task> {
        let metric_type = self.metric_type.parse::<MetricType>().map_err(|e| {
            PortError::Unexpected(format!("Task {} has a corrupt metric type: {}", self.id, e))
        })?;
        Ok(Task {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            category: self.category,
            metric_type,
            target: self.target,
            interval_minutes: self.interval_minutes,
            streak: self.streak,
            is_active: self.is_active,
            next_checkin_at: self.next_checkin_at,
            is_in_replay_mode: self.is_in_replay_mode,
            replay_target: self.replay_target,
            original_target: self.original_target,
            created_at: self.created_at,
            version: self.version,
        })
    }
}

#[derive(FromRow)]
struct CheckInRecord {
    id: String,
    task_id: String,
    user_id: String,
    value: i32,
    was_defeat: bool,
    was_replay: bool,
    replay_goal: Option<i32>,
    checked_in_at: DateTime<Utc>,
}
impl CheckInRecord {
    fn to_domain(self) -> CheckIn {
        CheckIn {
            id: self.id,
            task_id: self.task_id,
            user_id: self.user_id,
            value: self.value,
            was_defeat: self.was_defeat,
            was_replay: self.was_replay,
            replay_goal: self.replay_goal,
            checked_in_at: self.checked_in_at,
        }
    }
}

#[derive(FromRow)]
struct CategoryRecord {
    id: String,
    user_id: String,
    name: String,
    created_at: DateTime<Utc>,
}
impl CategoryRecord {
    fn to_domain(self) -> Category {
        Category {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct JournalEntryRecord {
    id: String,
    user_id: String,
    content: String,
    created_at: DateTime<Utc>,
}
impl JournalEntryRecord {
    fn to_domain(self) -> JournalEntry {
        JournalEntry {
            id: self.id,
            user_id: self.user_id,
            content: self.content,
            created_at: self.created_at,
        }
    }
}

//=========================================================================================
// Shared Statements
//=========================================================================================

/// Builds `UPDATE tasks ... RETURNING` for the fields present in `patch`.
/// Every update bumps `version`.
fn build_task_update(
    task_id: &str,
    user_id: &str,
    expected_version: Option<i64>,
    patch: &TaskPatch,
) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new("UPDATE tasks SET version = version + 1");
    if let Some(name) = &patch.name {
        query.push(", name = ").push_bind(name.clone());
    }
    if let Some(category) = &patch.category {
        query.push(", category = ").push_bind(category.clone());
    }
    if let Some(metric_type) = patch.metric_type {
        query.push(", metric_type = ").push_bind(metric_type.as_str());
    }
    if let Some(target) = patch.target {
        query.push(", target = ").push_bind(target);
    }
    if let Some(interval) = patch.interval_minutes {
        query.push(", interval_minutes = ").push_bind(interval);
    }
    if let Some(streak) = patch.streak {
        query.push(", streak = ").push_bind(streak);
    }
    if let Some(is_active) = patch.is_active {
        query.push(", is_active = ").push_bind(is_active);
    }
    if let Some(next_checkin_at) = patch.next_checkin_at {
        query.push(", next_checkin_at = ").push_bind(next_checkin_at);
    }
    if let Some(in_replay) = patch.is_in_replay_mode {
        query.push(", is_in_replay_mode = ").push_bind(in_replay);
    }
    if let Some(replay_target) = patch.replay_target {
        query.push(", replay_target = ").push_bind(replay_target);
    }
    if let Some(original_target) = patch.original_target {
        query.push(", original_target = ").push_bind(original_target);
    }

    query.push(" WHERE id = ").push_bind(task_id.to_string());
    query.push(" AND user_id = ").push_bind(user_id.to_string());
    if let Some(version) = expected_version {
        query.push(" AND version = ").push_bind(version);
    }
    query.push(" RETURNING ").push(TASK_COLUMNS);
    query
}

async fn patch_task(
    conn: &mut PgConnection,
    task_id: &str,
    user_id: &str,
    expected_version: Option<i64>,
    patch: &TaskPatch,
) -> PortResult<Task> {
    let mut query = build_task_update(task_id, user_id, expected_version, patch);
    let updated = query
        .build_query_as::<TaskRecord>()
        .fetch_optional(&mut *conn)
        .await
        .map_err(unexpected)?;

    if let Some(record) = updated {
        return record.to_domain();
    }

    // No row matched: tell a stale version apart from a missing task.
    let current: Option<i64> =
        sqlx::query_scalar("SELECT version FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(task_id)
            .bind(user_id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(unexpected)?;

    match (current, expected_version) {
        (Some(actual), Some(expected)) => Err(PortError::Conflict(format!(
            "Task {} is at version {}, expected {}",
            task_id, actual, expected
        ))),
        _ => Err(task_not_found(task_id)),
    }
}

/// Appends a check-in, provided the task exists and belongs to the user.
async fn insert_check_in(conn: &mut PgConnection, record: &NewCheckIn) -> PortResult<CheckIn> {
    let sql = format!(
        "INSERT INTO check_ins ({CHECK_IN_COLUMNS}) \
         SELECT $1, $2, $3, $4, $5, $6, $7, COALESCE($8, NOW()) \
         WHERE EXISTS (SELECT 1 FROM tasks WHERE id = $2 AND user_id = $3) \
         RETURNING {CHECK_IN_COLUMNS}"
    );
    let inserted = sqlx::query_as::<_, CheckInRecord>(&sql)
        .bind(Uuid::new_v4().to_string())
        .bind(&record.task_id)
        .bind(&record.user_id)
        .bind(record.value)
        .bind(record.was_defeat)
        .bind(record.was_replay)
        .bind(record.replay_goal)
        .bind(record.checked_in_at)
        .fetch_optional(&mut *conn)
        .await
        .map_err(unexpected)?;

    inserted
        .map(CheckInRecord::to_domain)
        .ok_or_else(|| task_not_found(&record.task_id))
}

//=========================================================================================
// `TaskStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl TaskStore for DbAdapter {
    async fn get_task(&self, task_id: &str, user_id: &str) -> PortResult<Task> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND user_id = $2");
        let record = sqlx::query_as::<_, TaskRecord>(&sql)
            .bind(task_id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => task_not_found(task_id),
                _ => unexpected(e),
            })?;
        record.to_domain()
    }

    async fn list_tasks(&self, user_id: &str) -> PortResult<Vec<Task>> {
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = $1 AND is_active \
             ORDER BY created_at ASC, id ASC"
        );
        let records = sqlx::query_as::<_, TaskRecord>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;

        records.into_iter().map(TaskRecord::to_domain).collect()
    }

    async fn create_task(
        &self,
        user_id: &str,
        new_task: &NewTask,
        now: DateTime<Utc>,
    ) -> PortResult<Task> {
        let sql = format!(
            "INSERT INTO tasks (id, user_id, name, category, metric_type, target, \
             interval_minutes, next_checkin_at, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {TASK_COLUMNS}"
        );
        let next_checkin_at = now + Duration::minutes(i64::from(new_task.interval_minutes));
        let record = sqlx::query_as::<_, TaskRecord>(&sql)
            .bind(Uuid::new_v4().to_string())
            .bind(user_id)
            .bind(&new_task.name)
            .bind(&new_task.category)
            .bind(new_task.metric_type.as_str())
            .bind(new_task.target)
            .bind(new_task.interval_minutes)
            .bind(next_checkin_at)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        record.to_domain()
    }

    async fn update_task(
        &self,
        task_id: &str,
        user_id: &str,
        patch: &TaskPatch,
    ) -> PortResult<Task> {
        let mut conn = self.pool.acquire().await.map_err(unexpected)?;
        patch_task(&mut conn, task_id, user_id, None, patch).await
    }

    async fn update_task_if_version(
        &self,
        task_id: &str,
        user_id: &str,
        expected_version: i64,
        patch: &TaskPatch,
    ) -> PortResult<Task> {
        let mut conn = self.pool.acquire().await.map_err(unexpected)?;
        patch_task(&mut conn, task_id, user_id, Some(expected_version), patch).await
    }

    async fn delete_task(&self, task_id: &str, user_id: &str) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE tasks SET is_active = FALSE, version = version + 1 \
             WHERE id = $1 AND user_id = $2",
        )
        .bind(task_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(task_not_found(task_id));
        }
        Ok(())
    }

    async fn create_check_in(&self, check_in: &NewCheckIn) -> PortResult<CheckIn> {
        let mut conn = self.pool.acquire().await.map_err(unexpected)?;
        insert_check_in(&mut conn, check_in).await
    }

    async fn record_check_in(
        &self,
        task_id: &str,
        user_id: &str,
        expected_version: i64,
        patch: &TaskPatch,
        check_in: &NewCheckIn,
    ) -> PortResult<(Task, CheckIn)> {
        // Dropping the transaction on any early return rolls both writes back.
        let mut tx = self.pool.begin().await.map_err(unexpected)?;
        let task = patch_task(&mut tx, task_id, user_id, Some(expected_version), patch).await?;
        let check_in = insert_check_in(&mut tx, check_in).await?;
        tx.commit().await.map_err(unexpected)?;
        debug!(task_id, version = task.version, "check-in transaction committed");
        Ok((task, check_in))
    }

    async fn list_check_ins(&self, task_id: &str, user_id: &str) -> PortResult<Vec<CheckIn>> {
        let sql = format!(
            "SELECT {CHECK_IN_COLUMNS} FROM check_ins WHERE task_id = $1 AND user_id = $2 \
             ORDER BY checked_in_at DESC"
        );
        let records = sqlx::query_as::<_, CheckInRecord>(&sql)
            .bind(task_id)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;

        Ok(records.into_iter().map(CheckInRecord::to_domain).collect())
    }

    async fn list_all_check_ins(&self, user_id: &str) -> PortResult<Vec<CheckIn>> {
        let sql = format!(
            "SELECT {CHECK_IN_COLUMNS} FROM check_ins WHERE user_id = $1 \
             ORDER BY checked_in_at DESC"
        );
        let records = sqlx::query_as::<_, CheckInRecord>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;

        Ok(records.into_iter().map(CheckInRecord::to_domain).collect())
    }
}

//=========================================================================================
// `ProfileStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl ProfileStore for DbAdapter {
    async fn get_user(&self, user_id: &str) -> PortResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, email, created_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(UserRecord::to_domain))
    }

    async fn get_or_create_user(&self, user_id: &str, email: Option<&str>) -> PortResult<User> {
        sqlx::query("INSERT INTO users (id, email) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING")
            .bind(user_id)
            .bind(email)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;

        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, email, created_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("User {} not found", user_id)),
            _ => unexpected(e),
        })?;

        Ok(record.to_domain())
    }

    async fn list_categories(&self, user_id: &str) -> PortResult<Vec<Category>> {
        let records = sqlx::query_as::<_, CategoryRecord>(
            "SELECT id, user_id, name, created_at FROM categories WHERE user_id = $1 \
             ORDER BY created_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(CategoryRecord::to_domain).collect())
    }

    async fn create_category(&self, user_id: &str, name: &str) -> PortResult<Category> {
        let record = sqlx::query_as::<_, CategoryRecord>(
            "INSERT INTO categories (id, user_id, name) VALUES ($1, $2, $3) \
             RETURNING id, user_id, name, created_at",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn list_journal_entries(&self, user_id: &str) -> PortResult<Vec<JournalEntry>> {
        let records = sqlx::query_as::<_, JournalEntryRecord>(
            "SELECT id, user_id, content, created_at FROM journal_entries WHERE user_id = $1 \
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(JournalEntryRecord::to_domain).collect())
    }

    async fn create_journal_entry(
        &self,
        user_id: &str,
        content: &str,
    ) -> PortResult<JournalEntry> {
        let record = sqlx::query_as::<_, JournalEntryRecord>(
            "INSERT INTO journal_entries (id, user_id, content) VALUES ($1, $2, $3) \
             RETURNING id, user_id, content, created_at",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn get_journal_entry(&self, entry_id: &str, user_id: &str) -> PortResult<JournalEntry> {
        let record = sqlx::query_as::<_, JournalEntryRecord>(
            "SELECT id, user_id, content, created_at FROM journal_entries \
             WHERE id = $1 AND user_id = $2",
        )
        .bind(entry_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                PortError::NotFound(format!("Journal entry {} not found", entry_id))
            }
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }
}
