//! services/api/src/web/dto.rs
//!
//! Wire payloads for the REST API. Field names are camelCase; ids are opaque
//! strings and timestamps are RFC 3339.

use chrono::{DateTime, NaiveDate, Utc};
use momentum_core::domain::{Category, CheckIn, JournalEntry, MetricType, Task, TaskPatch};
use momentum_core::{
    CheckInReceipt, DayActivity, DomainError, PendingCheckIn, ReplayOffer, StatsOverview,
    TaskStats, TaskStatsEntry,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

//=========================================================================================
// Requests
//=========================================================================================

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub name: String,
    pub category: String,
    /// Either `"duration"` or `"count"`.
    pub metric_type: String,
    pub target: i32,
    #[serde(alias = "interval")]
    pub interval_minutes: i32,
}

impl CreateTaskRequest {
    pub fn into_new_task(self) -> Result<momentum_core::NewTask, DomainError> {
        Ok(momentum_core::NewTask {
            metric_type: self.metric_type.parse::<MetricType>()?,
            name: self.name,
            category: self.category,
            target: self.target,
            interval_minutes: self.interval_minutes,
        })
    }
}

/// A direct edit. Streak, schedule and replay fields are owned by check-ins
/// and cannot be set here.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub metric_type: Option<String>,
    pub target: Option<i32>,
    #[serde(alias = "interval")]
    pub interval_minutes: Option<i32>,
    pub is_active: Option<bool>,
}

impl UpdateTaskRequest {
    pub fn into_patch(self) -> Result<TaskPatch, DomainError> {
        let metric_type = self
            .metric_type
            .map(|raw| raw.parse::<MetricType>())
            .transpose()?;
        Ok(TaskPatch {
            name: self.name,
            category: self.category,
            metric_type,
            target: self.target,
            interval_minutes: self.interval_minutes,
            is_active: self.is_active,
            ..TaskPatch::default()
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRequest {
    pub task_id: String,
    pub value: i32,
    #[serde(default)]
    pub was_defeat: bool,
    #[serde(default)]
    pub was_replay: bool,
    pub replay_goal: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommitReplayRequest {
    pub replay_goal: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCategoryRequest {
    pub name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateJournalEntryRequest {
    pub content: String,
}

//=========================================================================================
// Responses
//=========================================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub category: String,
    pub metric_type: String,
    pub target: i32,
    pub interval_minutes: i32,
    pub streak: i32,
    pub is_active: bool,
    pub next_checkin_at: DateTime<Utc>,
    pub is_in_replay_mode: bool,
    pub replay_target: Option<i32>,
    pub original_target: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            user_id: task.user_id,
            name: task.name,
            category: task.category,
            metric_type: task.metric_type.to_string(),
            target: task.target,
            interval_minutes: task.interval_minutes,
            streak: task.streak,
            is_active: task.is_active,
            next_checkin_at: task.next_checkin_at,
            is_in_replay_mode: task.is_in_replay_mode,
            replay_target: task.replay_target,
            original_target: task.original_target,
            created_at: task.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckInResponse {
    pub id: String,
    pub task_id: String,
    pub user_id: String,
    pub value: i32,
    pub was_defeat: bool,
    pub was_replay: bool,
    pub replay_goal: Option<i32>,
    pub checked_in_at: DateTime<Utc>,
}

impl From<CheckIn> for CheckInResponse {
    fn from(check_in: CheckIn) -> Self {
        Self {
            id: check_in.id,
            task_id: check_in.task_id,
            user_id: check_in.user_id,
            value: check_in.value,
            was_defeat: check_in.was_defeat,
            was_replay: check_in.was_replay,
            replay_goal: check_in.replay_goal,
            checked_in_at: check_in.checked_in_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplayOfferResponse {
    pub original_target: i32,
    pub suggested_goal: i32,
}

impl From<ReplayOffer> for ReplayOfferResponse {
    fn from(offer: ReplayOffer) -> Self {
        Self {
            original_target: offer.original_target,
            suggested_goal: offer.suggested_goal,
        }
    }
}

/// The response sent after a check-in is recorded.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckInResultResponse {
    pub check_in: CheckInResponse,
    pub task: TaskResponse,
    /// Present after a defeat.
    pub replay_offer: Option<ReplayOfferResponse>,
}

impl From<CheckInReceipt> for CheckInResultResponse {
    fn from(receipt: CheckInReceipt) -> Self {
        Self {
            check_in: receipt.check_in.into(),
            task: receipt.task.into(),
            replay_offer: receipt.replay_offer.map(Into::into),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PendingCheckInResponse {
    pub task: TaskResponse,
    pub overdue_minutes: i64,
}

impl From<PendingCheckIn> for PendingCheckInResponse {
    fn from(pending: PendingCheckIn) -> Self {
        Self {
            task: pending.task.into(),
            overdue_minutes: pending.overdue_minutes,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskClockResponse {
    pub task_id: String,
    pub is_due: bool,
    pub overdue_minutes: i64,
    /// Percentage of the current interval elapsed.
    pub progress: f64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatsResponse {
    pub today_total: i64,
    pub week_total: i64,
    pub month_total: i64,
    pub replay_success_rate: f64,
}

impl From<TaskStats> for TaskStatsResponse {
    fn from(stats: TaskStats) -> Self {
        Self {
            today_total: stats.today_total,
            week_total: stats.week_total,
            month_total: stats.month_total,
            replay_success_rate: stats.replay_success_rate,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatsEntryResponse {
    pub task_id: String,
    pub task_name: String,
    pub today_total: i64,
    pub week_total: i64,
    pub month_total: i64,
    pub replay_success_rate: f64,
}

impl From<TaskStatsEntry> for TaskStatsEntryResponse {
    fn from(entry: TaskStatsEntry) -> Self {
        Self {
            task_id: entry.task_id,
            task_name: entry.task_name,
            today_total: entry.stats.today_total,
            week_total: entry.stats.week_total,
            month_total: entry.stats.month_total,
            replay_success_rate: entry.stats.replay_success_rate,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStatsResponse {
    pub momentum_score: u32,
    pub replay_success_rate: u32,
    pub task_stats: Vec<TaskStatsEntryResponse>,
}

impl From<StatsOverview> for GlobalStatsResponse {
    fn from(overview: StatsOverview) -> Self {
        Self {
            momentum_score: overview.global.momentum_score,
            replay_success_rate: overview.global.replay_success_rate,
            task_stats: overview.per_task.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DayActivityResponse {
    pub date: NaiveDate,
    pub total: i64,
    pub had_defeat: bool,
}

impl From<DayActivity> for DayActivityResponse {
    fn from(day: DayActivity) -> Self {
        Self {
            date: day.date,
            total: day.total,
            had_defeat: day.had_defeat,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            created_at: category.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntryResponse {
    pub id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<JournalEntry> for JournalEntryResponse {
    fn from(entry: JournalEntry) -> Self {
        Self {
            id: entry.id,
            content: entry.content,
            created_at: entry.created_at,
        }
    }
}
