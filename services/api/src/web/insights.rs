//! services/api/src/web/insights.rs
//!
//! Read-only rollups: per-task stats, the dashboard overview and the
//! activity calendar.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::Utc;
use std::sync::Arc;

use crate::web::dto::{DayActivityResponse, GlobalStatsResponse, TaskStatsResponse};
use crate::web::rest::{domain_error, HandlerResult};
use crate::web::state::{AppState, AuthUser};

#[utoipa::path(
    get,
    path = "/api/tasks/{id}/stats",
    params(("id" = String, Path, description = "Task id")),
    responses(
        (status = 200, description = "Totals for the task", body = TaskStatsResponse),
        (status = 404, description = "Task not found")
    )
)]
pub async fn task_stats_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(task_id): Path<String>,
) -> HandlerResult<Json<TaskStatsResponse>> {
    let stats = state
        .check_ins
        .task_stats(&task_id, &user_id, Utc::now())
        .await
        .map_err(|e| domain_error("Failed to fetch stats", e))?;
    Ok(Json(stats.into()))
}

/// Momentum score, average replay success and the per-task breakdown.
#[utoipa::path(
    get,
    path = "/api/stats",
    responses((status = 200, description = "Dashboard stats", body = GlobalStatsResponse))
)]
pub async fn global_stats_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> HandlerResult<Json<GlobalStatsResponse>> {
    let overview = state
        .check_ins
        .global_stats(&user_id, Utc::now())
        .await
        .map_err(|e| domain_error("Failed to fetch stats", e))?;
    Ok(Json(overview.into()))
}

/// Daily totals for the activity calendar, oldest day first.
#[utoipa::path(
    get,
    path = "/api/activity",
    responses((status = 200, description = "Daily activity", body = Vec<DayActivityResponse>))
)]
pub async fn activity_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> HandlerResult<Json<Vec<DayActivityResponse>>> {
    let days = state
        .check_ins
        .daily_activity(&user_id)
        .await
        .map_err(|e| domain_error("Failed to fetch activity", e))?;
    Ok(Json(days.into_iter().map(Into::into).collect()))
}
