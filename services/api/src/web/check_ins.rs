//! services/api/src/web/check_ins.rs
//!
//! Check-in submission and history.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::Utc;
use momentum_core::CheckInReport;
use std::sync::Arc;

use crate::web::dto::{CheckInRequest, CheckInResponse, CheckInResultResponse};
use crate::web::rest::{domain_error, port_error, HandlerResult};
use crate::web::state::{AppState, AuthUser};

/// Submit a check-in for a task.
///
/// The task's streak, target, replay fields and next check-in time are updated
/// together with the appended record. A defeat carries a replay offer.
#[utoipa::path(
    post,
    path = "/api/check-ins",
    request_body = CheckInRequest,
    responses(
        (status = 201, description = "Check-in recorded", body = CheckInResultResponse),
        (status = 400, description = "Invalid check-in data"),
        (status = 404, description = "Task not found"),
        (status = 409, description = "Concurrent update conflict")
    )
)]
pub async fn create_check_in_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(req): Json<CheckInRequest>,
) -> HandlerResult<impl IntoResponse> {
    let report = CheckInReport {
        value: req.value,
        was_defeat: req.was_defeat,
        was_replay: req.was_replay,
        replay_goal: req.replay_goal,
    };
    let receipt = state
        .check_ins
        .process_check_in(&req.task_id, &user_id, &report, Utc::now())
        .await
        .map_err(|e| domain_error("Failed to record check-in", e))?;
    Ok((
        StatusCode::CREATED,
        Json(CheckInResultResponse::from(receipt)),
    ))
}

/// Check-in history for one task, most recent first.
#[utoipa::path(
    get,
    path = "/api/tasks/{id}/check-ins",
    params(("id" = String, Path, description = "Task id")),
    responses(
        (status = 200, description = "Check-ins", body = Vec<CheckInResponse>),
        (status = 404, description = "Task not found")
    )
)]
pub async fn list_task_check_ins_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(task_id): Path<String>,
) -> HandlerResult<Json<Vec<CheckInResponse>>> {
    state
        .tasks
        .get_task(&task_id, &user_id)
        .await
        .map_err(|e| port_error("Failed to fetch task", e))?;
    let history = state
        .tasks
        .list_check_ins(&task_id, &user_id)
        .await
        .map_err(|e| port_error("Failed to fetch check-ins", e))?;
    Ok(Json(history.into_iter().map(Into::into).collect()))
}

/// Every check-in the caller has made, most recent first.
#[utoipa::path(
    get,
    path = "/api/check-ins/all",
    responses((status = 200, description = "Check-ins", body = Vec<CheckInResponse>))
)]
pub async fn list_all_check_ins_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> HandlerResult<Json<Vec<CheckInResponse>>> {
    let history = state
        .tasks
        .list_all_check_ins(&user_id)
        .await
        .map_err(|e| port_error("Failed to fetch check-ins", e))?;
    Ok(Json(history.into_iter().map(Into::into).collect()))
}
