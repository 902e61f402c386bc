//! services/api/src/web/tasks.rs
//!
//! Task CRUD, the due scan, the per-task clock and the replay commit.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::Utc;
use momentum_core::clock;
use std::sync::Arc;

use crate::web::dto::{
    CommitReplayRequest, CreateTaskRequest, PendingCheckInResponse, TaskClockResponse,
    TaskResponse, UpdateTaskRequest,
};
use crate::web::rest::{domain_error, port_error, HandlerResult};
use crate::web::state::{AppState, AuthUser};

/// List the caller's active tasks.
#[utoipa::path(
    get,
    path = "/api/tasks",
    responses(
        (status = 200, description = "Active tasks", body = Vec<TaskResponse>),
        (status = 401, description = "Missing x-user-id header")
    )
)]
pub async fn list_tasks_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> HandlerResult<Json<Vec<TaskResponse>>> {
    let tasks = state
        .tasks
        .list_tasks(&user_id)
        .await
        .map_err(|e| port_error("Failed to fetch tasks", e))?;
    Ok(Json(tasks.into_iter().map(Into::into).collect()))
}

/// Create a task. It becomes due one interval from now.
#[utoipa::path(
    post,
    path = "/api/tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = TaskResponse),
        (status = 400, description = "Invalid task data")
    )
)]
pub async fn create_task_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(req): Json<CreateTaskRequest>,
) -> HandlerResult<impl IntoResponse> {
    let new_task = req
        .into_new_task()
        .map_err(|e| domain_error("Invalid task data", e))?;
    let task = state
        .check_ins
        .create_task(&user_id, &new_task, Utc::now())
        .await
        .map_err(|e| domain_error("Failed to create task", e))?;
    Ok((StatusCode::CREATED, Json(TaskResponse::from(task))))
}

/// Tasks whose check-in time has passed, most overdue first.
#[utoipa::path(
    get,
    path = "/api/tasks/due",
    responses((status = 200, description = "Due tasks", body = Vec<PendingCheckInResponse>))
)]
pub async fn due_tasks_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> HandlerResult<Json<Vec<PendingCheckInResponse>>> {
    let pending = state
        .check_ins
        .due_check_ins(&user_id, Utc::now())
        .await
        .map_err(|e| domain_error("Failed to scan due tasks", e))?;
    Ok(Json(pending.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/tasks/{id}",
    params(("id" = String, Path, description = "Task id")),
    responses(
        (status = 200, description = "The task", body = TaskResponse),
        (status = 404, description = "Task not found")
    )
)]
pub async fn get_task_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(task_id): Path<String>,
) -> HandlerResult<Json<TaskResponse>> {
    let task = state
        .tasks
        .get_task(&task_id, &user_id)
        .await
        .map_err(|e| port_error("Failed to fetch task", e))?;
    Ok(Json(task.into()))
}

/// Rename, retarget, change the interval or (de)activate a task.
#[utoipa::path(
    patch,
    path = "/api/tasks/{id}",
    params(("id" = String, Path, description = "Task id")),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Updated task", body = TaskResponse),
        (status = 400, description = "Invalid update"),
        (status = 404, description = "Task not found"),
        (status = 409, description = "Concurrent update conflict")
    )
)]
pub async fn update_task_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(task_id): Path<String>,
    Json(req): Json<UpdateTaskRequest>,
) -> HandlerResult<Json<TaskResponse>> {
    let patch = req
        .into_patch()
        .map_err(|e| domain_error("Invalid task update", e))?;
    let task = state
        .check_ins
        .edit_task(&task_id, &user_id, &patch)
        .await
        .map_err(|e| domain_error("Failed to update task", e))?;
    Ok(Json(task.into()))
}

/// Soft-delete a task. Its check-in history is kept.
#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    params(("id" = String, Path, description = "Task id")),
    responses(
        (status = 204, description = "Task deactivated"),
        (status = 404, description = "Task not found")
    )
)]
pub async fn delete_task_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(task_id): Path<String>,
) -> HandlerResult<StatusCode> {
    state
        .tasks
        .delete_task(&task_id, &user_id)
        .await
        .map_err(|e| port_error("Failed to delete task", e))?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/tasks/{id}/clock",
    params(("id" = String, Path, description = "Task id")),
    responses(
        (status = 200, description = "Due-ness of the task right now", body = TaskClockResponse),
        (status = 404, description = "Task not found")
    )
)]
pub async fn task_clock_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(task_id): Path<String>,
) -> HandlerResult<Json<TaskClockResponse>> {
    let task = state
        .tasks
        .get_task(&task_id, &user_id)
        .await
        .map_err(|e| port_error("Failed to fetch task", e))?;
    let now = Utc::now();
    Ok(Json(TaskClockResponse {
        is_due: clock::is_due(&task, now),
        overdue_minutes: clock::overdue_minutes(&task, now),
        progress: clock::progress_fraction(&task, now),
        task_id: task.id,
    }))
}

/// Commit to a reduced replay goal after a defeat.
#[utoipa::path(
    post,
    path = "/api/tasks/{id}/replay",
    params(("id" = String, Path, description = "Task id")),
    request_body = CommitReplayRequest,
    responses(
        (status = 200, description = "Task now in replay mode", body = TaskResponse),
        (status = 400, description = "Invalid replay goal"),
        (status = 404, description = "Task not found"),
        (status = 409, description = "Concurrent update conflict")
    )
)]
pub async fn commit_replay_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(task_id): Path<String>,
    Json(req): Json<CommitReplayRequest>,
) -> HandlerResult<Json<TaskResponse>> {
    let task = state
        .check_ins
        .commit_replay(&task_id, &user_id, req.replay_goal, Utc::now())
        .await
        .map_err(|e| domain_error("Failed to commit replay", e))?;
    Ok(Json(task.into()))
}
