//! services/api/src/web/rest.rs
//!
//! Contains the shared pieces of the REST API: the error mapping used by every
//! handler, the health check, and the master definition for the OpenAPI
//! specification.

use axum::{http::StatusCode, Json};
use momentum_core::{DomainError, PortError};
use tracing::{error, warn};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::web::dto::*;
use crate::web::{check_ins, insights, profile, tasks};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Momentum API",
        description = "Habit check-ins, streaks and replays"
    ),
    paths(
        health_handler,
        tasks::list_tasks_handler,
        tasks::create_task_handler,
        tasks::due_tasks_handler,
        tasks::get_task_handler,
        tasks::update_task_handler,
        tasks::delete_task_handler,
        tasks::task_clock_handler,
        tasks::commit_replay_handler,
        check_ins::create_check_in_handler,
        check_ins::list_task_check_ins_handler,
        check_ins::list_all_check_ins_handler,
        insights::task_stats_handler,
        insights::global_stats_handler,
        insights::activity_handler,
        profile::list_categories_handler,
        profile::create_category_handler,
        profile::list_journal_handler,
        profile::create_journal_handler,
        profile::get_journal_entry_handler,
    ),
    components(
        schemas(
            ErrorBody,
            CreateTaskRequest,
            UpdateTaskRequest,
            CheckInRequest,
            CommitReplayRequest,
            CreateCategoryRequest,
            CreateJournalEntryRequest,
            TaskResponse,
            CheckInResponse,
            ReplayOfferResponse,
            CheckInResultResponse,
            PendingCheckInResponse,
            TaskClockResponse,
            TaskStatsResponse,
            TaskStatsEntryResponse,
            GlobalStatsResponse,
            DayActivityResponse,
            CategoryResponse,
            JournalEntryResponse,
        )
    ),
    modifiers(&UserIdHeader),
    security(("user_id" = [])),
    tags(
        (name = "Momentum API", description = "Habit tracking with check-ins, streaks and replays.")
    )
)]
pub struct ApiDoc;

/// Documents the `x-user-id` header that authenticates every `/api` route.
struct UserIdHeader;

impl Modify for UserIdHeader {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "user_id",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("x-user-id"))),
            );
        }
    }
}

//=========================================================================================
// Error Mapping
//=========================================================================================

pub type HandlerError = (StatusCode, Json<ErrorBody>);

pub type HandlerResult<T> = Result<T, HandlerError>;

pub fn error_response(status: StatusCode, message: impl Into<String>) -> HandlerError {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}

/// Maps a core error onto a status code. Persistence failures are logged and
/// reported with `context` only, so storage details do not leak to clients.
pub fn domain_error(context: &str, err: DomainError) -> HandlerError {
    match err {
        DomainError::Validation(_) => {
            warn!("{}: {}", context, err);
            error_response(StatusCode::BAD_REQUEST, err.to_string())
        }
        DomainError::NotFound(_) => error_response(StatusCode::NOT_FOUND, err.to_string()),
        DomainError::ConcurrencyConflict(_) => {
            warn!("{}: {}", context, err);
            error_response(StatusCode::CONFLICT, err.to_string())
        }
        DomainError::Persistence(_) => {
            error!("{}: {:?}", context, err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, context)
        }
    }
}

pub fn port_error(context: &str, err: PortError) -> HandlerError {
    domain_error(context, err.into())
}

//=========================================================================================
// Health
//=========================================================================================

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health_handler() -> StatusCode {
    StatusCode::OK
}
