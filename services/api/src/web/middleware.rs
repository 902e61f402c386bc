//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
    Json,
};
use std::sync::Arc;
use tracing::{error, info};

use crate::web::dto::ErrorBody;
use crate::web::state::{AppState, AuthUser};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";

fn unauthorized(reason: &str) -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorBody {
            error: format!("Unauthorized - {}", reason),
        }),
    )
}

/// Middleware that trusts the upstream-authenticated `x-user-id` header.
///
/// A user record is created on first sight of an id. The id is inserted into
/// request extensions as `AuthUser`; a missing header returns 401.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorBody>)> {
    // 1. Extract the user id header
    let user_id = req
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| unauthorized("No user ID provided"))?;

    let email = req
        .headers()
        .get(USER_EMAIL_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    // 2. Create the user record on first sight
    let known = state.profiles.get_user(&user_id).await.map_err(|e| {
        error!("Failed to look up user: {:?}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody {
                error: "Internal server error".to_string(),
            }),
        )
    })?;
    if known.is_none() {
        state
            .profiles
            .get_or_create_user(&user_id, email.as_deref())
            .await
            .map_err(|e| {
                error!("Failed to create user: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody {
                        error: "Internal server error".to_string(),
                    }),
                )
            })?;
        info!(user_id = %user_id, "registered new user");
    }

    // 3. Insert the caller into request extensions
    req.extensions_mut().insert(AuthUser(user_id));

    // 4. Continue to the handler
    Ok(next.run(req).await)
}
