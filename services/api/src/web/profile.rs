//! services/api/src/web/profile.rs
//!
//! Per-user side records: category labels and journal entries.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use std::sync::Arc;

use crate::web::dto::{
    CategoryResponse, CreateCategoryRequest, CreateJournalEntryRequest, JournalEntryResponse,
};
use crate::web::rest::{error_response, port_error, HandlerResult};
use crate::web::state::{AppState, AuthUser};

//=========================================================================================
// Categories
//=========================================================================================

#[utoipa::path(
    get,
    path = "/api/categories",
    responses((status = 200, description = "Categories", body = Vec<CategoryResponse>))
)]
pub async fn list_categories_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> HandlerResult<Json<Vec<CategoryResponse>>> {
    let categories = state
        .profiles
        .list_categories(&user_id)
        .await
        .map_err(|e| port_error("Failed to fetch categories", e))?;
    Ok(Json(categories.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Empty name")
    )
)]
pub async fn create_category_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(req): Json<CreateCategoryRequest>,
) -> HandlerResult<impl IntoResponse> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Category name must not be empty",
        ));
    }
    let category = state
        .profiles
        .create_category(&user_id, name)
        .await
        .map_err(|e| port_error("Failed to create category", e))?;
    Ok((StatusCode::CREATED, Json(CategoryResponse::from(category))))
}

//=========================================================================================
// Journal
//=========================================================================================

#[utoipa::path(
    get,
    path = "/api/journal",
    responses((status = 200, description = "Journal entries, newest first", body = Vec<JournalEntryResponse>))
)]
pub async fn list_journal_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> HandlerResult<Json<Vec<JournalEntryResponse>>> {
    let entries = state
        .profiles
        .list_journal_entries(&user_id)
        .await
        .map_err(|e| port_error("Failed to fetch journal entries", e))?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/journal",
    request_body = CreateJournalEntryRequest,
    responses(
        (status = 201, description = "Entry saved", body = JournalEntryResponse),
        (status = 400, description = "Empty content")
    )
)]
pub async fn create_journal_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(req): Json<CreateJournalEntryRequest>,
) -> HandlerResult<impl IntoResponse> {
    let content = req.content.trim();
    if content.is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Journal entry must not be empty",
        ));
    }
    let entry = state
        .profiles
        .create_journal_entry(&user_id, content)
        .await
        .map_err(|e| port_error("Failed to save journal entry", e))?;
    Ok((StatusCode::CREATED, Json(JournalEntryResponse::from(entry))))
}

#[utoipa::path(
    get,
    path = "/api/journal/{id}",
    params(("id" = String, Path, description = "Journal entry id")),
    responses(
        (status = 200, description = "The entry", body = JournalEntryResponse),
        (status = 404, description = "Entry not found")
    )
)]
pub async fn get_journal_entry_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(entry_id): Path<String>,
) -> HandlerResult<Json<JournalEntryResponse>> {
    let entry = state
        .profiles
        .get_journal_entry(&entry_id, &user_id)
        .await
        .map_err(|e| port_error("Failed to fetch journal entry", e))?;
    Ok(Json(entry.into()))
}
