pub mod check_ins;
pub mod dto;
pub mod insights;
pub mod middleware;
pub mod profile;
pub mod rest;
pub mod state;
pub mod tasks;

// Re-export the pieces the binary needs to build the web server.
pub use middleware::require_auth;
pub use rest::ApiDoc;
pub use state::{AppState, AuthUser};

use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            ACCEPT,
            HeaderName::from_static(middleware::USER_ID_HEADER),
            HeaderName::from_static(middleware::USER_EMAIL_HEADER),
        ]);
    match origin.parse::<HeaderValue>() {
        Ok(origin) => layer.allow_origin(origin),
        Err(e) => {
            warn!("Ignoring invalid CORS origin '{}': {}", origin, e);
            layer
        }
    }
}

/// Builds the full application router: public routes, authenticated `/api`
/// routes, and the Swagger UI.
pub fn build_router(app_state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new().route("/health", get(rest::health_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route(
            "/api/tasks",
            get(tasks::list_tasks_handler).post(tasks::create_task_handler),
        )
        .route("/api/tasks/due", get(tasks::due_tasks_handler))
        .route(
            "/api/tasks/{id}",
            get(tasks::get_task_handler)
                .patch(tasks::update_task_handler)
                .delete(tasks::delete_task_handler),
        )
        .route("/api/tasks/{id}/clock", get(tasks::task_clock_handler))
        .route("/api/tasks/{id}/replay", post(tasks::commit_replay_handler))
        .route(
            "/api/tasks/{id}/check-ins",
            get(check_ins::list_task_check_ins_handler),
        )
        .route("/api/tasks/{id}/stats", get(insights::task_stats_handler))
        .route("/api/check-ins", post(check_ins::create_check_in_handler))
        .route(
            "/api/check-ins/all",
            get(check_ins::list_all_check_ins_handler),
        )
        .route("/api/activity", get(insights::activity_handler))
        .route("/api/stats", get(insights::global_stats_handler))
        .route(
            "/api/categories",
            get(profile::list_categories_handler).post(profile::create_category_handler),
        )
        .route(
            "/api/journal",
            get(profile::list_journal_handler).post(profile::create_journal_handler),
        )
        .route("/api/journal/{id}", get(profile::get_journal_entry_handler))
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    let cors = cors_layer(&app_state.config.cors_origin);

    // Combine API routes
    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
