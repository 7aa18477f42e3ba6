//! Axum router configuration with middleware.
//!
//! All API routes are under `/api/v1/`.
//! Middleware: CORS, tracing, panic recovery.

use std::any::Any;

use axum::Router;
use axum::http::Uri;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use tagarela_types::error::ChatError;

use crate::http::error::AppError;
use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods(AnyOrigin)
        .allow_headers(AnyOrigin);

    let api_routes = Router::new()
        .route("/messages", post(handlers::message::post_message))
        .route(
            "/sessions/{id}/messages",
            get(handlers::session::get_messages),
        )
        .route("/sessions/{id}", delete(handlers::session::delete_session));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .fallback(route_not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Render a handler panic as the generic 500 error document.
fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };

    AppError::Chat(ChatError::Unexpected(detail)).into_response()
}

/// Any path without a route.
async fn route_not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}

/// GET /health - Simple health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
