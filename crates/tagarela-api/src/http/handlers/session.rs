//! Session HTTP handlers.
//!
//! Endpoints:
//! - GET    /api/v1/sessions/{id}/messages - Stored messages, oldest first
//! - DELETE /api/v1/sessions/{id}          - Delete a session and its messages

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use tagarela_core::chat::repository::ChatRepository;

use crate::http::error::AppError;
use crate::http::response::{Document, MessageListDocument, MessageListMeta, Resource};
use crate::state::AppState;

/// Query parameters for message listing.
#[derive(Debug, Deserialize)]
pub struct MessageListQuery {
    #[serde(default = "default_message_limit")]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

fn default_message_limit() -> Option<i64> {
    Some(100)
}

/// Parse a UUID from a path parameter, returning a 400 error on invalid format.
fn parse_uuid(s: &str) -> Result<Uuid, AppError> {
    s.parse::<Uuid>()
        .map_err(|_| AppError::Validation(format!("Invalid UUID: {s}")))
}

/// GET /api/v1/sessions/{id}/messages - Get messages for a session.
pub async fn get_messages(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    query: Result<Query<MessageListQuery>, QueryRejection>,
) -> Result<Json<MessageListDocument>, AppError> {
    let sid = parse_uuid(&session_id)?;
    let Query(query) = query.map_err(|rejection| AppError::Validation(rejection.body_text()))?;

    if query.limit.is_some_and(|l| l < 0) || query.offset.is_some_and(|o| o < 0) {
        return Err(AppError::Validation(
            "limit and offset must not be negative".to_string(),
        ));
    }

    let repo = state.orchestrator.chat_repo();

    let session = repo
        .get_session(&sid)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Session {sid} not found")))?;

    let messages = repo.get_messages(&sid, query.limit, query.offset).await?;

    Ok(Json(Document {
        data: messages.iter().map(Resource::from).collect(),
        meta: MessageListMeta {
            session_uuid: session.id.to_string(),
            message_count: session.message_count,
        },
    }))
}

/// DELETE /api/v1/sessions/{id} - Delete a session and its messages.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let sid = parse_uuid(&session_id)?;

    state.orchestrator.chat_repo().delete_session(&sid).await?;
    tracing::info!(session_id = %sid, "Session deleted");

    Ok(StatusCode::NO_CONTENT)
}
