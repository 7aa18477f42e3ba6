//! Chat message HTTP handler.
//!
//! Endpoint:
//! - POST /api/v1/messages - Send a message and receive the assistant's reply

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use tracing::debug;

use crate::http::error::AppError;
use crate::http::extractors::session::SessionHeader;
use crate::http::response::{MESSAGES_TYPE, MessageRequestDocument, ReplyDocument};
use crate::state::AppState;

/// POST /api/v1/messages - Run one conversation cycle.
///
/// The `X-Session-UUID` header wins over `data.meta.session_uuid`. Without
/// either a new session is started.
pub async fn post_message(
    State(state): State<AppState>,
    SessionHeader(header_session): SessionHeader,
    payload: Result<Json<MessageRequestDocument>, JsonRejection>,
) -> Result<Json<ReplyDocument>, AppError> {
    let Json(document) = payload.map_err(|rejection| AppError::Validation(rejection.body_text()))?;
    let data = document.data;

    if let Some(kind) = data.kind.as_deref().filter(|k| *k != MESSAGES_TYPE) {
        return Err(AppError::Validation(format!(
            "Unsupported resource type '{kind}', expected '{MESSAGES_TYPE}'"
        )));
    }

    let content = data.attributes.content;
    if content.trim().is_empty() {
        return Err(AppError::Validation("Message content must not be empty".to_string()));
    }

    let session_identifier =
        header_session.or_else(|| data.meta.and_then(|meta| meta.session_uuid));
    debug!(has_session = session_identifier.is_some(), "Processing inbound message");

    let outcome = state
        .orchestrator
        .process(session_identifier.as_deref(), &content)
        .await?;

    Ok(Json(ReplyDocument::from_outcome(&outcome)))
}
