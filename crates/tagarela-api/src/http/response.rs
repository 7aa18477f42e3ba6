//! JSON:API document shapes for requests and responses.
//!
//! Success:
//! ```json
//! {
//!   "data": { "type": "messages", "id": "...", "attributes": { ... } },
//!   "meta": { "session_uuid": "..." }
//! }
//! ```
//!
//! Failure:
//! ```json
//! { "errors": [{ "status": "503", "title": "Service Unavailable", "detail": "..." }] }
//! ```

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use tagarela_types::chat::{ChatMessage, ChatOutcome};

/// JSON:API resource type for chat messages.
pub const MESSAGES_TYPE: &str = "messages";

/// Top-level success document.
#[derive(Debug, Serialize)]
pub struct Document<T: Serialize, M: Serialize> {
    pub data: T,
    pub meta: M,
}

/// A JSON:API resource object.
#[derive(Debug, Serialize)]
pub struct Resource<A: Serialize> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub id: String,
    pub attributes: A,
}

/// One prior turn as echoed back to the caller.
#[derive(Debug, Serialize)]
pub struct HistoryItem {
    pub role: String,
    pub text: String,
}

/// Attributes of the reply resource returned by `POST /messages`.
#[derive(Debug, Serialize)]
pub struct ReplyAttributes {
    pub content: String,
    pub history: Vec<HistoryItem>,
}

/// Attributes of a stored message returned by the session listing.
#[derive(Debug, Serialize)]
pub struct StoredMessageAttributes {
    pub role: String,
    pub content: String,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct SessionMeta {
    pub session_uuid: String,
}

#[derive(Debug, Serialize)]
pub struct MessageListMeta {
    pub session_uuid: String,
    pub message_count: u32,
}

pub type ReplyDocument = Document<Resource<ReplyAttributes>, SessionMeta>;
pub type MessageListDocument = Document<Vec<Resource<StoredMessageAttributes>>, MessageListMeta>;

impl ReplyDocument {
    /// Reply document with a fresh resource id.
    pub fn from_outcome(outcome: &ChatOutcome) -> Self {
        let history = outcome
            .history_used
            .iter()
            .map(|m| HistoryItem {
                role: m.role.to_string(),
                text: m.content.clone(),
            })
            .collect();

        Document {
            data: Resource {
                kind: MESSAGES_TYPE,
                id: uuid::Uuid::now_v7().to_string(),
                attributes: ReplyAttributes {
                    content: outcome.reply_text.clone(),
                    history,
                },
            },
            meta: SessionMeta {
                session_uuid: outcome.session_id.to_string(),
            },
        }
    }
}

impl From<&ChatMessage> for Resource<StoredMessageAttributes> {
    fn from(message: &ChatMessage) -> Self {
        Resource {
            kind: MESSAGES_TYPE,
            id: message.id.to_string(),
            attributes: StoredMessageAttributes {
                role: message.role.to_string(),
                content: message.content.clone(),
                created_at: message.created_at.to_rfc3339(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Inbound request document
// ---------------------------------------------------------------------------

/// Body of `POST /api/v1/messages`.
#[derive(Debug, Deserialize)]
pub struct MessageRequestDocument {
    pub data: MessageRequestData,
}

#[derive(Debug, Deserialize)]
pub struct MessageRequestData {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub attributes: MessageRequestAttributes,
    #[serde(default)]
    pub meta: Option<MessageRequestMeta>,
}

#[derive(Debug, Deserialize)]
pub struct MessageRequestAttributes {
    pub content: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct MessageRequestMeta {
    pub session_uuid: Option<String>,
}

// ---------------------------------------------------------------------------
// Error document
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ErrorDocument {
    pub errors: Vec<ErrorObject>,
}

#[derive(Debug, Serialize)]
pub struct ErrorObject {
    pub status: String,
    pub title: String,
    pub detail: String,
}

impl ErrorDocument {
    /// Document carrying one error object for `status`.
    pub fn single(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            errors: vec![ErrorObject {
                status: status.as_str().to_string(),
                title: status.canonical_reason().unwrap_or("Error").to_string(),
                detail: detail.into(),
            }],
        }
    }

    pub fn into_response_with(self, status: StatusCode) -> Response {
        let body = serde_json::to_string(&self).unwrap_or_else(|_| {
            r#"{"errors":[{"status":"500","title":"Internal Server Error","detail":"Failed to serialize error"}]}"#.to_string()
        });

        (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
    }
}
