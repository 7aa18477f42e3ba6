//! Application error type mapping to HTTP status codes and JSON:API error documents.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{error, warn};

use tagarela_types::error::{ChatError, ErrorSeverity, RepositoryError};

use crate::http::response::ErrorDocument;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Failure from an orchestration cycle or a repository call.
    Chat(ChatError),
    /// Requested resource does not exist.
    NotFound(String),
    /// Request rejected before reaching the orchestrator.
    Validation(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => AppError::NotFound("Session not found".to_string()),
            other => AppError::Chat(ChatError::Database(other)),
        }
    }
}

impl AppError {
    /// Status code and caller-safe detail. Storage and internal failures get a
    /// fixed message; their specifics only reach the logs.
    fn status_and_detail(&self) -> (StatusCode, String) {
        match self {
            AppError::Chat(chat) => {
                let status = match chat.severity() {
                    ErrorSeverity::BadRequest => StatusCode::BAD_REQUEST,
                    ErrorSeverity::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
                    ErrorSeverity::Internal => StatusCode::INTERNAL_SERVER_ERROR,
                };
                let detail = match chat {
                    ChatError::Validation(msg) => msg.clone(),
                    ChatError::ApiCommunication(e) => format!(
                        "The assistant could not produce a reply right now: {}",
                        e.public_message()
                    ),
                    ChatError::Database(_) => {
                        "The conversation could not be stored. Please try again.".to_string()
                    }
                    ChatError::Unexpected(_) => "An unexpected error occurred.".to_string(),
                };
                (status, detail)
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        }
    }

    fn log(&self) {
        match self {
            AppError::Chat(chat) if chat.is_expected() => {
                warn!(error = %chat, "Request failed");
            }
            AppError::Chat(chat) => {
                error!(error = ?chat, "Request failed");
            }
            AppError::NotFound(msg) | AppError::Validation(msg) => {
                warn!(detail = %msg, "Request rejected");
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        let (status, detail) = self.status_and_detail();
        ErrorDocument::single(status, detail).into_response_with(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagarela_types::llm::GenerationError;

    #[test]
    fn test_generation_rejection_is_503_with_message() {
        let err = AppError::from(ChatError::ApiCommunication(GenerationError::Rejected {
            status: 403,
            message: "invalid key".to_string(),
        }));
        let (status, detail) = err.status_and_detail();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(detail.contains("invalid key"));
    }

    #[test]
    fn test_raw_upstream_body_is_not_exposed() {
        let err = AppError::from(ChatError::ApiCommunication(GenerationError::RejectedRaw {
            status: 502,
            body: "<html>secret stack</html>".to_string(),
        }));
        let (status, detail) = err.status_and_detail();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(!detail.contains("secret stack"));
        assert!(detail.contains("502"));
    }

    #[test]
    fn test_database_detail_is_generic() {
        let err = AppError::from(ChatError::Database(RepositoryError::Query(
            "no such table: chat_messages".to_string(),
        )));
        let (status, detail) = err.status_and_detail();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!detail.contains("chat_messages"));
    }

    #[test]
    fn test_repository_not_found_maps_to_404() {
        let (status, _) = AppError::from(RepositoryError::NotFound).status_and_detail();
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_validation_is_400() {
        let (status, detail) =
            AppError::from(ChatError::Validation("message content is empty".to_string()))
                .status_and_detail();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(detail, "message content is empty");
    }
}
