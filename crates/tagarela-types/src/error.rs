use thiserror::Error;

use crate::llm::GenerationError;

/// Errors from repository operations (used by trait definitions in tagarela-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error: {0}")]
    Connection(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// How bad a [`ChatError`] is, independent of any transport.
///
/// The HTTP layer maps each severity to one status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    BadRequest,
    ServiceUnavailable,
    Internal,
}

/// Errors from one orchestration cycle.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(#[from] RepositoryError),

    #[error("API communication error: {0}")]
    ApiCommunication(#[from] GenerationError),

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl ChatError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ChatError::Validation(_) => ErrorSeverity::BadRequest,
            ChatError::ApiCommunication(_) => ErrorSeverity::ServiceUnavailable,
            ChatError::Database(_) | ChatError::Unexpected(_) => ErrorSeverity::Internal,
        }
    }

    /// Validation and upstream failures are expected in normal operation.
    pub fn is_expected(&self) -> bool {
        matches!(self, ChatError::Validation(_) | ChatError::ApiCommunication(_))
    }
}
