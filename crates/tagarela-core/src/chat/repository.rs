//! ChatRepository trait definition.
//!
//! Session lookup/creation and the append-only message log.

use tagarela_types::chat::{ChatMessage, ChatSession};
use tagarela_types::error::RepositoryError;
use uuid::Uuid;

/// Repository trait for chat session and message persistence.
///
/// Implementations live in tagarela-infra (e.g., `SqliteChatRepository`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait ChatRepository: Send + Sync {
    /// Create a new chat session.
    ///
    /// Returns `RepositoryError::Conflict` if a session with the same id exists.
    fn create_session(
        &self,
        session: &ChatSession,
    ) -> impl std::future::Future<Output = Result<ChatSession, RepositoryError>> + Send;

    /// Get a chat session by its unique ID.
    fn get_session(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<ChatSession>, RepositoryError>> + Send;

    /// Delete a chat session and, through the foreign key cascade, its messages.
    fn delete_session(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get the `limit` most recent messages, oldest first.
    fn get_recent_messages(
        &self,
        session_id: &Uuid,
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, RepositoryError>> + Send;

    /// Get messages for a session in chronological order.
    fn get_messages(
        &self,
        session_id: &Uuid,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, RepositoryError>> + Send;

    /// Append a user message and its model reply in one transaction.
    ///
    /// Either both messages are stored and the session's message_count grows
    /// by two, or nothing changes.
    fn save_turn_pair(
        &self,
        user: &ChatMessage,
        model: &ChatMessage,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get the total number of messages in a session.
    fn get_message_count(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<u32, RepositoryError>> + Send;
}
