//! SQLite chat repository implementation.
//!
//! Implements `ChatRepository` from `tagarela-core` using sqlx with split
//! read/write pools: raw queries, private Row structs, reads on the reader
//! pool and writes on the single-connection writer pool.

use chrono::{DateTime, Utc};
use sqlx::Row;
use tagarela_core::chat::repository::ChatRepository;
use tagarela_types::chat::{ChatMessage, ChatSession, MessageRole};
use tagarela_types::error::RepositoryError;
use uuid::Uuid;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `ChatRepository`.
pub struct SqliteChatRepository {
    pool: DatabasePool,
}

impl SqliteChatRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct ChatSessionRow {
    id: String,
    created_at: String,
    message_count: i64,
}

impl ChatSessionRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            created_at: row.try_get("created_at")?,
            message_count: row.try_get("message_count")?,
        })
    }

    fn into_session(self) -> Result<ChatSession, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid session id: {e}")))?;

        Ok(ChatSession {
            id,
            created_at: parse_datetime(&self.created_at)?,
            message_count: self.message_count as u32,
        })
    }
}

struct ChatMessageRow {
    id: String,
    session_id: String,
    role: String,
    content: String,
    created_at: String,
}

impl ChatMessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            session_id: row.try_get("session_id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<ChatMessage, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid message id: {e}")))?;
        let session_id = Uuid::parse_str(&self.session_id)
            .map_err(|e| RepositoryError::Query(format!("invalid session_id: {e}")))?;
        let role: MessageRole = self.role.parse().map_err(RepositoryError::Query)?;

        Ok(ChatMessage {
            id,
            session_id,
            role,
            content: self.content,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn query_error(e: sqlx::Error) -> RepositoryError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            RepositoryError::Connection(e.to_string())
        }
        other => RepositoryError::Query(other.to_string()),
    }
}

fn rows_to_messages(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<ChatMessage>, RepositoryError> {
    let mut messages = Vec::with_capacity(rows.len());
    for row in rows {
        let msg_row = ChatMessageRow::from_row(row).map_err(query_error)?;
        messages.push(msg_row.into_message()?);
    }
    Ok(messages)
}

async fn insert_message(
    tx: &mut sqlx::SqliteConnection,
    message: &ChatMessage,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r#"INSERT INTO chat_messages (id, session_id, role, content, created_at)
           VALUES (?, ?, ?, ?, ?)"#,
    )
    .bind(message.id.to_string())
    .bind(message.session_id.to_string())
    .bind(message.role.as_str())
    .bind(&message.content)
    .bind(format_datetime(&message.created_at))
    .execute(tx)
    .await
    .map_err(query_error)?;

    Ok(())
}

// ---------------------------------------------------------------------------
// ChatRepository implementation
// ---------------------------------------------------------------------------

impl ChatRepository for SqliteChatRepository {
    async fn create_session(&self, session: &ChatSession) -> Result<ChatSession, RepositoryError> {
        sqlx::query(
            "INSERT INTO chat_sessions (id, created_at, message_count) VALUES (?, ?, ?)",
        )
        .bind(session.id.to_string())
        .bind(format_datetime(&session.created_at))
        .bind(session.message_count as i64)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.is_unique_violation() {
                    return RepositoryError::Conflict(format!(
                        "session {} already exists",
                        session.id
                    ));
                }
            }
            query_error(e)
        })?;

        Ok(session.clone())
    }

    async fn get_session(&self, session_id: &Uuid) -> Result<Option<ChatSession>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM chat_sessions WHERE id = ?")
            .bind(session_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        match row {
            Some(row) => {
                let session_row = ChatSessionRow::from_row(&row).map_err(query_error)?;
                Ok(Some(session_row.into_session()?))
            }
            None => Ok(None),
        }
    }

    async fn delete_session(&self, session_id: &Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM chat_sessions WHERE id = ?")
            .bind(session_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn get_recent_messages(
        &self,
        session_id: &Uuid,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let rows = sqlx::query(
            r#"SELECT * FROM (
                   SELECT * FROM chat_messages WHERE session_id = ? ORDER BY seq DESC LIMIT ?
               ) ORDER BY seq ASC"#,
        )
        .bind(session_id.to_string())
        .bind(limit as i64)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        rows_to_messages(&rows)
    }

    async fn get_messages(
        &self,
        session_id: &Uuid,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        // SQLite needs a LIMIT for OFFSET; -1 means unbounded.
        let rows = sqlx::query(
            "SELECT * FROM chat_messages WHERE session_id = ? ORDER BY seq ASC LIMIT ? OFFSET ?",
        )
        .bind(session_id.to_string())
        .bind(limit.unwrap_or(-1))
        .bind(offset.unwrap_or(0))
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        rows_to_messages(&rows)
    }

    async fn save_turn_pair(
        &self,
        user: &ChatMessage,
        model: &ChatMessage,
    ) -> Result<(), RepositoryError> {
        if user.session_id != model.session_id {
            return Err(RepositoryError::Query(
                "turn pair messages belong to different sessions".to_string(),
            ));
        }

        // Dropping the transaction without commit rolls both inserts back.
        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        insert_message(&mut tx, user).await?;
        insert_message(&mut tx, model).await?;

        let result =
            sqlx::query("UPDATE chat_sessions SET message_count = message_count + 2 WHERE id = ?")
                .bind(user.session_id.to_string())
                .execute(&mut *tx)
                .await
                .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await.map_err(query_error)?;

        Ok(())
    }

    async fn get_message_count(&self, session_id: &Uuid) -> Result<u32, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM chat_messages WHERE session_id = ?")
            .bind(session_id.to_string())
            .fetch_one(&self.pool.reader)
            .await
            .map_err(query_error)?;

        let count: i64 = row.try_get("cnt").map_err(query_error)?;

        Ok(count as u32)
    }
}
