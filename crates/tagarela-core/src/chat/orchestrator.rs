//! Conversation orchestrator driving one request/response cycle.
//!
//! ConversationOrchestrator resolves the session, loads a bounded history
//! window, asks the generation client for a reply, and persists the
//! user/model turn pair atomically. Every failure leaves as a [`ChatError`].

use tagarela_types::chat::{
    ChatMessage, ChatOutcome, ChatSession, MAX_HISTORY_MESSAGES, MessageRole,
};
use tagarela_types::config::ChatConfig;
use tagarela_types::error::{ChatError, RepositoryError};
use tagarela_types::llm::{GenerationParams, GenerationRequest, HistoryEntry};
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::chat::persona::{FALLBACK_REPLY, PERSONA_INSTRUCTION};
use crate::chat::repository::ChatRepository;
use crate::llm::client::GenerationClient;

/// Static text and sampling parameters applied to every cycle.
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub persona_instruction: String,
    pub fallback_reply: String,
    pub params: GenerationParams,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            persona_instruction: PERSONA_INSTRUCTION.to_string(),
            fallback_reply: FALLBACK_REPLY.to_string(),
            params: GenerationParams::default(),
        }
    }
}

impl ChatSettings {
    /// Build settings from config overrides, keeping built-in text where an
    /// override is unset or blank.
    pub fn from_config(chat: &ChatConfig, params: &GenerationParams) -> Self {
        let defaults = Self::default();
        Self {
            persona_instruction: non_blank(chat.persona_instruction.as_deref())
                .unwrap_or(defaults.persona_instruction),
            fallback_reply: non_blank(chat.fallback_reply.as_deref())
                .unwrap_or(defaults.fallback_reply),
            params: params.clone(),
        }
    }
}

fn non_blank(text: Option<&str>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty()).map(str::to_string)
}

/// Coordinates the history store and the generation client.
///
/// Generic over `ChatRepository` and `GenerationClient` so tests can
/// substitute either side (tagarela-core never depends on tagarela-infra).
pub struct ConversationOrchestrator<R: ChatRepository, G: GenerationClient> {
    repo: R,
    client: G,
    settings: ChatSettings,
}

impl<R: ChatRepository, G: GenerationClient> ConversationOrchestrator<R, G> {
    pub fn new(repo: R, client: G, settings: ChatSettings) -> Self {
        Self {
            repo,
            client,
            settings,
        }
    }

    /// Access the chat repository.
    pub fn chat_repo(&self) -> &R {
        &self.repo
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    /// Run one cycle for `user_message` in the given (or a new) session.
    pub async fn process(
        &self,
        session_identifier: Option<&str>,
        user_message: &str,
    ) -> Result<ChatOutcome, ChatError> {
        if user_message.trim().is_empty() {
            return Err(ChatError::Validation(
                "message content must not be empty".to_string(),
            ));
        }

        let session = self.resolve_session(session_identifier).await?;

        let history = self
            .repo
            .get_recent_messages(&session.id, MAX_HISTORY_MESSAGES)
            .await?;
        debug!(session_id = %session.id, history_len = history.len(), "Loaded history window");

        let request = GenerationRequest::new(user_message)
            .with_history(history.iter().map(HistoryEntry::from).collect())
            .with_persona(self.settings.persona_instruction.clone())
            .with_params(self.settings.params.clone());

        let span = info_span!(
            "gen_ai.generate",
            gen_ai.system = self.client.name(),
            gen_ai.request.model = %self.client.model(),
            gen_ai.request.temperature = ?request.params.temperature,
            session_id = %session.id,
        );

        let generated = self
            .client
            .generate(&request)
            .instrument(span)
            .await
            .map_err(|e| {
                warn!(session_id = %session.id, error = %e, "Generation failed");
                ChatError::ApiCommunication(e)
            })?;

        let reply_text = match generated {
            Some(text) if !text.trim().is_empty() => text,
            Some(_) => {
                info!(session_id = %session.id, "Model returned empty text, using fallback reply");
                self.settings.fallback_reply.clone()
            }
            None => {
                warn!(
                    session_id = %session.id,
                    "Model returned no text and no recognizable finish reason, using fallback reply"
                );
                self.settings.fallback_reply.clone()
            }
        };

        let user_turn = ChatMessage::new(session.id, MessageRole::User, user_message);
        let model_turn = ChatMessage::new(session.id, MessageRole::Model, reply_text.clone());
        self.repo.save_turn_pair(&user_turn, &model_turn).await?;

        info!(session_id = %session.id, history_len = history.len(), "Conversation turn saved");

        Ok(ChatOutcome {
            reply_text,
            session_id: session.id,
            history_used: history,
        })
    }

    /// Find-or-create the session for `identifier`, or create a fresh one.
    ///
    /// A uniqueness conflict on create means a concurrent request created the
    /// same session first; it is resolved by fetching that session.
    async fn resolve_session(&self, identifier: Option<&str>) -> Result<ChatSession, ChatError> {
        let Some(raw) = identifier.map(str::trim).filter(|s| !s.is_empty()) else {
            let session = self.repo.create_session(&ChatSession::new(Uuid::now_v7())).await?;
            info!(session_id = %session.id, "Created new session");
            return Ok(session);
        };

        let id = Uuid::parse_str(raw)
            .map_err(|_| ChatError::Validation(format!("invalid session identifier: '{raw}'")))?;

        if let Some(existing) = self.repo.get_session(&id).await? {
            return Ok(existing);
        }

        match self.repo.create_session(&ChatSession::new(id)).await {
            Ok(session) => {
                info!(session_id = %session.id, "Created session for supplied identifier");
                Ok(session)
            }
            Err(RepositoryError::Conflict(reason)) => {
                debug!(session_id = %id, %reason, "Session created concurrently, re-fetching");
                self.repo
                    .get_session(&id)
                    .await?
                    .ok_or(ChatError::Database(RepositoryError::Conflict(reason)))
            }
            Err(e) => Err(e.into()),
        }
    }
}
