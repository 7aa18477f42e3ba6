//! Conversation persistence and orchestration.
//!
//! - `ChatRepository`: keyed conversation log implemented by the infra layer
//! - `ConversationOrchestrator`: resolve session, window history, generate, persist
//! - `persona`: built-in persona instruction and fallback reply

pub mod orchestrator;
pub mod persona;
pub mod repository;
