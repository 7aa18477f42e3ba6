//! Business logic and port trait definitions for Tagarela.
//!
//! This crate defines the "ports" (repository and generation client traits)
//! that the infrastructure layer implements, plus the conversation
//! orchestrator driving one request/response cycle. It depends only on
//! `tagarela-types` -- never on `tagarela-infra` or any database/IO crate.

pub mod chat;
pub mod llm;
