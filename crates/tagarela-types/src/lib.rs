//! Shared domain types for Tagarela.
//!
//! This crate contains the core domain types used across the Tagarela service:
//! chat sessions and messages, generation requests, configuration, and the
//! error taxonomy every layer maps into.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
