//! Gemini generation client.
//!
//! This module provides the [`GeminiClient`] which implements the
//! [`GenerationClient`](tagarela_core::llm::client::GenerationClient) trait
//! for the Gemini `generateContent` endpoint.

pub mod client;
pub mod types;

pub use client::GeminiClient;
