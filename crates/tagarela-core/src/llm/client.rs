//! GenerationClient trait definition.
//!
//! The orchestrator owns one concrete client and calls it once per request.
//! Implementations live in tagarela-infra (e.g., `GeminiClient`).

use tagarela_types::llm::{GenerationError, GenerationRequest};

/// Trait for generative-text backends.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait GenerationClient: Send + Sync {
    /// Provider name used in logs and spans (e.g., "gemini").
    fn name(&self) -> &str;

    /// Model identifier requests are sent to.
    fn model(&self) -> &str;

    /// Run one generation call.
    ///
    /// - `Ok(Some(text))`: generated text. May be empty when the service
    ///   finished normally without producing any.
    /// - `Ok(None)`: no text and no recognizable finish reason.
    /// - `Err(_)`: the call failed or the output was withheld.
    fn generate(
        &self,
        request: &GenerationRequest,
    ) -> impl std::future::Future<Output = Result<Option<String>, GenerationError>> + Send;
}
