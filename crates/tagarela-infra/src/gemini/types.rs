//! Gemini `generateContent` wire types.
//!
//! These are Gemini-specific request/response structures used for HTTP
//! communication. They are NOT the generic generation types from
//! tagarela-types -- those are provider-agnostic.

use serde::{Deserialize, Serialize};

/// Request body for `models/{model}:generateContent`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
    pub generation_config: GeminiGenerationConfig,
}

/// One conversation turn.
#[derive(Debug, Clone, Serialize)]
pub struct GeminiContent {
    pub role: String,
    pub parts: Vec<GeminiPart>,
}

impl GeminiContent {
    pub fn text(role: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            parts: vec![GeminiPart { text: text.into() }],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GeminiPart {
    pub text: String,
}

/// Sampling settings. Unset values are omitted rather than sent as `null`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
}

// ---------------------------------------------------------------------------
// Response payloads
//
// Every field is optional: a well-formed JSON body that lacks candidates or
// text is a valid answer and is classified by finish reason, not rejected.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    pub prompt_feedback: Option<GeminiPromptFeedback>,
}

impl GeminiResponse {
    /// `candidates[0].content.parts[0].text`, if present.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }

    /// Finish reason of the first candidate, or the prompt block reason when
    /// no candidate came back.
    pub fn finish_reason(&self) -> Option<&str> {
        match self.candidates.first() {
            Some(candidate) => candidate.finish_reason.as_deref(),
            None => self
                .prompt_feedback
                .as_ref()
                .and_then(|f| f.block_reason.as_deref()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    pub content: Option<GeminiResponseContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiResponseContent {
    #[serde(default)]
    pub parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiPromptFeedback {
    pub block_reason: Option<String>,
}

/// Error body returned with non-success statuses: `{"error": {"message": ...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiErrorResponse {
    pub error: GeminiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiErrorDetail {
    pub message: String,
}
