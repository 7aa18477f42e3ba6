//! Generation request/response types for Tagarela.
//!
//! These model the data shapes handed to a generation client and the
//! failures it reports. They are provider-agnostic; the Gemini wire
//! structures live in `tagarela-infra`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::chat::ChatMessage;

/// One history item as handed to a generation client.
///
/// Both fields are optional: entries with a missing or unknown role, or a
/// missing text, are dropped while building the outbound request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Option<String>,
    pub text: Option<String>,
}

impl HistoryEntry {
    pub fn new(role: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            role: Some(role.into()),
            text: Some(text.into()),
        }
    }
}

impl From<&ChatMessage> for HistoryEntry {
    fn from(message: &ChatMessage) -> Self {
        Self::new(message.role.as_str(), message.content.clone())
    }
}

/// Sampling parameters. Unset values are omitted from the outbound request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    #[serde(default = "default_temperature")]
    pub temperature: Option<f64>,
    #[serde(default = "default_top_p")]
    pub top_p: Option<f64>,
    #[serde(default)]
    pub top_k: Option<u32>,
}

fn default_temperature() -> Option<f64> {
    Some(0.7)
}

fn default_top_p() -> Option<f64> {
    Some(0.9)
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: None,
        }
    }
}

/// Everything a generation client needs for one call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub history: Vec<HistoryEntry>,
    pub persona_instruction: Option<String>,
    pub params: GenerationParams,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            history: Vec::new(),
            persona_instruction: None,
            params: GenerationParams::default(),
        }
    }

    pub fn with_history(mut self, history: Vec<HistoryEntry>) -> Self {
        self.history = history;
        self
    }

    pub fn with_persona(mut self, instruction: impl Into<String>) -> Self {
        self.persona_instruction = Some(instruction.into());
        self
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }
}

/// Why the generation service stopped producing output.
///
/// Only the reasons the client acts on are modelled; anything else is
/// treated as unrecognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    Safety,
    Recitation,
    Other,
}

impl fmt::Display for FinishReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FinishReason::Stop => write!(f, "STOP"),
            FinishReason::Safety => write!(f, "SAFETY"),
            FinishReason::Recitation => write!(f, "RECITATION"),
            FinishReason::Other => write!(f, "OTHER"),
        }
    }
}

impl FromStr for FinishReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STOP" => Ok(FinishReason::Stop),
            "SAFETY" => Ok(FinishReason::Safety),
            "RECITATION" => Ok(FinishReason::Recitation),
            "OTHER" => Ok(FinishReason::Other),
            other => Err(format!("unrecognized finish reason: '{other}'")),
        }
    }
}

/// Errors from generation client operations.
///
/// `Display` is meant for logs. Use [`GenerationError::public_message`] for
/// anything that reaches a caller.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("generation API key is not configured")]
    MissingCredentials,

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("HTTP {status}: {body}")]
    RejectedRaw { status: u16, body: String },

    #[error("invalid response format: {0}")]
    InvalidResponse(String),

    #[error("response blocked for safety reasons")]
    BlockedForSafety,

    #[error("response blocked for recitation of cited material")]
    BlockedForRecitation,

    #[error("generation interrupted for an unspecified reason")]
    Interrupted,
}

impl GenerationError {
    /// Caller-safe description. Raw upstream bodies are reduced to the status code.
    pub fn public_message(&self) -> String {
        match self {
            GenerationError::MissingCredentials => {
                "the generation service is not configured".to_string()
            }
            GenerationError::Timeout(_) => "the generation service timed out".to_string(),
            GenerationError::Connection(_) => {
                "could not connect to the generation service".to_string()
            }
            GenerationError::Transport(_) => {
                "transport failure talking to the generation service".to_string()
            }
            GenerationError::Rejected { message, .. } => message.clone(),
            GenerationError::RejectedRaw { status, .. } => {
                format!("the generation service answered with HTTP {status}")
            }
            GenerationError::InvalidResponse(_) => {
                "invalid response format from the generation service".to_string()
            }
            other => other.to_string(),
        }
    }
}
