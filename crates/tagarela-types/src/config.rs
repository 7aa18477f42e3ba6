//! Configuration types for Tagarela.
//!
//! `AppConfig` represents the top-level `config.toml`. Every field has a
//! default, so an empty or missing file yields a working configuration.
//! The generation API key is never part of this file; it comes from the
//! environment.

use serde::{Deserialize, Serialize};

use crate::llm::GenerationParams;

/// Top-level configuration for the Tagarela service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Overrides the default `sqlite://{data_dir}/tagarela.db` location.
    #[serde(default)]
    pub database_url: Option<String>,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub gemini: GeminiConfig,

    #[serde(default)]
    pub generation: GenerationParams,

    #[serde(default)]
    pub chat: ChatConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Endpoint and timeout settings for the Gemini generation API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Bound on connection establishment.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Bound on the whole call, connection included.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Optional overrides for the built-in persona and fallback reply.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default)]
    pub persona_instruction: Option<String>,
    #[serde(default)]
    pub fallback_reply: Option<String>,
}
