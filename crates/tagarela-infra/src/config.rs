//! Configuration loader for Tagarela.
//!
//! Reads `config.toml` from the data directory (`~/.tagarela/` in production)
//! and deserializes it into [`AppConfig`]. Falls back to defaults when the
//! file is missing or malformed, then applies environment overrides.

use std::path::{Path, PathBuf};

use secrecy::SecretString;
use tagarela_types::config::AppConfig;

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

const DATA_DIR_ENV: &str = "TAGARELA_DATA_DIR";
const DATABASE_URL_ENV: &str = "TAGARELA_DATABASE_URL";
const MODEL_ENV: &str = "TAGARELA_GEMINI_MODEL";

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `TAGARELA_DATA_DIR` environment variable
/// 2. `~/.tagarela`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".tagarela");
    }

    // Last resort: current directory
    PathBuf::from(".tagarela")
}

/// Load configuration from `{data_dir}/config.toml` plus environment overrides.
///
/// - If the file does not exist, starts from [`AppConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and uses the default.
/// - `TAGARELA_DATABASE_URL` and `TAGARELA_GEMINI_MODEL` override the file.
pub async fn load_config(data_dir: &Path) -> AppConfig {
    let config = read_config_file(data_dir).await;
    apply_env_overrides(config, |name| std::env::var(name).ok())
}

async fn read_config_file(data_dir: &Path) -> AppConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return AppConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            AppConfig::default()
        }
    }
}

/// Apply environment overrides using `lookup` to read variables.
pub fn apply_env_overrides(
    mut config: AppConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> AppConfig {
    if let Some(url) = lookup(DATABASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
        config.database_url = Some(url);
    }
    if let Some(model) = lookup(MODEL_ENV).filter(|v| !v.trim().is_empty()) {
        config.gemini.model = model;
    }
    config
}

/// Read the Gemini API key from `GEMINI_API_KEY`.
///
/// Returns `None` when unset or blank. Callers decide how loudly to report it;
/// generation calls fail with `MissingCredentials` either way.
pub fn resolve_api_key() -> Option<SecretString> {
    api_key_from(std::env::var(API_KEY_ENV).ok())
}

fn api_key_from(value: Option<String>) -> Option<SecretString> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(SecretString::from)
}
