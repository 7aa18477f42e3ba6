//! Application state wiring the orchestrator to its infrastructure.
//!
//! AppState holds the concrete orchestrator used by both the CLI and the REST
//! API. The orchestrator is generic over repository/client traits; AppState
//! pins it to the SQLite repository and the Gemini client.

use std::path::PathBuf;
use std::sync::Arc;

use secrecy::SecretString;
use tracing::{info, warn};

use tagarela_core::chat::orchestrator::{ChatSettings, ConversationOrchestrator};
use tagarela_infra::config::{API_KEY_ENV, load_config, resolve_api_key, resolve_data_dir};
use tagarela_infra::gemini::GeminiClient;
use tagarela_infra::sqlite::chat::SqliteChatRepository;
use tagarela_infra::sqlite::pool::{DatabasePool, default_database_url};
use tagarela_types::config::AppConfig;

/// Orchestrator pinned to the production infrastructure.
pub type ConcreteOrchestrator = ConversationOrchestrator<SqliteChatRepository, GeminiClient>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ConcreteOrchestrator>,
    pub config: Arc<AppConfig>,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize from the data directory, config file, and environment.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_config(&data_dir).await;
        Self::from_config(data_dir, config, resolve_api_key()).await
    }

    /// Wire the state from already-resolved inputs.
    pub async fn from_config(
        data_dir: PathBuf,
        config: AppConfig,
        api_key: Option<SecretString>,
    ) -> anyhow::Result<Self> {
        let db_url = config
            .database_url
            .clone()
            .unwrap_or_else(|| default_database_url(&data_dir));
        let db_pool = DatabasePool::new(&db_url).await?;

        let client = GeminiClient::new(&config.gemini, api_key)?;
        if !client.has_credentials() {
            warn!("{API_KEY_ENV} is not set; every generation request will fail until it is");
        }
        info!(model = %config.gemini.model, "Generation client configured");

        let settings = ChatSettings::from_config(&config.chat, &config.generation);
        let chat_repo = SqliteChatRepository::new(db_pool);
        let orchestrator = ConversationOrchestrator::new(chat_repo, client, settings);

        Ok(Self {
            orchestrator: Arc::new(orchestrator),
            config: Arc::new(config),
            data_dir,
        })
    }
}
