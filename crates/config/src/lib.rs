//! Configuration for twinbot.
//!
//! Settings live in a JSON file under `~/.twinbot`; secrets may also be
//! supplied through environment variables, which take precedence over the
//! file so deployments can stay credential-free on disk.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod paths;

pub use paths::{config_path, data_dir, default_data_folder};

/// Errors in configuration handling
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing required setting: {0}")]
    Missing(&'static str),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Persona the assistant presents as
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    /// Name of the person the bot is a digital twin of
    #[serde(default = "default_owner_name")]
    pub owner_name: String,
    /// Name to use when replying in Farsi
    #[serde(default = "default_owner_name_fa")]
    pub owner_name_fa: String,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            owner_name: default_owner_name(),
            owner_name_fa: default_owner_name_fa(),
        }
    }
}

fn default_owner_name() -> String {
    "Pooya".to_string()
}

fn default_owner_name_fa() -> String {
    "پویا".to_string()
}

/// Language model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_temperature() -> f32 {
    0.7
}

/// Vector memory settings (Pinecone index + embedding model)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default)]
    pub pinecone_api_key: String,
    /// Index host, e.g. "my-index-abc123.svc.us-east-1.pinecone.io"
    #[serde(default)]
    pub index_host: String,
    #[serde(default = "default_embed_model")]
    pub embed_model: String,
    #[serde(default = "default_top_k")]
    pub top_k: u32,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            pinecone_api_key: String::new(),
            index_host: String::new(),
            embed_model: default_embed_model(),
            top_k: default_top_k(),
        }
    }
}

fn default_embed_model() -> String {
    "text-embedding-004".to_string()
}

fn default_top_k() -> u32 {
    3
}

/// External tool backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub tavily_api_key: String,
    #[serde(default)]
    pub github_token: String,
    #[serde(default = "default_web_max_results")]
    pub web_max_results: u32,
    /// Per-tool-call timeout, seconds
    #[serde(default = "default_tool_timeout_s")]
    pub timeout_s: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            tavily_api_key: String::new(),
            github_token: String::new(),
            web_max_results: default_web_max_results(),
            timeout_s: default_tool_timeout_s(),
        }
    }
}

fn default_web_max_results() -> u32 {
    3
}

fn default_tool_timeout_s() -> u64 {
    30
}

/// Agent loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum model invocations per turn
    #[serde(default = "default_recursion_limit")]
    pub recursion_limit: u32,
    /// Overall deadline for one turn, seconds
    #[serde(default = "default_turn_timeout_s")]
    pub turn_timeout_s: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            recursion_limit: default_recursion_limit(),
            turn_timeout_s: default_turn_timeout_s(),
        }
    }
}

fn default_recursion_limit() -> u32 {
    10
}

fn default_turn_timeout_s() -> u64 {
    120
}

/// Telegram channel settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TelegramConfig {
    #[serde(default)]
    pub token: String,
    /// Allowed sender ids; empty allows everyone
    #[serde(default)]
    pub allow_from: Vec<String>,
}

/// Liveness endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Ingest pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Folder of .txt/.md documents to feed into memory
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

fn default_data_dir() -> String {
    "~/.twinbot/data".to_string()
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub persona: PersonaConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub deploy: DeployConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
}

impl Config {
    /// Load from the default location with env overrides applied
    pub async fn load() -> Result<Self> {
        let path = config_path();
        let mut config = Self::load_from(&path).await?;
        config.apply_env();
        Ok(config)
    }

    /// Load from a specific location (no env overrides)
    pub async fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("no config at {:?}, using defaults", path);
            return Ok(Config::default());
        }

        debug!("loading config from {:?}", path);
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Overlay secrets from environment variables.
    ///
    /// Mirrors the variable names the deployment platform provides:
    /// GOOGLE_API_KEY, PINECONE_API_KEY, TAVILY_API_KEY, GITHUB_TOKEN,
    /// TELEGRAM_TOKEN, PINECONE_INDEX_HOST and PORT.
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("GOOGLE_API_KEY") {
            self.model.api_key = key;
        }
        if let Ok(key) = std::env::var("PINECONE_API_KEY") {
            self.memory.pinecone_api_key = key;
        }
        if let Ok(host) = std::env::var("PINECONE_INDEX_HOST") {
            self.memory.index_host = host;
        }
        if let Ok(key) = std::env::var("TAVILY_API_KEY") {
            self.tools.tavily_api_key = key;
        }
        if let Ok(token) = std::env::var("GITHUB_TOKEN") {
            self.tools.github_token = token;
        }
        if let Ok(token) = std::env::var("TELEGRAM_TOKEN") {
            self.telegram.token = token;
        }
        if let Ok(port) = std::env::var("PORT") {
            match port.parse() {
                Ok(p) => self.deploy.port = p,
                Err(_) => warn!("ignoring unparseable PORT value: {}", port),
            }
        }
    }

    /// Save to the default location
    pub async fn save(&self) -> Result<()> {
        let path = config_path();
        self.save_to(&path).await
    }

    /// Save to a specific location
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        debug!("writing config to {:?}", path);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    /// Folder of documents for the ingest pipeline, tilde-expanded
    pub fn data_folder(&self) -> PathBuf {
        let path = &self.ingest.data_dir;
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }

    /// Check the keys a live deployment needs; returns the first missing one.
    pub fn validate_for_serve(&self) -> Result<()> {
        if self.model.api_key.is_empty() {
            return Err(ConfigError::Missing("model.api_key (GOOGLE_API_KEY)"));
        }
        if self.memory.pinecone_api_key.is_empty() {
            return Err(ConfigError::Missing("memory.pinecone_api_key (PINECONE_API_KEY)"));
        }
        if self.memory.index_host.is_empty() {
            return Err(ConfigError::Missing("memory.index_host (PINECONE_INDEX_HOST)"));
        }
        if self.tools.tavily_api_key.is_empty() {
            return Err(ConfigError::Missing("tools.tavily_api_key (TAVILY_API_KEY)"));
        }
        if self.tools.github_token.is_empty() {
            return Err(ConfigError::Missing("tools.github_token (GITHUB_TOKEN)"));
        }
        if self.telegram.token.is_empty() {
            return Err(ConfigError::Missing("telegram.token (TELEGRAM_TOKEN)"));
        }
        Ok(())
    }
}

/// Create the config file and data folder if absent
pub async fn init() -> Result<Config> {
    let config_path = config_path();

    if config_path.exists() {
        warn!("config already exists at {:?}", config_path);
    } else {
        let config = Config::default();
        config.save().await?;
        info!("config created at {:?}", config_path);
    }

    let data_folder = default_data_folder();
    tokio::fs::create_dir_all(&data_folder).await?;
    info!("data folder ready at {:?}", data_folder);

    Config::load().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.model.model, "gemini-2.5-flash");
        assert_eq!(config.model.temperature, 0.7);
        assert_eq!(config.agent.recursion_limit, 10);
        assert_eq!(config.memory.top_k, 3);
        assert_eq!(config.ingest.chunk_size, 1000);
        assert_eq!(config.ingest.chunk_overlap, 200);
        assert_eq!(config.deploy.port, 8080);
        assert!(config.telegram.allow_from.is_empty());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: Config = serde_json::from_str(
            r#"{
            "model": { "api_key": "g-key", "model": "gemini-2.0-pro" },
            "telegram": { "token": "t-token" }
        }"#,
        )
        .expect("should deserialize");

        assert_eq!(config.model.api_key, "g-key");
        assert_eq!(config.model.model, "gemini-2.0-pro");
        assert_eq!(config.model.max_tokens, 4096);
        assert_eq!(config.telegram.token, "t-token");
        assert_eq!(config.agent.recursion_limit, 10);
    }

    #[test]
    fn test_validate_for_serve_reports_first_missing() {
        let config = Config::default();
        let err = config.validate_for_serve().unwrap_err();
        assert!(matches!(err, ConfigError::Missing(name) if name.contains("GOOGLE_API_KEY")));
    }

    #[test]
    fn test_validate_for_serve_ok_when_populated() {
        let mut config = Config::default();
        config.model.api_key = "a".into();
        config.memory.pinecone_api_key = "b".into();
        config.memory.index_host = "idx.svc.pinecone.io".into();
        config.tools.tavily_api_key = "c".into();
        config.tools.github_token = "d".into();
        config.telegram.token = "e".into();
        assert!(config.validate_for_serve().is_ok());
    }

    #[test]
    fn test_data_folder_tilde_expansion() {
        let mut config = Config::default();
        config.ingest.data_dir = "/srv/twinbot/data".to_string();
        assert_eq!(config.data_folder(), PathBuf::from("/srv/twinbot/data"));
    }

    #[tokio::test]
    async fn test_load_from_missing_file_gives_defaults() {
        let config = Config::load_from(Path::new("/nonexistent/twinbot/config.json"))
            .await
            .expect("missing file should yield defaults");
        assert_eq!(config.model.model, "gemini-2.5-flash");
    }

    #[tokio::test]
    async fn test_save_and_reload_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::default();
        config.persona.owner_name = "Sam".to_string();
        config.agent.recursion_limit = 5;
        config.save_to(&path).await.expect("should save");

        let loaded = Config::load_from(&path).await.expect("should load");
        assert_eq!(loaded.persona.owner_name, "Sam");
        assert_eq!(loaded.agent.recursion_limit, 5);
    }
}
