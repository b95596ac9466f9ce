//! Configuration loading and root folder resolution
//!
//! Resolution priority for every setting:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing or unreadable TOML file is not fatal: a warning is logged and
//! compiled defaults are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the TOML config file
pub const ENV_CONFIG_PATH: &str = "CA_CONFIG";
/// Environment variable naming the root folder (database + blobs)
pub const ENV_ROOT_FOLDER: &str = "CA_ROOT_FOLDER";
/// Environment variable holding the LLM provider API key
pub const ENV_LLM_API_KEY: &str = "CA_LLM_API_KEY";
/// Environment variable holding the outbound email API key
pub const ENV_EMAIL_API_KEY: &str = "CA_EMAIL_API_KEY";
/// Environment variable holding the blob URL signing secret
pub const ENV_SIGNING_SECRET: &str = "CA_SIGNING_SECRET";

const APP_DIR: &str = "contract-analyser";
const DATABASE_FILE: &str = "contract-analyser.db";

/// Top-level TOML configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub root_folder: Option<String>,
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub email: EmailConfig,
    pub pipeline: PipelineConfig,
    pub retention: RetentionConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener and CORS settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed by CORS; the application's own frontends
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5740,
            allowed_origins: vec!["http://localhost:5173".to_string()],
        }
    }
}

/// LLM provider settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// OpenAI-compatible base URL (`.../v1`)
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub temperature: f32,
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            temperature: 0.2,
            timeout_secs: 120,
            max_attempts: crate::retry::DEFAULT_MAX_ATTEMPTS,
            initial_delay_ms: crate::retry::DEFAULT_INITIAL_DELAY_MS,
        }
    }
}

/// Outbound email provider settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub from_address: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.resend.com/emails".to_string(),
            api_key: None,
            from_address: "ContractAnalyser <reports@contractanalyser.app>".to_string(),
        }
    }
}

/// Which compliance score is stored when the model's arithmetic deviates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScorePolicy {
    /// Keep the model's score and log the deviation
    #[default]
    Model,
    /// Replace the model's score with the recomputed one
    Recomputed,
}

/// Analysis pipeline settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Upper bound for analysis + translation + persistence
    pub timeout_secs: u64,
    /// Re-translate free-text fields when the output language is not English
    pub defensive_translation: bool,
    pub score_policy: ScorePolicy,
    /// Base URL used to build links to stored reports
    pub public_base_url: String,
    pub signed_url_ttl_secs: u64,
    pub signing_secret: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 300,
            defensive_translation: true,
            score_policy: ScorePolicy::Model,
            public_base_url: "http://127.0.0.1:5740".to_string(),
            signed_url_ttl_secs: 7 * 24 * 3600,
            signing_secret: None,
        }
    }
}

/// Deletion policy settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    /// Contracts older than this are removed by cleanup
    pub max_age_days: u32,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self { max_age_days: 365 }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TomlConfig {
    /// Parse TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Read and parse a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Load `path` if given, falling back to defaults with a warning
    pub fn load_or_default(path: Option<&Path>) -> Self {
        match path {
            Some(path) => match Self::load(path) {
                Ok(config) => {
                    info!("Loaded configuration from {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("{} - using compiled defaults", e);
                    Self::default()
                }
            },
            None => {
                warn!("No config file found - using compiled defaults");
                Self::default()
            }
        }
    }

    /// Secrets from the environment take precedence over the file
    pub fn apply_env_overrides(&mut self) {
        if let Some(key) = non_empty_env(ENV_LLM_API_KEY) {
            self.llm.api_key = Some(key);
        }
        if let Some(key) = non_empty_env(ENV_EMAIL_API_KEY) {
            self.email.api_key = Some(key);
        }
        if let Some(secret) = non_empty_env(ENV_SIGNING_SECRET) {
            self.pipeline.signing_secret = Some(secret);
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Config file path: CLI → `CA_CONFIG` → platform config dir (if present)
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Some(path) = non_empty_env(ENV_CONFIG_PATH) {
        return Some(PathBuf::from(path));
    }

    default_config_path().filter(|path| path.exists())
}

/// `<config dir>/contract-analyser/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
}

/// Root folder: CLI → `CA_ROOT_FOLDER` → TOML `root_folder` → OS default
pub fn resolve_root_folder(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Some(path) = non_empty_env(ENV_ROOT_FOLDER) {
        return PathBuf::from(path);
    }

    // Priority 3: TOML config file
    if let Some(path) = config.root_folder.as_deref().filter(|p| !p.trim().is_empty()) {
        return PathBuf::from(path);
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Get OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("./contract-analyser-data"))
}

/// Database file inside the root folder
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join(DATABASE_FILE)
}

/// Blob storage directory inside the root folder
pub fn blob_root(root_folder: &Path) -> PathBuf {
    root_folder.join("blobs")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TomlConfig::default();
        assert_eq!(config.server.port, 5740);
        assert_eq!(config.llm.max_attempts, 3);
        assert_eq!(config.llm.initial_delay_ms, 1000);
        assert_eq!(config.pipeline.score_policy, ScorePolicy::Model);
        assert!(config.pipeline.defensive_translation);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = TomlConfig::from_toml_str(
            r#"
            [llm]
            model = "gpt-4o"

            [pipeline]
            score_policy = "recomputed"
            "#,
        )
        .unwrap();

        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.base_url, "https://api.openai.com/v1");
        assert_eq!(config.pipeline.score_policy, ScorePolicy::Recomputed);
        assert_eq!(config.server.port, 5740);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[server\nport = ").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = TomlConfig::load_or_default(Some(Path::new("/nonexistent/ca/config.toml")));
        assert_eq!(config, TomlConfig::default());
    }

    #[test]
    fn test_root_folder_cli_wins() {
        let config = TomlConfig {
            root_folder: Some("/from/toml".to_string()),
            ..Default::default()
        };
        let root = resolve_root_folder(Some(Path::new("/from/cli")), &config);
        assert_eq!(root, PathBuf::from("/from/cli"));
    }

    #[test]
    fn test_paths_inside_root() {
        let root = Path::new("/data/ca");
        assert_eq!(database_path(root), PathBuf::from("/data/ca/contract-analyser.db"));
        assert_eq!(blob_root(root), PathBuf::from("/data/ca/blobs"));
    }
}
