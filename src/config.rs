//! Configuration loading.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.huginn/config.toml` (user)
//! 3. `/etc/huginn/config.toml` (system)
//!
//! The API key is loaded separately with mandatory permission checks:
//! 1. `~/.huginn/secrets.toml` (user, must be 0600)
//! 2. `/etc/huginn/secrets.toml` (system, must be 0600)
//! 3. the `OPENAI_API_KEY` environment variable

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::orchestrator::MAX_CONCURRENCY;
use crate::providers::openai::DEFAULT_BASE_URL;
use crate::types::{DEFAULT_MODEL, ToolChoice};
use crate::{HuginnError, Result};

/// Environment variable consulted when no secrets file holds the key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub batch: BatchConfig,
}

/// External AI service settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// OpenAI-compatible base URL (default: https://api.openai.com/v1).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model used for every annotation (default: gpt-4.1-nano).
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// HTTP request timeout in seconds (default: 60).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// `auto`, `required` or `forced` (default: auto).
    #[serde(default)]
    pub tool_choice: ToolChoice,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            temperature: None,
            max_tokens: None,
            timeout_secs: default_timeout(),
            tool_choice: ToolChoice::default(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_timeout() -> u64 {
    60
}

/// Bulk run settings.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    /// Simultaneous annotation calls (default: 5, never more than 5).
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}

fn default_concurrency() -> usize {
    MAX_CONCURRENCY
}

/// Secrets file contents.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Secrets {
    #[serde(default)]
    pub openai: Option<ApiKeySecret>,
}

/// A single API key secret.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiKeySecret {
    pub api_key: String,
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided)
    /// 2. `~/.huginn/config.toml`
    /// 3. `/etc/huginn/config.toml`
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_config_path(explicit_path)?;
        Self::load_from_file(&path)
    }

    /// Like [`load`](Self::load), but falls back to defaults when no file
    /// exists in the standard locations. An explicit path must still exist.
    pub fn load_or_default(explicit_path: Option<&Path>) -> Result<Self> {
        if explicit_path.is_some() {
            return Self::load(explicit_path);
        }
        match Self::standard_config_path() {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            HuginnError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            HuginnError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(path.to_path_buf());
            }
            return Err(HuginnError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        Self::standard_config_path().ok_or_else(|| {
            HuginnError::Configuration(
                "No config file found. Create ~/.huginn/config.toml or /etc/huginn/config.toml"
                    .to_string(),
            )
        })
    }

    fn standard_config_path() -> Option<PathBuf> {
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".huginn").join("config.toml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        let system_config = PathBuf::from("/etc/huginn/config.toml");
        system_config.exists().then_some(system_config)
    }
}

impl Secrets {
    /// Load secrets from the standard locations with permission checks.
    ///
    /// Returns empty secrets if no file exists; [`api_key`](Self::api_key)
    /// then falls back to the environment.
    pub fn load() -> Result<Self> {
        if let Some(home) = dirs::home_dir() {
            let user_secrets = home.join(".huginn").join("secrets.toml");
            if user_secrets.exists() {
                return Self::load_from_file(&user_secrets);
            }
        }

        let system_secrets = PathBuf::from("/etc/huginn/secrets.toml");
        if system_secrets.exists() {
            return Self::load_from_file(&system_secrets);
        }

        Ok(Secrets::default())
    }

    /// Load a specific secrets file, enforcing owner-only permissions.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        Self::check_permissions(path)?;
        let content = fs::read_to_string(path).map_err(|e| {
            HuginnError::Configuration(format!("Failed to read secrets file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            HuginnError::Configuration(format!("Failed to parse secrets file {path:?}: {e}"))
        })
    }

    /// Check that the secrets file has secure permissions (0600 or 0400).
    #[cfg(unix)]
    fn check_permissions(path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let metadata = fs::metadata(path).map_err(|e| {
            HuginnError::Configuration(format!("Failed to stat secrets file {path:?}: {e}"))
        })?;

        let mode = metadata.permissions().mode();
        if mode & 0o077 != 0 {
            return Err(HuginnError::Configuration(format!(
                "Secrets file {path:?} has insecure permissions {:o}. Must be 0600 or 0400.",
                mode & 0o777
            )));
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn check_permissions(_path: &Path) -> Result<()> {
        Ok(())
    }

    /// API key from the secrets file, falling back to `OPENAI_API_KEY`.
    pub fn api_key(&self) -> Option<String> {
        self.openai
            .as_ref()
            .map(|s| s.api_key.clone())
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|key| !key.trim().is_empty())
    }
}
