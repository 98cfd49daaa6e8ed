//! Builder for configuring orchestrator instances

use std::sync::Arc;
use std::time::Duration;

use super::{MAX_CONCURRENCY, Orchestrator};
use crate::annotator::Annotator;
use crate::config::{Config, Secrets};
use crate::providers::openai::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::providers::{ChatProvider, OpenAiClient};
use crate::types::{ChatOptions, ToolChoice};
use crate::{HuginnError, Result};

/// Main entry point for creating orchestrator instances.
pub struct Huginn;

impl Huginn {
    /// Create a new builder for configuring the orchestrator.
    pub fn builder() -> HuginnBuilder {
        HuginnBuilder::new()
    }
}

/// Builder for configuring orchestrator instances.
pub struct HuginnBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout: Duration,
    options: ChatOptions,
    concurrency: usize,
    provider: Option<Arc<dyn ChatProvider>>,
}

impl Default for HuginnBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HuginnBuilder {
    pub fn new() -> Self {
        Self {
            api_key: None,
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            options: ChatOptions::default(),
            concurrency: MAX_CONCURRENCY,
            provider: None,
        }
    }

    /// Seed the builder from loaded configuration and secrets.
    ///
    /// `OPENAI_BASE_URL`, when set, takes precedence over `service.base_url`.
    pub fn from_config(config: &Config, secrets: &Secrets) -> Self {
        let service = &config.service;
        let mut options = ChatOptions::default()
            .model(&service.model)
            .tool_choice(service.tool_choice);
        options.temperature = service.temperature;
        options.max_tokens = service.max_tokens;

        let base_url = std::env::var("OPENAI_BASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| service.base_url.clone());

        let mut builder = Self::new()
            .base_url(base_url)
            .timeout(Duration::from_secs(service.timeout_secs))
            .options(options)
            .concurrency(config.batch.concurrency);
        builder.api_key = secrets.api_key();
        builder
    }

    /// Set the API key for the OpenAI-compatible service.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Point at a different OpenAI-compatible endpoint.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Per-request timeout for the HTTP client.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.options.model = model.into();
        self
    }

    pub fn tool_choice(mut self, choice: ToolChoice) -> Self {
        self.options.tool_choice = choice;
        self
    }

    /// Replace all chat options at once.
    pub fn options(mut self, options: ChatOptions) -> Self {
        self.options = options;
        self
    }

    /// Bulk concurrency; clamped to `1..=MAX_CONCURRENCY` at build time.
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Use a custom provider instead of the built-in HTTP client.
    ///
    /// Overrides `api_key`, `base_url` and `timeout`.
    pub fn provider(mut self, provider: Arc<dyn ChatProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Build the orchestrator.
    ///
    /// Fails when no provider is given and the public endpoint would be
    /// called without an API key.
    pub fn build(self) -> Result<Orchestrator> {
        let provider: Arc<dyn ChatProvider> = match self.provider {
            Some(provider) => provider,
            None => {
                let base_url = self
                    .base_url
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
                if self.api_key.is_none() && base_url.trim_end_matches('/') == DEFAULT_BASE_URL {
                    return Err(HuginnError::Configuration(
                        "no API key configured; set OPENAI_API_KEY or add it to secrets.toml"
                            .to_string(),
                    ));
                }
                Arc::new(OpenAiClient::with_base_url(
                    self.api_key,
                    base_url,
                    self.timeout,
                )?)
            }
        };

        let annotator = Annotator::new(provider).with_options(self.options);
        Ok(Orchestrator::new(annotator).with_concurrency(self.concurrency))
    }
}
