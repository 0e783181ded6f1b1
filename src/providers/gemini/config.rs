use std::{fmt, time::Duration};

use crate::{AppError, AppResult, model::ModelConfig};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_THINKING_BUDGET: u32 = 32768;
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

#[derive(Clone)]
pub struct GeminiConfig {
    /// Checked when a request is made, not at startup
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub thinking_budget: Option<u32>,
    /// Mutually exclusive with `thinking_budget`
    pub max_output_tokens: Option<u32>,
    pub timeout: Option<Duration>,
}

impl GeminiConfig {
    pub fn new(model: String) -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model,
            thinking_budget: Some(DEFAULT_THINKING_BUDGET),
            max_output_tokens: None,
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        }
    }

    pub fn builder() -> GeminiConfigBuilder {
        GeminiConfigBuilder::new()
    }

    /// Builder seeded from `GEMINI_API_KEY` (or `API_KEY`), `GEMINI_MODEL`
    /// and `GEMINI_BASE_URL`.
    pub fn from_env() -> GeminiConfigBuilder {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> GeminiConfigBuilder {
        let present = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut builder = GeminiConfigBuilder::new();

        if let Some(key) = present("GEMINI_API_KEY").or_else(|| present("API_KEY")) {
            builder = builder.api_key(key);
        }
        if let Some(model) = present("GEMINI_MODEL") {
            builder = builder.model(model);
        }
        if let Some(base_url) = present("GEMINI_BASE_URL") {
            builder = builder.base_url(base_url);
        }

        builder
    }

    pub fn endpoint_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("thinking_budget", &self.thinking_budget)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ModelConfig for GeminiConfig {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn validate(&self) -> AppResult<()> {
        if self.model.trim().is_empty() {
            return Err(AppError::InvalidConfig(
                "Model name cannot be empty".to_string(),
            ));
        }
        if self.base_url.trim().is_empty() {
            return Err(AppError::InvalidConfig("Base URL cannot be empty".to_string()));
        }
        if self.thinking_budget.is_some() && self.max_output_tokens.is_some() {
            return Err(AppError::InvalidConfig(
                "thinking budget and max output tokens cannot both be set".to_string(),
            ));
        }
        if self.timeout.is_some_and(|t| t.is_zero()) {
            return Err(AppError::InvalidConfig("Timeout cannot be 0".to_string()));
        }
        Ok(())
    }
}

// Builder for GeminiConfig
#[derive(Debug)]
pub struct GeminiConfigBuilder {
    config: GeminiConfig,
}

impl GeminiConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: GeminiConfig::new(DEFAULT_MODEL.to_string()),
        }
    }

    pub fn api_key(mut self, api_key: String) -> Self {
        self.config.api_key = Some(api_key);
        self
    }

    pub fn base_url(mut self, base_url: String) -> Self {
        self.config.base_url = base_url;
        self
    }

    pub fn model(mut self, model: String) -> Self {
        self.config.model = model;
        self
    }

    /// `None` leaves the reasoning budget to the model's default
    pub fn thinking_budget(mut self, budget: Option<u32>) -> Self {
        self.config.thinking_budget = budget;
        self
    }

    pub fn max_output_tokens(mut self, max: Option<u32>) -> Self {
        self.config.max_output_tokens = max;
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn build(self) -> AppResult<GeminiConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for GeminiConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
