use super::{ModelConfig, ModelProvider, Turn};
use crate::{AppError, AppResult};

/// Returned in place of an answer when the model produced no text
pub const EMPTY_RESPONSE_FALLBACK: &str =
    "I ponder your words, but words fail me at this moment. Please try again.";

/// Gateway to a remote model: one provider, its config and the fixed
/// persona instruction sent with every request.
pub struct AIClient<P: ModelProvider> {
    provider: P,
    config: P::Config,
    system_instruction: String,
}

impl<P: ModelProvider> AIClient<P> {
    pub fn builder() -> AIClientBuilder<P> {
        AIClientBuilder::new()
    }

    /// Performs one call and returns the model's text.
    ///
    /// Errors are logged and propagated, an empty answer is replaced with
    /// [`EMPTY_RESPONSE_FALLBACK`].
    pub async fn generate(&self, turns: &[Turn]) -> AppResult<String> {
        log::info!(
            "Sending {} turns to {} ({}), image attached: {}",
            turns.len(),
            self.provider.provider_name(),
            self.config.model_name(),
            turns.last().is_some_and(Turn::has_image)
        );

        let result = self
            .provider
            .generate(turns, &self.system_instruction, &self.config)
            .await
            .inspect_err(|e| {
                log::error!("{} request failed: {}", self.provider.provider_name(), e)
            })?;

        match result.text {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => {
                log::warn!("Model returned no usable text, using fallback");
                Ok(EMPTY_RESPONSE_FALLBACK.to_string())
            }
        }
    }
}

pub struct AIClientBuilder<P: ModelProvider> {
    provider: Option<P>,
    config: Option<P::Config>,
    system_instruction: Option<String>,
}

impl<P: ModelProvider> AIClientBuilder<P> {
    pub fn new() -> Self {
        Self {
            provider: None,
            config: None,
            system_instruction: None,
        }
    }

    pub fn provider(mut self, provider: P) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn config(mut self, config: P::Config) -> Self {
        self.config = Some(config);
        self
    }

    pub fn system_instruction(mut self, instruction: &str) -> Self {
        self.system_instruction = Some(instruction.to_string());
        self
    }

    pub fn build(self) -> AppResult<AIClient<P>> {
        let provider = self
            .provider
            .ok_or_else(|| AppError::from("Provider is required"))?;
        let config = self
            .config
            .ok_or_else(|| AppError::from("Config is required"))?;

        config.validate()?;

        Ok(AIClient {
            provider,
            config,
            system_instruction: self.system_instruction.unwrap_or_default(),
        })
    }
}

impl<P: ModelProvider> Default for AIClientBuilder<P> {
    fn default() -> Self {
        Self::new()
    }
}
