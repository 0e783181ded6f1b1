use super::Turn;
use crate::AppResult;

/// What a provider got back from one call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateResult {
    /// `None` when the model produced no usable text
    pub text: Option<String>,
}

/// Core Model Config Trait that all provider configs must implement
pub trait ModelConfig: Send + Sync + Clone {
    /// Returns the selected model name
    fn model_name(&self) -> &str;

    /// Validates the config
    fn validate(&self) -> AppResult<()>;
}

/// Core Model Provider Trait that all providers must implement
#[async_trait::async_trait]
pub trait ModelProvider: Send + Sync {
    type Config: ModelConfig;

    /// Sends the turns with the given system instruction and waits for the
    /// complete answer.
    async fn generate(
        &self,
        turns: &[Turn],
        system_instruction: &str,
        config: &Self::Config,
    ) -> AppResult<GenerateResult>;

    fn provider_name(&self) -> &'static str;
}
