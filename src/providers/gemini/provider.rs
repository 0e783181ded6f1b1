use super::config::GeminiConfig;
use super::types::*;
use crate::{
    AppError, AppResult,
    model::{GenerateResult, ModelProvider, Turn},
};
use async_trait::async_trait;
use reqwest::Client;

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Clone)]
pub struct GeminiProvider {
    client: Client,
}

impl GeminiProvider {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    fn build_request(
        &self,
        turns: &[Turn],
        system_instruction: &str,
        config: &GeminiConfig,
    ) -> GeminiRequest {
        GeminiRequest {
            contents: turns.iter().map(GeminiContent::from).collect(),
            system_instruction: GeminiSystemInstruction::new(system_instruction),
            generation_config: GeminiGenerationConfig::from_config(config),
        }
    }
}

impl Default for GeminiProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelProvider for GeminiProvider {
    type Config = GeminiConfig;

    async fn generate(
        &self,
        turns: &[Turn],
        system_instruction: &str,
        config: &Self::Config,
    ) -> AppResult<GenerateResult> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(AppError::MissingApiKey)?;

        let request = self.build_request(turns, system_instruction, config);

        let mut builder = self
            .client
            .post(config.endpoint_url())
            .header(API_KEY_HEADER, api_key)
            .json(&request);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiErrorEnvelope>(&body)
                .map(|envelope| envelope.error.message)
                .unwrap_or(body);
            return Err(AppError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await?;
        let body: GeminiResponse = serde_json::from_slice(&bytes)?;

        if let Some(error) = body.error {
            return Err(AppError::Api {
                status: error.code.unwrap_or(status.as_u16()),
                message: error.message,
            });
        }

        if let Some(reason) = body.block_reason() {
            log::warn!("Prompt blocked by Gemini: {}", reason);
        }
        if let Some(finish) = body
            .candidates
            .first()
            .and_then(|c| c.finish_reason.as_deref())
        {
            log::debug!("Gemini finish reason: {}", finish);
        }

        Ok(GenerateResult { text: body.text() })
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }
}
