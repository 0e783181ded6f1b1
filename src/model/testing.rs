//! Scripted provider for exercising the client and the conversation without
//! a network.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::{AIClient, GenerateResult, ModelConfig, ModelProvider, Part, Turn};
use crate::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct ScriptedConfig {
    pub model: String,
}

impl Default for ScriptedConfig {
    fn default() -> Self {
        Self {
            model: "scripted".to_string(),
        }
    }
}

impl ModelConfig for ScriptedConfig {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn validate(&self) -> AppResult<()> {
        if self.model.is_empty() {
            return Err(AppError::InvalidConfig("model name is empty".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub turns: Vec<Turn>,
    pub system_instruction: String,
}

/// Answers with queued results in order. With nothing queued a call never
/// settles, which is how tests hold a request in flight.
#[derive(Clone, Default)]
pub struct ScriptedProvider {
    replies: Arc<Mutex<VecDeque<AppResult<GenerateResult>>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, text: &str) {
        self.push(Ok(GenerateResult {
            text: Some(text.to_string()),
        }));
    }

    pub fn reply_empty(&self) {
        self.push(Ok(GenerateResult { text: None }));
    }

    pub fn fail(&self, error: AppError) {
        self.push(Err(error));
    }

    fn push(&self, result: AppResult<GenerateResult>) {
        self.replies.lock().unwrap().push_back(result);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl ModelProvider for ScriptedProvider {
    type Config = ScriptedConfig;

    async fn generate(
        &self,
        turns: &[Turn],
        system_instruction: &str,
        _config: &Self::Config,
    ) -> AppResult<GenerateResult> {
        self.calls.lock().unwrap().push(RecordedCall {
            turns: turns.to_vec(),
            system_instruction: system_instruction.to_string(),
        });

        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(result) => result,
            None => std::future::pending().await,
        }
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}

/// Client around `provider` with the default scripted config.
pub fn scripted_client(provider: &ScriptedProvider) -> AIClient<ScriptedProvider> {
    AIClient::builder()
        .provider(provider.clone())
        .config(ScriptedConfig::default())
        .system_instruction("Be a mentor.")
        .build()
        .unwrap()
}

impl Turn {
    /// Text of the last text part, if any
    pub fn last_text(&self) -> Option<&str> {
        self.parts.iter().rev().find_map(|p| match p {
            Part::Text(text) => Some(text.as_str()),
            Part::Image(_) => None,
        })
    }
}
