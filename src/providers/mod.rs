pub mod gemini;

pub use gemini::{GeminiClient, GeminiConfig, GeminiProvider};

use crate::{AppResult, model::AIClient};

/// Gemini-backed client carrying the given persona instruction
pub fn create_gemini_client(
    config: GeminiConfig,
    system_instruction: &str,
) -> AppResult<GeminiClient> {
    AIClient::builder()
        .provider(GeminiProvider::new())
        .config(config)
        .system_instruction(system_instruction)
        .build()
}
