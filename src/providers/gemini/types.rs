use super::config::GeminiConfig;
use crate::model::{Part, Role, Turn};
use serde::{Deserialize, Serialize};

// generateContent request types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<GeminiSystemInstruction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Serialize)]
pub struct GeminiSystemInstruction {
    pub parts: Vec<GeminiPart>,
}

impl GeminiSystemInstruction {
    pub fn new(text: &str) -> Option<Self> {
        if text.trim().is_empty() {
            return None;
        }
        Some(Self {
            parts: vec![GeminiPart::Text {
                text: text.to_string(),
            }],
        })
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct GeminiContent {
    pub role: Role,
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum GeminiPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiBlob,
    },
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeminiBlob {
    pub mime_type: String,
    pub data: String,
}

impl From<&Turn> for GeminiContent {
    fn from(turn: &Turn) -> Self {
        let parts = turn
            .parts
            .iter()
            .map(|part| match part {
                Part::Text(text) => GeminiPart::Text { text: text.clone() },
                Part::Image(image) => GeminiPart::InlineData {
                    inline_data: GeminiBlob {
                        mime_type: image.mime_type.clone(),
                        data: image.data.clone(),
                    },
                },
            })
            .collect();

        Self {
            role: turn.role,
            parts,
        }
    }
}

#[derive(Debug, Serialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking_config: Option<GeminiThinkingConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeminiThinkingConfig {
    pub thinking_budget: u32,
}

impl GeminiGenerationConfig {
    /// `None` when nothing beyond the model defaults needs to be sent
    pub fn from_config(config: &GeminiConfig) -> Option<Self> {
        let generation = Self {
            thinking_config: config
                .thinking_budget
                .map(|thinking_budget| GeminiThinkingConfig { thinking_budget }),
            max_output_tokens: config.max_output_tokens,
        };

        (generation != Self::default()).then_some(generation)
    }
}

// generateContent response types
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    pub prompt_feedback: Option<GeminiPromptFeedback>,
    pub error: Option<GeminiErrorBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    pub content: Option<GeminiResponseContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GeminiResponseContent {
    #[serde(default)]
    pub parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct GeminiResponsePart {
    pub text: Option<String>,
    /// Set on thought summaries, which are not part of the answer
    #[serde(default)]
    pub thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiPromptFeedback {
    pub block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GeminiErrorBody {
    pub code: Option<u16>,
    pub message: String,
}

/// Body of a non-2xx response
#[derive(Debug, Deserialize)]
pub struct GeminiErrorEnvelope {
    pub error: GeminiErrorBody,
}

impl GeminiResponse {
    /// Answer text of the first candidate, thoughts excluded
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter(|part| !part.thought)
            .filter_map(|part| part.text.as_deref())
            .collect();

        if text.is_empty() { None } else { Some(text) }
    }

    pub fn block_reason(&self) -> Option<&str> {
        self.prompt_feedback.as_ref()?.block_reason.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::image::encode_image;
    use serde_json::json;

    #[test]
    fn test_user_turn_with_image_serializes_inline_data_first() {
        let image = encode_image(b"plumb", "image/png").unwrap().decode().unwrap();
        let turn = Turn {
            role: Role::User,
            parts: vec![Part::Image(image), Part::Text("What is this?".to_string())],
        };

        let value = serde_json::to_value(GeminiContent::from(&turn)).unwrap();

        assert_eq!(
            value,
            json!({
                "role": "user",
                "parts": [
                    { "inlineData": { "mimeType": "image/png", "data": "cGx1bWI=" } },
                    { "text": "What is this?" }
                ]
            })
        );
    }

    #[test]
    fn test_request_carries_thinking_budget_without_output_cap() {
        let config = GeminiConfig::builder().build().unwrap();
        let request = GeminiRequest {
            contents: vec![GeminiContent::from(&Turn::text(
                Role::Model,
                "Greetings".to_string(),
            ))],
            system_instruction: GeminiSystemInstruction::new("Be wise."),
            generation_config: GeminiGenerationConfig::from_config(&config),
        };

        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(
            value,
            json!({
                "contents": [{ "role": "model", "parts": [{ "text": "Greetings" }] }],
                "systemInstruction": { "parts": [{ "text": "Be wise." }] },
                "generationConfig": { "thinkingConfig": { "thinkingBudget": 32768 } }
            })
        );
    }

    #[test]
    fn test_generation_config_omitted_when_empty() {
        let config = GeminiConfig::builder().thinking_budget(None).build().unwrap();
        assert!(GeminiGenerationConfig::from_config(&config).is_none());
        assert!(GeminiSystemInstruction::new("  ").is_none());
    }

    #[test]
    fn test_response_text_skips_thoughts() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        { "text": "Considering the compasses...", "thought": true },
                        { "text": "The Compasses " },
                        { "text": "circumscribe our desires." }
                    ]
                },
                "finishReason": "STOP"
            }]
        }))
        .unwrap();

        assert_eq!(
            response.text().as_deref(),
            Some("The Compasses circumscribe our desires.")
        );
    }

    #[test]
    fn test_response_without_text() {
        let blocked: GeminiResponse = serde_json::from_value(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }))
        .unwrap();
        assert_eq!(blocked.text(), None);
        assert_eq!(blocked.block_reason(), Some("SAFETY"));

        let no_parts: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "role": "model" }, "finishReason": "MAX_TOKENS" }]
        }))
        .unwrap();
        assert_eq!(no_parts.text(), None);
    }
}
