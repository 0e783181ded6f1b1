pub mod config;
pub mod provider;
pub mod types;

pub use config::{GeminiConfig, GeminiConfigBuilder};
pub use provider::GeminiProvider;

pub type GeminiClient = crate::model::AIClient<GeminiProvider>;
