pub mod client;
pub mod context;
mod message;
mod provider;
#[cfg(test)]
pub mod testing;

pub use client::AIClient;
pub use context::{Context, Part, Turn};
pub use message::{Message, MessageId, MessageStore, Role};
pub use provider::{GenerateResult, ModelConfig, ModelProvider};
