use crate::{AppResult, core::Suggestion, model::Message};
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub enum ViewEvent {
    /// A turn was appended to the conversation
    Turn(Message),
    /// A request is in flight
    Thinking,
    Suggestions(Vec<Suggestion>),
    Status(String),
    /// Waiting for the next line of input
    Prompt,
    Error(String),
    Finished,
}

/// Surface that paints the conversation as it changes
#[async_trait]
pub trait ConversationView: Send + Sync {
    async fn handle_event(&mut self, event: ViewEvent) -> AppResult<()>;
    async fn finish(&mut self) -> AppResult<()>;
}
