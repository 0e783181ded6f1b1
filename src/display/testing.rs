//! View double that keeps every event for later assertions.

use super::{ConversationView, ViewEvent};
use crate::AppResult;

#[derive(Debug, Default)]
pub struct RecordingView {
    pub events: Vec<ViewEvent>,
    pub finished: bool,
}

impl RecordingView {
    pub fn errors(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ViewEvent::Error(error) => Some(error.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn statuses(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ViewEvent::Status(status) => Some(status.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl ConversationView for RecordingView {
    async fn handle_event(&mut self, event: ViewEvent) -> AppResult<()> {
        self.events.push(event);
        Ok(())
    }

    async fn finish(&mut self) -> AppResult<()> {
        self.finished = true;
        Ok(())
    }
}
