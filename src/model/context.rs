use super::{Message, Role};
use crate::utils::{ImageData, InlineImage};
use std::collections::VecDeque;

/// How many prior turns travel with each request
pub const RECENCY_WINDOW: usize = 10;

/// Sent in place of an empty question, e.g. when only an image was attached
pub const DEFAULT_IMAGE_PROMPT: &str = "Please analyze this symbol.";

/// A piece of content inside a turn
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text(String),
    Image(InlineImage),
}

/// A provider-neutral, role-tagged turn of the request context
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Turn {
    pub fn text(role: Role, text: String) -> Self {
        Self {
            role,
            parts: vec![Part::Text(text)],
        }
    }

    pub fn has_image(&self) -> bool {
        self.parts.iter().any(|p| matches!(p, Part::Image(_)))
    }
}

/// Builds the bounded context for one request.
///
/// History is kept to the newest `max_history` turns and carries text only;
/// the outgoing turn is appended after trimming and is the only one that may
/// carry an image.
#[derive(Debug, Clone)]
pub struct Context {
    turns: VecDeque<Turn>,
    max_history: usize,
}

impl Context {
    pub fn new(max_history: usize) -> Self {
        Self {
            turns: VecDeque::with_capacity(max_history),
            max_history,
        }
    }

    /// History window plus the outgoing user turn, ready to send.
    pub fn build(history: &[Message], text: &str, image: Option<&ImageData>) -> Vec<Turn> {
        let mut context = Self::new(RECENCY_WINDOW);
        context.add_messages(history);
        context.into_request(text, image)
    }

    pub fn add_messages(&mut self, messages: &[Message]) {
        let skip = messages.len().saturating_sub(self.max_history);
        for message in &messages[skip..] {
            self.add_message(message);
        }
    }

    pub fn add_message(&mut self, message: &Message) {
        // Images from earlier turns are not re-sent
        self.turns
            .push_back(Turn::text(message.role(), prompt_text(message.text())));
        self.trim();
    }

    fn trim(&mut self) {
        while self.turns.len() > self.max_history {
            self.turns.pop_front();
        }
    }

    pub fn into_request(self, text: &str, image: Option<&ImageData>) -> Vec<Turn> {
        let mut parts = Vec::with_capacity(2);

        if let Some(image) = image {
            match image.decode() {
                Some(inline) => parts.push(Part::Image(inline)),
                None => log::warn!("Dropping image that is not a base64 data URL"),
            }
        }
        parts.push(Part::Text(prompt_text(text)));

        let mut turns: Vec<Turn> = self.turns.into();
        turns.push(Turn {
            role: Role::User,
            parts,
        });
        turns
    }
}

fn prompt_text(text: &str) -> String {
    if text.trim().is_empty() {
        DEFAULT_IMAGE_PROMPT.to_string()
    } else {
        text.to_string()
    }
}
