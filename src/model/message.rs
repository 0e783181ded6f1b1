use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::utils::ImageData;

/// Who authored a turn
/// Serializes as the wire role name, `user` or `model`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "msg-{}", self.0)
    }
}

/// One turn of the conversation. Only [`MessageStore`] creates these.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    id: MessageId,
    role: Role,
    text: String,
    image: Option<ImageData>,
    timestamp: DateTime<Utc>,
}

impl Message {
    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn image(&self) -> Option<&ImageData> {
        self.image.as_ref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Append-only, in-memory history of one session.
///
/// Ids grow with every append and timestamps never go backwards, even if the
/// wall clock does.
#[derive(Debug, Default)]
pub struct MessageStore {
    messages: Vec<Message>,
    next_id: u64,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that opens with a model-authored greeting.
    pub fn with_greeting(greeting: &str) -> Self {
        let mut store = Self::new();
        store.push_model(greeting.to_string());
        store
    }

    pub fn push_user(&mut self, text: String, image: Option<ImageData>) -> &Message {
        self.push(Role::User, text, image)
    }

    pub fn push_model(&mut self, text: String) -> &Message {
        self.push(Role::Model, text, None)
    }

    fn push(&mut self, role: Role, text: String, image: Option<ImageData>) -> &Message {
        let now = Utc::now();
        let timestamp = match self.messages.last() {
            Some(last) if last.timestamp > now => last.timestamp,
            _ => now,
        };

        self.next_id += 1;
        self.messages.push(Message {
            id: MessageId(self.next_id),
            role,
            text,
            image,
            timestamp,
        });

        log::debug!("Appended {} message #{}", role, self.next_id);
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }
}
