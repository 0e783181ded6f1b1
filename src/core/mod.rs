mod agent;
pub mod conversation;
mod persona;

pub use agent::{process_prompt, run_chat};
pub use conversation::Conversation;
pub use persona::{SUGGESTIONS, SYSTEM_INSTRUCTION, Suggestion};
