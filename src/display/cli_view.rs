use std::io::{self, Write};

use log::{debug, error, info};

use super::view::{ConversationView, ViewEvent};
use crate::{
    error::AppError,
    model::{Message, Role},
};

/// Plain terminal surface. Answers are printed as raw markdown text.
pub struct CliView {
    /// Print the user's own turns back (chat mode)
    pub echo_user: bool,
    thinking: bool,
}

impl CliView {
    pub fn new(echo_user: bool) -> Self {
        CliView {
            echo_user,
            thinking: false,
        }
    }

    pub fn write(&mut self, data: &str) -> Result<(), AppError> {
        print!("{}", data);
        io::stdout().flush()?;
        Ok(())
    }

    pub fn write_message(&mut self, message: &str) -> Result<(), AppError> {
        println!("{}", message);
        io::stdout().flush()?;
        Ok(())
    }

    pub fn clear_line(&mut self) -> Result<(), AppError> {
        print!("\r\x1b[K");
        io::stdout().flush()?;
        Ok(())
    }

    fn stop_thinking(&mut self) -> Result<(), AppError> {
        if self.thinking {
            self.clear_line()?;
            self.thinking = false;
        }
        Ok(())
    }

    fn write_turn(&mut self, message: &Message) -> Result<(), AppError> {
        match message.role() {
            Role::User => {
                if !self.echo_user {
                    return Ok(());
                }
                if let Some(image) = message.image() {
                    self.write_message(&format!("You: [image: {}]", image.summary()))?;
                }
                if !message.text().is_empty() {
                    self.write_message(&format!("You: {}", message.text()))?;
                }
            }
            Role::Model => {
                self.write_message(&format!("Mentor:\n{}\n", message.text()))?;
            }
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ConversationView for CliView {
    async fn finish(&mut self) -> Result<(), AppError> {
        self.handle_event(ViewEvent::Finished).await
    }

    async fn handle_event(&mut self, event: ViewEvent) -> Result<(), AppError> {
        match event {
            ViewEvent::Turn(message) => {
                self.stop_thinking()?;
                self.write_turn(&message)?;
                debug!("Rendered {} turn {}", message.role(), message.id());
            }
            ViewEvent::Thinking => {
                self.write("⏳ The Mentor is reflecting...")?;
                self.thinking = true;
            }
            ViewEvent::Suggestions(suggestions) => {
                self.write_message("Explore common symbols (/suggest <n>):")?;
                for (i, suggestion) in suggestions.iter().enumerate() {
                    self.write_message(&format!(
                        "  {}. {} - {}",
                        i + 1,
                        suggestion.title,
                        suggestion.subtitle
                    ))?;
                }
                self.write_message("")?;
            }
            ViewEvent::Status(status) => {
                self.stop_thinking()?;
                self.write_message(&status)?;
                info!("Status: {}", status);
            }
            ViewEvent::Prompt => {
                self.stop_thinking()?;
                self.write("> ")?;
            }
            ViewEvent::Error(error) => {
                self.stop_thinking()?;
                self.write_message(&format!("Error: {}", error))?;
                error!("View error: {}", error);
            }
            ViewEvent::Finished => {
                self.stop_thinking()?;
                io::stdout().flush()?;
                info!("View finished");
            }
        }

        Ok(())
    }
}
