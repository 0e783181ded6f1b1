use std::{path::PathBuf, time::Duration};

use clap::{Parser, Subcommand};

use crate::{AppError, AppResult, providers::gemini::GeminiConfigBuilder};

pub const HELP_TEXT: &str = "Type a question and press Enter. Commands: /image <path> attaches a symbol, \
/clear-image drops it, /suggest <n> asks a suggested question, /history, /help, /quit. \
Ctrl-C cancels an answer that is taking too long, or leaves at the prompt.";

#[derive(Debug, Parser)]
#[command(name = "mentor")]
#[command(version, about = "A Socratic guide to Masonic symbols", long_about = None)]
pub struct Cli {
    /// Image of a symbol to send along with the prompt
    #[arg(short, long)]
    pub image: Option<PathBuf>,

    /// Gemini model to use
    #[arg(short, long)]
    pub model: Option<String>,

    /// Reasoning budget in tokens (0 disables thinking)
    #[arg(long)]
    pub thinking_budget: Option<u32>,

    /// Cap on answer length; replaces the reasoning budget
    #[arg(long, conflicts_with = "thinking_budget")]
    pub max_output_tokens: Option<u32>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Override the API base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Subcommands (e.g., chat)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Question to ask
    #[arg(required=false, num_args=1..)]
    pub prompt: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive session with the mentor
    Chat,
}

impl Cli {
    /// The prompt words joined, or `None` when there are none
    pub fn text(&self) -> AppResult<Option<String>> {
        let text = self.prompt.join(" ");
        if text.trim().is_empty() {
            if self.command.is_some() || self.image.is_some() {
                return Ok(None);
            }

            Err(AppError::InvalidInput)
        } else {
            Ok(Some(text))
        }
    }

    pub fn apply_overrides(&self, mut builder: GeminiConfigBuilder) -> GeminiConfigBuilder {
        if let Some(model) = &self.model {
            builder = builder.model(model.clone());
        }
        if let Some(base_url) = &self.base_url {
            builder = builder.base_url(base_url.clone());
        }
        if let Some(budget) = self.thinking_budget {
            builder = builder.thinking_budget(Some(budget));
        }
        if let Some(max) = self.max_output_tokens {
            builder = builder.thinking_budget(None).max_output_tokens(Some(max));
        }
        if let Some(secs) = self.timeout {
            builder = builder.timeout(Some(Duration::from_secs(secs)));
        }
        builder
    }
}

/// A line typed in chat mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Send(String),
    Image(PathBuf),
    ClearImage,
    Suggest(usize),
    History,
    Help,
    Quit,
}

impl ChatCommand {
    pub fn parse(line: &str) -> AppResult<Self> {
        let trimmed = line.trim();
        if !trimmed.starts_with('/') {
            return Ok(ChatCommand::Send(line.trim_end().to_string()));
        }

        let (command, arg) = match trimmed.split_once(char::is_whitespace) {
            Some((command, arg)) => (command, arg.trim()),
            None => (trimmed, ""),
        };

        match command {
            "/image" if arg.is_empty() => {
                Err(AppError::InvalidCommand("Usage: /image <path>".to_string()))
            }
            "/image" => Ok(ChatCommand::Image(PathBuf::from(arg))),
            "/clear-image" => Ok(ChatCommand::ClearImage),
            "/suggest" => arg
                .parse()
                .map(ChatCommand::Suggest)
                .map_err(|_| AppError::InvalidCommand("Usage: /suggest <number>".to_string())),
            "/history" => Ok(ChatCommand::History),
            "/help" => Ok(ChatCommand::Help),
            "/quit" | "/exit" => Ok(ChatCommand::Quit),
            other => Err(AppError::InvalidCommand(format!(
                "Unknown command {}, try /help",
                other
            ))),
        }
    }
}
