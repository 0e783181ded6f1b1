use clap::Parser;
use dotenv::dotenv;

mod cli;
mod core;
mod display;
mod error;
mod model;
mod providers;
mod utils;

pub use crate::cli::{Cli, Commands};
pub use crate::error::AppError;
pub type AppResult<T, E = crate::error::AppError> = std::result::Result<T, E>;

#[tokio::main]
async fn main() -> AppResult<()> {
    dotenv().ok();
    // Dropping the handle would stop the file writer
    let _logger = utils::logger_init().ok();
    log::info!("Starting mentor...");

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Chat) => {
            log::info!("Starting chat...");
            core::run_chat(&cli).await?;
        }
        None => {
            core::process_prompt(&cli).await?;
        }
    }

    Ok(())
}
