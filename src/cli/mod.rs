use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::core::AppConfig;
use crate::session::{Session, TerminalConsole};

#[derive(Subcommand)]
enum Command {
    /// List saved records, oldest first
    List {},
    /// Display a saved record and its edit history
    Show {
        /// Record file name, e.g. 20231027_123456.json
        file: String,
    },
    /// Edit a saved record
    Edit {
        /// Record file name, e.g. 20231027_123456.json
        file: String,
    },
}

/// Save, review and revise prompts and LLM responses. Without a
/// subcommand an interactive menu is started.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();

    // Fails before anything interactive happens when the API key is
    // missing
    let config = AppConfig::from_env()?;
    tracing::debug!(
        "Using model {} at {}, storing records in {}",
        config.openai_model,
        config.openai_api_hostname,
        config.storage_path.display()
    );

    let session = Session::from_config(&config);
    let mut console = TerminalConsole::new()?;

    // Handle each sub command
    match args.command {
        Some(Command::List {}) => {
            session.list(&mut console)?;
        }
        Some(Command::Show { file }) => {
            session.show(&mut console, &file)?;
        }
        Some(Command::Edit { file }) => {
            session.edit(&mut console, &file).await?;
        }
        None => {
            session.run(&mut console).await?;
        }
    }

    Ok(())
}
