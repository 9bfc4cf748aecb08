//! The interactive prompt manager. A `Session` owns the record store
//! and the completion client and drives the numbered menu:
//!
//! 1. save a new prompt/result (optionally chatting with the LLM)
//! 2. load and display a record
//! 3. edit a record, appending the previous state to its history
//! 4. exit
//!
//! Errors from an operation are reported and the menu continues.
use std::str::FromStr;

use anyhow::{Error, Result, anyhow};
use chrono::{Local, NaiveDateTime};

use crate::core::AppConfig;
use crate::openai::{CompletionClient, CompletionError, Message, OpenAiClient};
use crate::store::RecordStore;

pub mod console;
pub mod editor;
pub mod save;

pub use console::{Console, ScriptedConsole, TerminalConsole};

pub type Clock = Box<dyn Fn() -> NaiveDateTime + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MenuChoice {
    Save,
    Load,
    Edit,
    Exit,
}

impl FromStr for MenuChoice {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "1" => Ok(MenuChoice::Save),
            "2" => Ok(MenuChoice::Load),
            "3" => Ok(MenuChoice::Edit),
            "4" => Ok(MenuChoice::Exit),
            other => Err(anyhow!("Invalid menu choice: {}", other)),
        }
    }
}

pub struct Session {
    store: RecordStore,
    client: Box<dyn CompletionClient>,
    model: String,
    max_tokens: u32,
    system_message: String,
    clock: Clock,
}

impl Session {
    pub fn new(store: RecordStore, client: Box<dyn CompletionClient>, model: &str) -> Self {
        Self {
            store,
            client,
            model: model.to_string(),
            max_tokens: 1024,
            system_message: String::from("You are a helpful assistant."),
            clock: Box::new(|| Local::now().naive_local()),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let client = OpenAiClient::new(&config.openai_api_hostname, &config.openai_api_key);
        Self::new(
            RecordStore::new(&config.storage_path),
            Box::new(client),
            &config.openai_model,
        )
        .max_tokens(config.max_tokens)
        .system_message(&config.system_message)
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn system_message(mut self, system_message: &str) -> Self {
        self.system_message = system_message.to_string();
        self
    }

    /// Replaces the source of "now" used for record and history
    /// timestamps.
    pub fn clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    fn now(&self) -> NaiveDateTime {
        (self.clock)()
    }

    async fn generate(&self, messages: &[Message]) -> Result<String, CompletionError> {
        self.client
            .complete(&self.model, messages, self.max_tokens)
            .await
    }

    /// Runs the menu until the operator exits or input runs out.
    pub async fn run(&self, console: &mut dyn Console) -> Result<()> {
        loop {
            display_menu(console);
            let Some(choice) = read_choice(console)? else {
                break;
            };

            if choice == MenuChoice::Exit {
                console.write_line("Goodbye.");
                break;
            }
            if let Err(err) = self.dispatch(console, choice).await {
                report(console, &err);
            }
        }
        Ok(())
    }

    async fn dispatch(&self, console: &mut dyn Console, choice: MenuChoice) -> Result<()> {
        match choice {
            MenuChoice::Save => {
                self.save_new(console).await?;
            }
            MenuChoice::Load => {
                if let Some(file_name) = ask_file_name(console, "File to load")? {
                    self.show(console, &file_name)?;
                }
            }
            MenuChoice::Edit => {
                if let Some(file_name) = ask_file_name(console, "File to edit")? {
                    self.edit(console, &file_name).await?;
                }
            }
            MenuChoice::Exit => {}
        }
        Ok(())
    }

    /// Prints the file names of every stored record.
    pub fn list(&self, console: &mut dyn Console) -> Result<Vec<String>> {
        let names = self.store.list()?;
        if names.is_empty() {
            console.write_line(&format!(
                "No records in {}",
                self.store.dir().display()
            ));
        }
        for name in names.iter() {
            console.write_line(name);
        }
        Ok(names)
    }
}

/// Reports a failed operation without ending the session.
pub fn report(console: &mut dyn Console, err: &Error) {
    tracing::error!("Operation failed: {:#}", err);
    console.write_line(&format!("Error: {}", err));
}

fn display_menu(console: &mut dyn Console) {
    console.write_line("");
    console.write_line("Prompt manager");
    console.write_line("1. Save a prompt and result");
    console.write_line("2. Load a prompt");
    console.write_line("3. Edit a prompt");
    console.write_line("4. Exit");
}

fn read_choice(console: &mut dyn Console) -> Result<Option<MenuChoice>> {
    loop {
        let Some(line) = console.read_line("Choose an option (1-4): ")? else {
            return Ok(None);
        };
        match line.parse() {
            Ok(choice) => return Ok(Some(choice)),
            Err(_) => console.write_line("Invalid choice."),
        }
    }
}

fn ask_file_name(console: &mut dyn Console, label: &str) -> Result<Option<String>> {
    let file_name = console::ask(
        console,
        &format!("{} (e.g. 20231027_123456.json): ", label),
    )?;
    let file_name = file_name.trim();
    if file_name.is_empty() {
        Ok(None)
    } else {
        Ok(Some(file_name.to_string()))
    }
}
