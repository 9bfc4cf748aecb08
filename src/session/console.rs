//! The operator side of a session. Everything interactive goes through
//! the `Console` trait so the session logic can be driven by a script.
use std::collections::VecDeque;

use anyhow::{Result, anyhow};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

pub trait Console {
    /// Shows `prompt` and reads one line. Returns `None` once input is
    /// exhausted (EOF or interrupt).
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;

    fn write_line(&mut self, line: &str);
}

/// Reads a line, treating end of input as an error that aborts the
/// current operation.
pub fn ask(console: &mut dyn Console, prompt: &str) -> Result<String> {
    console
        .read_line(prompt)?
        .ok_or_else(|| anyhow!("Input closed"))
}

/// Yes/no question. Only `y` or `yes` count as yes.
pub fn confirm(console: &mut dyn Console, question: &str) -> Result<bool> {
    let answer = ask(console, &format!("{} (y/n): ", question))?;
    let answer = answer.trim();
    Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
}

/// Asks for a replacement value where an empty answer keeps `current`.
pub fn ask_or_keep(console: &mut dyn Console, label: &str, current: &str) -> Result<String> {
    let answer = ask(console, &format!("{} (current: {}): ", label, current))?;
    if answer.is_empty() {
        Ok(current.to_string())
    } else {
        Ok(answer)
    }
}

/// Line editing console on the real terminal.
pub struct TerminalConsole {
    editor: DefaultEditor,
}

impl TerminalConsole {
    pub fn new() -> Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl Console for TerminalConsole {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write_line(&mut self, line: &str) {
        println!("{}", line);
    }
}

/// Console fed from a fixed list of answers. Everything written, and
/// every prompt shown, is captured in `output`.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    inputs: VecDeque<String>,
    pub output: Vec<String>,
}

impl ScriptedConsole {
    pub fn new<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            output: Vec::new(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.inputs.len()
    }

    /// All captured output joined with newlines.
    pub fn transcript(&self) -> String {
        self.output.join("\n")
    }
}

impl Console for ScriptedConsole {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        self.output.push(prompt.to_string());
        Ok(self.inputs.pop_front())
    }

    fn write_line(&mut self, line: &str) {
        self.output.push(line.to_string());
    }
}
