use anyhow::Result;

use super::Session;
use super::console::{Console, ask_or_keep, confirm};
use crate::ai::prompt::system_message;
use crate::openai::{Message, Role};
use crate::store::{Record, RecordUpdate};

impl Session {
    /// Loads a record and prints it along with its edit history. Never
    /// writes anything.
    pub fn show(&self, console: &mut dyn Console, file_name: &str) -> Result<Record> {
        let record = self.store.load(file_name)?;
        display_record(console, &record);
        Ok(record)
    }

    /// Edits a record. The state before the edit is appended to the
    /// record's history, and nothing is written unless the operator
    /// confirms. Returns whether the record was saved.
    pub async fn edit(&self, console: &mut dyn Console, file_name: &str) -> Result<bool> {
        let mut record = self.show(console, file_name)?;

        console.write_line("");
        console.write_line("--- Edit mode ---");
        let prompt = ask_or_keep(console, "New prompt", &record.prompt)?;
        let input_info = ask_or_keep(console, "New additional info", &record.input_info)?;
        let service_name = ask_or_keep(console, "New service name", &record.service_name)?;

        let mut result = None;
        if confirm(console, "Regenerate the result?")? {
            // Regeneration starts a fresh transcript from the edited
            // prompt, independent of whatever chat produced the record
            let messages = vec![
                system_message(&self.system_message, &input_info)?,
                Message::new(Role::User, &prompt),
            ];
            match self.generate(&messages).await {
                Ok(generated) => {
                    console.write_line(&format!("New result: {}", generated));
                    result = Some(generated);
                }
                Err(err) => {
                    tracing::error!("Regeneration failed for {}: {}", file_name, err);
                    console.write_line(&format!(
                        "Error: failed to regenerate the result: {}",
                        err
                    ));
                }
            }
        }
        let result = match result {
            Some(result) => result,
            None => ask_or_keep(console, "New result", &record.result)?,
        };

        record.apply_edit(
            RecordUpdate {
                prompt,
                result,
                input_info,
                service_name,
            },
            &self.now(),
        );

        if confirm(console, "Save changes?")? {
            self.store.update(file_name, &record)?;
            console.write_line("Record updated.");
            Ok(true)
        } else {
            console.write_line("Changes discarded.");
            Ok(false)
        }
    }
}

fn display_record(console: &mut dyn Console, record: &Record) {
    console.write_line(&format!("Prompt: {}", record.prompt));
    console.write_line(&format!("Result: {}", record.result));
    console.write_line(&format!(
        "Additional info: {} Service name: {}",
        record.input_info, record.service_name
    ));

    console.write_line("");
    console.write_line("--- Edit history ---");
    for (i, entry) in record.history.iter().rev().enumerate() {
        console.write_line(&format!("--- History {} ---", i + 1));
        console.write_line(&format!("Timestamp: {}", entry.timestamp));
        console.write_line(&format!("Prompt: {}", entry.prompt));
        console.write_line(&format!("Result: {}", entry.result));
        console.write_line(&format!(
            "Additional info: {} Service name: {}",
            entry.input_info, entry.old_service_name
        ));
    }
}
