use anyhow::Result;

use super::Session;
use super::console::{Console, ask, confirm};
use crate::ai::Transcript;
use crate::ai::prompt::system_message;
use crate::openai::{Message, Role};
use crate::store::Record;

const EXIT_COMMAND: &str = "exit";

impl Session {
    /// Collects a new prompt/result pair and persists it. Returns the
    /// file names of every record written.
    ///
    /// With the LLM this is a chat loop where each exchange can be
    /// saved on its own. Only the latest prompt and result go into the
    /// record, earlier turns only serve as context for the model.
    pub async fn save_new(&self, console: &mut dyn Console) -> Result<Vec<String>> {
        let service_name = ask(console, "Service name (e.g. llama3-70b-8192): ")?;
        let input_info = ask(console, "Additional info (e.g. tone, keywords): ")?;

        if confirm(console, "Use the LLM?")? {
            self.save_with_completion(console, &service_name, &input_info)
                .await
        } else {
            let file_name = self.save_manual(console, &service_name, &input_info)?;
            Ok(vec![file_name])
        }
    }

    async fn save_with_completion(
        &self,
        console: &mut dyn Console,
        service_name: &str,
        input_info: &str,
    ) -> Result<Vec<String>> {
        let mut transcript = Transcript::new_with_messages(vec![system_message(
            &self.system_message,
            input_info,
        )?]);
        let mut saved = Vec::new();

        loop {
            let prompt = ask(console, "Prompt (type 'exit' to finish): ")?;
            if prompt.trim().eq_ignore_ascii_case(EXIT_COMMAND) {
                break;
            }

            transcript.push(Message::new(Role::User, &prompt));
            let result = match self.generate(transcript.messages()).await {
                Ok(result) => {
                    console.write_line(&format!("Result: {}", result));
                    result
                }
                Err(err) => {
                    tracing::error!("Completion failed: {}", err);
                    console.write_line(&format!("Error: {}", err));
                    if !confirm(console, "Enter the result manually?")? {
                        transcript.retract_user_turn();
                        continue;
                    }
                    ask(console, "Result: ")?
                }
            };
            transcript.push(Message::new(Role::Assistant, &result));

            if confirm(console, "Save this exchange?")? {
                let record = Record::new(service_name, input_info, &prompt, &result, &self.now());
                let file_name = self.store.save(&record)?;
                console.write_line(&format!("Saved to '{}'", file_name));
                saved.push(file_name);
            }
        }

        Ok(saved)
    }

    fn save_manual(
        &self,
        console: &mut dyn Console,
        service_name: &str,
        input_info: &str,
    ) -> Result<String> {
        let prompt = ask(console, "Prompt: ")?;
        let result = ask(console, "Result: ")?;

        let record = Record::new(service_name, input_info, &prompt, &result, &self.now());
        let file_name = self.store.save(&record)?;
        console.write_line(&format!("Saved to '{}'", file_name));
        Ok(file_name)
    }
}
