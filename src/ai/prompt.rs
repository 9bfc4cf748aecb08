//! Reusable prompts using Handlebars for templating. Everything that
//! is rendered here is operator text sent to an LLM, not HTML, so
//! escaping is turned off.

use std::fmt;

use anyhow::Result;
use handlebars::Handlebars;
use serde_json::json;

use crate::openai::{Message, Role};

#[derive(Debug)]
pub enum Prompt {
    System,
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

const SYSTEM_PROMPT: &str = "{{base}}{{#if input_info}} Take the following information into account when answering: {{input_info}}{{/if}}";

pub fn templates<'a>() -> Handlebars<'a> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    registry.register_escape_fn(handlebars::no_escape);
    registry
        .register_template_string(&Prompt::System.to_string(), SYSTEM_PROMPT)
        .expect("Failed to register template");
    registry
}

/// Builds the system message that opens every transcript. The base
/// instruction is extended with `input_info` only when it is non-empty.
pub fn system_message(base: &str, input_info: &str) -> Result<Message> {
    let content = templates().render(
        &Prompt::System.to_string(),
        &json!({"base": base, "input_info": input_info}),
    )?;
    Ok(Message::new(Role::System, &content))
}
