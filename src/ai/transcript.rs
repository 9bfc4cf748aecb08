//! The running message history of a chat with an LLM. Only lives in
//! memory; records persist the latest exchange, not the transcript.
use crate::openai::{Message, Role};

#[derive(Default, Debug)]
pub struct Transcript(Vec<Message>);

impl Transcript {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn new_with_messages(messages: Vec<Message>) -> Self {
        Self(messages)
    }

    pub fn messages(&self) -> &[Message] {
        &self.0
    }

    pub fn push(&mut self, msg: Message) {
        self.0.push(msg)
    }

    /// Drops the last message if it is an unanswered user turn.
    pub fn retract_user_turn(&mut self) -> Option<Message> {
        match self.0.last() {
            Some(msg) if msg.role == Role::User => self.0.pop(),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
