pub mod core;

pub use self::core::{CompletionClient, CompletionError, Message, OpenAiClient, Role};
