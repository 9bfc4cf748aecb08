use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub enum Role {
    #[serde(rename = "system")]
    System,
    #[serde(rename = "assistant")]
    Assistant,
    #[serde(rename = "user")]
    User,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Self {
        Message {
            role,
            content: content.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("No message received in completion response")]
    EmptyResponse,
}

/// Anything that can produce the next assistant message for a
/// transcript. The session only talks to this trait so tests can swap
/// in a canned implementation.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(
        &self,
        model: &str,
        messages: &[Message],
        max_tokens: u32,
    ) -> Result<String, CompletionError>;
}

// {
//   "id": "chatcmpl-...",
//   "choices": [
//     {"index": 0, "message": {"role": "assistant", "content": "..."}, "finish_reason": "stop"}
//   ],
//   ...
// }
#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

/// Client for any OpenAI compatible chat completions endpoint (Groq,
/// OpenAI, a local llama.cpp server, ...).
#[derive(Clone, Debug)]
pub struct OpenAiClient {
    api_hostname: String,
    api_key: String,
    http: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(api_hostname: &str, api_key: &str) -> Self {
        Self {
            api_hostname: api_hostname.to_string(),
            api_key: api_key.to_string(),
            http: reqwest::Client::new(),
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.api_hostname.trim_end_matches("/")
        )
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(
        &self,
        model: &str,
        messages: &[Message],
        max_tokens: u32,
    ) -> Result<String, CompletionError> {
        let payload = json!({
            "model": model,
            "messages": messages,
            "max_tokens": max_tokens,
        });
        tracing::debug!("Completion request: model={} messages={}", model, messages.len());

        let response = self
            .http
            .post(self.url())
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Completion failed with {}: {}", status, body);
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        let resp: CompletionResponse = response.json().await?;
        resp.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(CompletionError::EmptyResponse)
    }
}

/// Pulls `error.message` out of an OpenAI style error body, falling
/// back to the raw body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| body.trim().to_string())
}
