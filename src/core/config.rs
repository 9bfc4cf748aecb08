use std::env;
use std::path::PathBuf;

use thiserror::Error;

pub const API_KEY_VAR: &str = "GROQ_API_KEY";
const DEFAULT_API_HOSTNAME: &str = "https://api.groq.com/openai";
const DEFAULT_MODEL: &str = "llama3-70b-8192";
const DEFAULT_MAX_TOKENS: u32 = 1024;
const DEFAULT_STORAGE_PATH: &str = "prompts";
const DEFAULT_SYSTEM_MESSAGE: &str = "You are a helpful assistant.";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing env var {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for env var {name}: {value}")]
    InvalidVar { name: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub storage_path: PathBuf,
    pub openai_api_hostname: String,
    pub openai_api_key: String,
    pub openai_model: String,
    pub max_tokens: u32,
    pub system_message: String,
}

impl AppConfig {
    /// Reads the configuration from the environment. The API key is
    /// the only required value, everything else has a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let openai_api_key = env::var(API_KEY_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingVar(API_KEY_VAR))?;
        let openai_api_hostname = env::var("PROMPTLOG_API_HOST")
            .unwrap_or_else(|_| DEFAULT_API_HOSTNAME.to_string());
        let openai_model =
            env::var("PROMPTLOG_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let max_tokens = match env::var("PROMPTLOG_MAX_TOKENS") {
            Ok(value) => value.trim().parse().map_err(|_| ConfigError::InvalidVar {
                name: "PROMPTLOG_MAX_TOKENS",
                value,
            })?,
            Err(_) => DEFAULT_MAX_TOKENS,
        };
        let storage_path = env::var("PROMPTLOG_STORAGE_PATH")
            .unwrap_or_else(|_| DEFAULT_STORAGE_PATH.to_string());
        let system_message = env::var("PROMPTLOG_SYSTEM_MESSAGE")
            .unwrap_or_else(|_| DEFAULT_SYSTEM_MESSAGE.to_string());

        Ok(Self {
            storage_path: PathBuf::from(storage_path),
            openai_api_hostname,
            openai_api_key,
            openai_model,
            max_tokens,
            system_message,
        })
    }
}
