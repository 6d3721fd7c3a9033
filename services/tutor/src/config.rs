use crate::cli::Cli;
use std::path::PathBuf;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Defines the supported backends for the contextual responder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Provider {
    OpenAI,
    Gemini,
}

impl Provider {
    /// Base URL of the provider's OpenAI-compatible endpoint.
    pub fn api_base(&self) -> &'static str {
        match self {
            Provider::OpenAI => "https://api.openai.com/v1",
            Provider::Gemini => "https://generativelanguage.googleapis.com/v1beta/openai",
        }
    }
}

/// Holds all configuration loaded from the environment and command line at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub provider: Provider,
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub chat_model: String,
    pub log_level: Level,
    pub curriculum_path: Option<PathBuf>,
    pub offline: bool,
    pub seed: Option<u64>,
}

impl Config {
    /// Loads configuration from the environment, applies command-line
    /// overrides and checks that the selected provider has an API key.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = Self::from_env()?;
        if let Some(path) = &cli.curriculum {
            config.curriculum_path = Some(path.clone());
        }
        if cli.offline {
            config.offline = true;
        }
        if cli.seed.is_some() {
            config.seed = cli.seed;
        }
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let provider_str =
            std::env::var("REALTIME_PROVIDER").unwrap_or_else(|_| "openai".to_string());
        let provider = match provider_str.to_lowercase().as_str() {
            "gemini" => Provider::Gemini,
            _ => Provider::OpenAI,
        };

        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();
        let gemini_api_key = std::env::var("GEMINI_API_KEY").ok();

        let chat_model =
            std::env::var("CHAT_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "WARN".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let curriculum_path = std::env::var("CURRICULUM_PATH").ok().map(PathBuf::from);

        let offline = match std::env::var("TUTOR_OFFLINE") {
            Ok(value) => parse_flag(&value).ok_or_else(|| {
                ConfigError::InvalidValue(
                    "TUTOR_OFFLINE".to_string(),
                    format!("'{}' is not a boolean", value),
                )
            })?,
            Err(_) => false,
        };

        let seed = match std::env::var("TUTOR_SEED") {
            Ok(value) => Some(value.parse::<u64>().map_err(|e| {
                ConfigError::InvalidValue("TUTOR_SEED".to_string(), e.to_string())
            })?),
            Err(_) => None,
        };

        Ok(Self {
            provider,
            openai_api_key,
            gemini_api_key,
            chat_model,
            log_level,
            curriculum_path,
            offline,
            seed,
        })
    }

    /// The API key of the selected provider, if one was configured.
    pub fn api_key(&self) -> Option<&str> {
        match self.provider {
            Provider::OpenAI => self.openai_api_key.as_deref(),
            Provider::Gemini => self.gemini_api_key.as_deref(),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.offline || self.api_key().is_some() {
            return Ok(());
        }
        let var = match self.provider {
            Provider::OpenAI => "OPENAI_API_KEY must be set for 'openai' provider",
            Provider::Gemini => "GEMINI_API_KEY must be set for 'gemini' provider",
        };
        Err(ConfigError::MissingVar(var.to_string()))
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
