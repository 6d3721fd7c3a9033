//! HANS Tutor Service Library Crate
//!
//! Configuration, responder wiring and the terminal conversation loop for the
//! `hans` binary, which is a thin wrapper around this library.

pub mod cli;
pub mod config;
pub mod console;

use crate::config::Config;
use anyhow::Context;
use async_openai::config::OpenAIConfig;
use hans_core::responder::{CannedResponder, ContextualResponder, OpenAICompatibleResponder};
use std::sync::Arc;
use tracing::info;

/// Chooses the contextual responder for the configured provider.
pub fn build_responder(config: &Config) -> anyhow::Result<Arc<dyn ContextualResponder>> {
    if config.offline {
        info!("Offline mode, using canned responses.");
        return Ok(Arc::new(CannedResponder));
    }

    let api_key = config
        .api_key()
        .context("No API key configured for the selected provider")?;
    info!(provider = ?config.provider, model = %config.chat_model, "Using LLM responder.");
    let openai_config = OpenAIConfig::new()
        .with_api_key(api_key)
        .with_api_base(config.provider.api_base());
    Ok(Arc::new(OpenAICompatibleResponder::new(
        openai_config,
        config.chat_model.clone(),
    )))
}
