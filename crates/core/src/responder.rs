//! Contextual Responder
//!
//! Utterances that are neither commands nor drill answers (small talk in the
//! introduction, the free-form scenario) are answered by an external language
//! model. This module defines that seam and its implementations; the prompt is
//! a thin pass-through and carries no tutoring logic of its own.

use crate::engine::Stage;
use anyhow::{Context, Result};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;
use tracing::debug;

/// Reply used when no language model is available or the call fails.
pub const FALLBACK_REPLY: &str =
    "I'm here to help you learn German! Try saying 'start lesson' or 'help' for commands.";

/// What the responder needs to know about the session for one reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseContext {
    pub lesson_title: Option<String>,
    pub stage: Stage,
}

impl ResponseContext {
    /// Builds the HANS system prompt for this context.
    pub fn system_prompt(&self) -> String {
        let mut prompt = String::from("You are HANS, a German tutor. The user is learning German.\n");
        if let Some(title) = &self.lesson_title {
            prompt.push_str(&format!("Current lesson: {}\n", title));
        }
        prompt.push_str(&format!("The learner is currently in {}.\n\n", self.stage));
        if self.stage == Stage::Scenario {
            prompt.push_str(
                "Play out a short real-life situation that uses the current lesson. Speak simple German and help in English when the learner is stuck.\n",
            );
        }
        prompt.push_str(
            "Respond helpfully to their input, incorporating German learning when appropriate. Be encouraging, use some German words they should know, and keep it conversational but educational.",
        );
        prompt
    }
}

/// Anything that can answer a free-form utterance in the tutor's voice.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContextualResponder: Send + Sync {
    async fn respond(&self, context: &ResponseContext, user_text: &str) -> Result<String>;
}

/// A responder backed by any OpenAI-compatible chat completion API.
pub struct OpenAICompatibleResponder {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAICompatibleResponder {
    /// Creates a new responder.
    ///
    /// # Arguments
    ///
    /// * `config` - The configuration for the OpenAI client, including API key and base URL.
    /// * `model` - The chat model identifier (e.g., "gpt-4o-mini").
    pub fn new(config: OpenAIConfig, model: String) -> Self {
        Self {
            client: Client::with_config(config),
            model,
        }
    }
}

#[async_trait]
impl ContextualResponder for OpenAICompatibleResponder {
    async fn respond(&self, context: &ResponseContext, user_text: &str) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(context.system_prompt())
                    .build()?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(user_text)
                    .build()?
                    .into(),
            ])
            .build()?;

        debug!(model = %self.model, stage = %context.stage, "Requesting contextual response");
        let response = self.client.chat().create(request).await?;

        let answer = response
            .choices
            .first()
            .context("No response choice from LLM")?
            .message
            .content
            .as_ref()
            .context("No content in LLM response")?;

        // Markdown emphasis reads badly when spoken.
        Ok(answer.replace('*', ""))
    }
}

/// An offline responder that always nudges the learner back to the commands.
pub struct CannedResponder;

#[async_trait]
impl ContextualResponder for CannedResponder {
    async fn respond(&self, _context: &ResponseContext, _user_text: &str) -> Result<String> {
        Ok(FALLBACK_REPLY.to_string())
    }
}
