use anyhow::{Context, Result};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{CreateCompletionRequestArgs, CreateCompletionResponse},
};
use async_trait::async_trait;
use tracing::debug;

/// A generic oracle that extends a piece of text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextContinuation: Send + Sync {
    /// Generates at most `max_new_tokens` tokens continuing `text`.
    ///
    /// Returns only the newly generated suffix, never the input itself.
    async fn continue_text(&self, text: &str, max_new_tokens: u32) -> Result<String>;
}

/// An implementation of `TextContinuation` for any OpenAI-compatible
/// completions API (for example a local server hosting GPT-2).
pub struct OpenAICompatibleContinuation {
    client: Client<OpenAIConfig>,
    model: String,
    seed: Option<i64>,
}

impl OpenAICompatibleContinuation {
    /// Creates a new continuation client.
    ///
    /// # Arguments
    ///
    /// * `config` - The configuration for the OpenAI client, including API key and base URL.
    /// * `model` - The model identifier to request completions from (e.g., "gpt2").
    /// * `seed` - A fixed sampling seed, making output reproducible on servers that honour it.
    pub fn new(config: OpenAIConfig, model: String, seed: Option<i64>) -> Self {
        Self {
            client: Client::with_config(config),
            model,
            seed,
        }
    }
}

#[async_trait]
impl TextContinuation for OpenAICompatibleContinuation {
    async fn continue_text(&self, text: &str, max_new_tokens: u32) -> Result<String> {
        let mut builder = CreateCompletionRequestArgs::default();
        builder
            .model(&self.model)
            .prompt(text)
            .max_tokens(max_new_tokens)
            .temperature(1.0);
        if let Some(seed) = self.seed {
            builder.seed(seed);
        }
        let request = builder.build()?;

        let response = self.client.completions().create(request).await?;
        let suffix = generated_suffix(&response)?;

        debug!(max_new_tokens, suffix = %suffix, "Text continuation generated");
        Ok(suffix)
    }
}

/// Extracts the generated text of the first choice as a single line.
fn generated_suffix(response: &CreateCompletionResponse) -> Result<String> {
    let choice = response
        .choices
        .first()
        .context("No choice in completion response")?;
    Ok(choice.text.replace('\n', " "))
}
