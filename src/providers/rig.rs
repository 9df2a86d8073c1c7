//! rig-core integration for embeddings and review generation.
//!
//! Uses rig-core's provider clients for multi-provider support. Chat
//! completions work with OpenAI, Anthropic, Gemini, Groq, DeepSeek and any
//! OpenAI-compatible API; embeddings with OpenAI, Gemini and
//! OpenAI-compatible APIs.

use std::time::Duration;

use async_trait::async_trait;
use rig::client::{CompletionClient, EmbeddingsClient};
use rig::completion::Prompt;
use rig::embeddings::EmbeddingModel;
use rig::providers;

use crate::config::{EmbeddingConfig, ProviderConfig};
use crate::models::{ProviderName, Vector};

use super::{ChatProvider, EmbeddingProvider, ProviderError};

/// Maximum tokens per review completion.
const MAX_TOKENS: u64 = 4096;

/// System preamble for every review request.
const SYSTEM_PREAMBLE: &str = "You're a senior software engineer reviewing pull requests.";

/// Maximum number of retry attempts for transient API errors.
pub const MAX_RETRIES: u32 = 3;

/// Initial backoff delay between retries.
pub const INITIAL_BACKOFF: Duration = Duration::from_secs(5);

/// Maximum backoff delay between retries.
pub const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Build a one-shot agent from a rig-core client and prompt it.
macro_rules! prompt_simple {
    ($client:expr, $model:expr, $user:expr, $label:expr) => {{
        let agent = $client
            .agent($model)
            .preamble(SYSTEM_PREAMBLE)
            .temperature(0.2)
            .max_tokens(MAX_TOKENS)
            .build();
        agent
            .prompt($user)
            .await
            .map_err(|e| ProviderError::ApiError(format!("{} API error: {e}", $label)))
    }};
}

/// Embed one text with a rig-core client's embedding model.
macro_rules! embed_simple {
    ($client:expr, $model:expr, $text:expr, $label:expr) => {{
        $client
            .embedding_model($model)
            .embed_text($text)
            .await
            .map(|embedding| embedding.vec)
            .map_err(|e| ProviderError::ApiError(format!("{} embedding error: {e}", $label)))
    }};
}

/// Create a rig-core client using the `Client::new(api_key)` convention.
macro_rules! new_client {
    ($provider_mod:path, $api_key:expr, $label:expr) => {{
        <$provider_mod>::new($api_key).map_err(|e| {
            ProviderError::ApiError(format!("failed to create {} client: {e}", $label))
        })
    }};
}

/// rig-core backed chat and embedding provider.
///
/// The chat and embedding sides are configured independently so that, for
/// example, reviews can be generated by Anthropic while embeddings come
/// from OpenAI.
pub struct RigProvider {
    chat: ProviderConfig,
    embedding: EmbeddingConfig,
}

impl RigProvider {
    /// Create a provider, checking that both sides have credentials.
    pub fn new(chat: ProviderConfig, embedding: EmbeddingConfig) -> Result<Self, ProviderError> {
        if chat.api_key.is_none() {
            return Err(ProviderError::NotConfigured(format!(
                "no API key found for provider '{}'. Set {} or {}.",
                chat.name,
                crate::constants::ENV_API_KEY,
                chat.name.api_key_env_var(),
            )));
        }
        if embedding.api_key.is_none() {
            return Err(ProviderError::NotConfigured(format!(
                "no API key found for embedding provider '{}'. Set [embedding] api_key or {}.",
                embedding.name,
                embedding.name.api_key_env_var(),
            )));
        }
        if !embedding.name.supports_embeddings() {
            return Err(ProviderError::NotConfigured(format!(
                "provider '{}' does not offer embeddings; use openai, gemini or openai-compatible",
                embedding.name
            )));
        }
        Ok(Self { chat, embedding })
    }

    /// Build an OpenAI chat-completions client, optionally with a custom base URL.
    fn build_openai_client(
        api_key: &str,
        base_url: Option<&str>,
    ) -> Result<providers::openai::CompletionsClient, ProviderError> {
        let mut builder = providers::openai::CompletionsClient::builder().api_key(api_key);
        if let Some(base_url) = base_url {
            builder = builder.base_url(base_url);
        }
        let client: providers::openai::CompletionsClient = builder
            .build()
            .map_err(|e| ProviderError::ApiError(format!("failed to create OpenAI client: {e}")))?;
        Ok(client)
    }

    /// Build an OpenAI client for the embeddings endpoint.
    ///
    /// Embedding models live on the Responses-API client; the
    /// chat-completions client has no embeddings support.
    fn build_openai_embedding_client(
        api_key: &str,
        base_url: Option<&str>,
    ) -> Result<providers::openai::Client, ProviderError> {
        let mut builder = providers::openai::Client::builder().api_key(api_key);
        if let Some(base_url) = base_url {
            builder = builder.base_url(base_url);
        }
        let client: providers::openai::Client = builder.build().map_err(|e| {
            ProviderError::ApiError(format!("failed to create OpenAI embedding client: {e}"))
        })?;
        Ok(client)
    }

    /// Require `base_url` for OpenAI-compatible providers.
    fn require_base_url(base_url: Option<&str>) -> Result<&str, ProviderError> {
        base_url.ok_or_else(|| {
            ProviderError::NotConfigured(
                "openai-compatible provider requires base_url to be set".to_string(),
            )
        })
    }

    fn chat_api_key(&self) -> Result<&str, ProviderError> {
        self.chat
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::NotConfigured("missing API key".to_string()))
    }

    fn embedding_api_key(&self) -> Result<&str, ProviderError> {
        self.embedding
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::NotConfigured("missing embedding API key".to_string()))
    }

    /// Make a completion call through rig-core and return the raw response text.
    async fn call_rig(&self, user_prompt: &str) -> Result<String, ProviderError> {
        let api_key = self.chat_api_key()?;
        let model = self.chat.model.as_str();
        let base_url = self.chat.base_url.as_deref();

        match self.chat.name {
            ProviderName::OpenAI => {
                let client = Self::build_openai_client(api_key, base_url)?;
                prompt_simple!(client, model, user_prompt, "OpenAI")
            }
            ProviderName::OpenAICompatible => {
                let client = Self::build_openai_client(api_key, Some(Self::require_base_url(base_url)?))?;
                prompt_simple!(client, model, user_prompt, "OpenAI-compatible")
            }
            ProviderName::Anthropic => {
                let client: providers::anthropic::Client = providers::anthropic::Client::builder()
                    .api_key(api_key)
                    .build()
                    .map_err(|e| {
                        ProviderError::ApiError(format!("failed to create Anthropic client: {e}"))
                    })?;
                prompt_simple!(client, model, user_prompt, "Anthropic")
            }
            ProviderName::Gemini => {
                let client = new_client!(providers::gemini::Client, api_key, "Gemini")?;
                prompt_simple!(client, model, user_prompt, "Gemini")
            }
            ProviderName::Groq => {
                let client = new_client!(providers::groq::Client, api_key, "Groq")?;
                prompt_simple!(client, model, user_prompt, "Groq")
            }
            ProviderName::DeepSeek => {
                let client = new_client!(providers::deepseek::Client, api_key, "DeepSeek")?;
                prompt_simple!(client, model, user_prompt, "DeepSeek")
            }
        }
    }

    /// Make an embedding call through rig-core.
    async fn call_rig_embed(&self, text: &str) -> Result<Vector, ProviderError> {
        let api_key = self.embedding_api_key()?;
        let model = self.embedding.model.as_str();
        let base_url = self.embedding.base_url.as_deref();

        match self.embedding.name {
            ProviderName::OpenAI => {
                let client = Self::build_openai_embedding_client(api_key, base_url)?;
                embed_simple!(client, model, text, "OpenAI")
            }
            ProviderName::OpenAICompatible => {
                let client = Self::build_openai_embedding_client(
                    api_key,
                    Some(Self::require_base_url(base_url)?),
                )?;
                embed_simple!(client, model, text, "OpenAI-compatible")
            }
            ProviderName::Gemini => {
                let client = new_client!(providers::gemini::Client, api_key, "Gemini")?;
                embed_simple!(client, model, text, "Gemini")
            }
            other => Err(ProviderError::NotConfigured(format!(
                "provider '{other}' does not offer embeddings"
            ))),
        }
    }
}

#[async_trait]
impl ChatProvider for RigProvider {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let response = self.call_rig(prompt).await?;
        non_empty_generation(response)
    }
}

#[async_trait]
impl EmbeddingProvider for RigProvider {
    async fn embed(&self, text: &str) -> Result<Vector, ProviderError> {
        let vector = self.call_rig_embed(text).await?;
        if vector.is_empty() {
            return Err(ProviderError::EmptyEmbedding);
        }
        Ok(vector)
    }
}

/// Reject blank model output.
fn non_empty_generation(response: String) -> Result<String, ProviderError> {
    if response.trim().is_empty() {
        Err(ProviderError::EmptyGeneration)
    } else {
        Ok(response)
    }
}

/// Check whether a provider error is transient and worth retrying.
///
/// Matches HTTP status codes commonly used for rate limiting and
/// temporary unavailability: 429 (Too Many Requests), 503 (Service
/// Unavailable), 529 (Overloaded), and connection/timeout errors.
///
/// An empty generation is never retried.
pub fn is_retryable(err: &ProviderError) -> bool {
    classify_error(err).is_some()
}

/// Classifies a provider error into a short, user-friendly message.
///
/// Returns `Some(message)` for transient/retryable errors, `None` otherwise.
pub fn classify_error(err: &ProviderError) -> Option<&'static str> {
    match err {
        ProviderError::ApiError(msg) => {
            let msg_lower = msg.to_lowercase();
            if msg_lower.contains("429")
                || msg_lower.contains("rate limit")
                || msg_lower.contains("too many requests")
            {
                Some("Rate limited by API")
            } else if msg_lower.contains("503")
                || msg_lower.contains("service unavailable")
                || msg_lower.contains("high demand")
            {
                Some("High model load")
            } else if msg_lower.contains("529") || msg_lower.contains("overloaded") {
                Some("API overloaded")
            } else if msg_lower.contains("502") {
                Some("API gateway error")
            } else if msg_lower.contains("timeout") || msg_lower.contains("timed out") {
                Some("Request timed out")
            } else if msg_lower.contains("connection") {
                Some("Connection error")
            } else if msg_lower.contains("temporarily") || msg_lower.contains("try again") {
                Some("Temporary API error")
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Exponential backoff schedule for transient generation errors.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            initial_backoff: INITIAL_BACKOFF,
            max_backoff: MAX_BACKOFF,
        }
    }
}

impl RetryPolicy {
    /// Never retry.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Backoff before retry number `attempt + 1`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let backoff = self
            .initial_backoff
            .saturating_mul(2u32.saturating_pow(attempt));
        backoff.min(self.max_backoff)
    }
}
