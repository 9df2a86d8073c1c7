//! Shared types used across all modules.
//!
//! This module defines the core data structures for style-guide passages,
//! pull request files, and per-file review outcomes. Other modules import
//! from here rather than reaching into each other's internals.

pub mod corpus;
pub mod pr;
pub mod review;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use corpus::{Chunk, ScoredChunk, Vector};
pub use pr::{ChangedFile, CommentRequest, PullRequestRef};
pub use review::{PublishOutcome, ReviewReport, ReviewResult, ReviewStage, Summary};

/// Supported LLM provider backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderName {
    #[default]
    #[serde(rename = "openai")]
    OpenAI,
    Anthropic,
    Gemini,
    Groq,
    #[serde(rename = "deepseek")]
    DeepSeek,
    /// Any OpenAI-compatible API (e.g. Ollama, Together, local servers).
    #[serde(rename = "openai-compatible")]
    OpenAICompatible,
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderName::OpenAI => write!(f, "openai"),
            ProviderName::Anthropic => write!(f, "anthropic"),
            ProviderName::Gemini => write!(f, "gemini"),
            ProviderName::Groq => write!(f, "groq"),
            ProviderName::DeepSeek => write!(f, "deepseek"),
            ProviderName::OpenAICompatible => write!(f, "openai-compatible"),
        }
    }
}

impl std::str::FromStr for ProviderName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(ProviderName::OpenAI),
            "anthropic" => Ok(ProviderName::Anthropic),
            "gemini" => Ok(ProviderName::Gemini),
            "groq" => Ok(ProviderName::Groq),
            "deepseek" => Ok(ProviderName::DeepSeek),
            "openai-compatible" => Ok(ProviderName::OpenAICompatible),
            other => Err(format!(
                "unsupported provider: '{other}'. Supported: openai, anthropic, gemini, \
                 groq, deepseek, openai-compatible"
            )),
        }
    }
}

impl ProviderName {
    /// Returns the provider-specific environment variable name for the API key.
    pub fn api_key_env_var(self) -> &'static str {
        match self {
            ProviderName::OpenAI | ProviderName::OpenAICompatible => "OPENAI_API_KEY",
            ProviderName::Anthropic => "ANTHROPIC_API_KEY",
            ProviderName::Gemini => "GEMINI_API_KEY",
            ProviderName::Groq => "GROQ_API_KEY",
            ProviderName::DeepSeek => "DEEPSEEK_API_KEY",
        }
    }

    /// Whether the provider exposes an embeddings endpoint we can use.
    pub fn supports_embeddings(self) -> bool {
        matches!(
            self,
            ProviderName::OpenAI | ProviderName::OpenAICompatible | ProviderName::Gemini
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_name_display_matches_from_str() {
        for name in [
            ProviderName::OpenAI,
            ProviderName::Anthropic,
            ProviderName::Gemini,
            ProviderName::Groq,
            ProviderName::DeepSeek,
            ProviderName::OpenAICompatible,
        ] {
            assert_eq!(name.to_string().parse::<ProviderName>().unwrap(), name);
        }
    }

    #[test]
    fn provider_name_from_str_case_insensitive() {
        assert_eq!("OpenAI".parse::<ProviderName>().unwrap(), ProviderName::OpenAI);
        assert_eq!("GEMINI".parse::<ProviderName>().unwrap(), ProviderName::Gemini);
    }

    #[test]
    fn provider_name_from_str_invalid() {
        let err = "cohere".parse::<ProviderName>().unwrap_err();
        assert!(err.contains("unsupported provider"));
        assert!(err.contains("cohere"));
    }

    #[test]
    fn provider_name_default_is_openai() {
        assert_eq!(ProviderName::default(), ProviderName::OpenAI);
    }

    #[test]
    fn only_some_providers_embed() {
        assert!(ProviderName::OpenAI.supports_embeddings());
        assert!(ProviderName::OpenAICompatible.supports_embeddings());
        assert!(!ProviderName::Anthropic.supports_embeddings());
        assert!(!ProviderName::Groq.supports_embeddings());
    }

    #[test]
    fn provider_name_serde_uses_kebab_names() {
        let json = serde_json::to_string(&ProviderName::OpenAICompatible).unwrap();
        assert_eq!(json, "\"openai-compatible\"");
        let back: ProviderName = serde_json::from_str("\"deepseek\"").unwrap();
        assert_eq!(back, ProviderName::DeepSeek);
    }
}
