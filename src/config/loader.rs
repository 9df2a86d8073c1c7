//! Config struct and loading logic.
//!
//! Priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables
//! 3. `.guidecheck.toml` in the working directory
//! 4. `~/.config/guidecheck/config.toml` (global defaults)
//! 5. Built-in defaults

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use toml::{Table, Value};

use crate::constants;
use crate::env::Env;
use crate::models::ProviderName;

/// Errors during config loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid layered configuration: {source}")]
    Layered { source: toml::de::Error },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: ProviderConfig,
    pub embedding: EmbeddingConfig,
    pub github: GitHubConfig,
    pub guide: GuideConfig,
    pub review: ReviewConfig,
}

/// Chat (review generation) provider configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub name: ProviderName,
    pub model: String,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: ProviderName::OpenAI,
            model: "gpt-4o".to_string(),
            base_url: None,
            api_key: None,
        }
    }
}

/// Embedding provider configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub name: ProviderName,
    pub model: String,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    /// Maximum concurrent embedding requests while building the corpus.
    pub workers: usize,
}

impl std::fmt::Debug for EmbeddingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingConfig")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("workers", &self.workers)
            .finish()
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            name: ProviderName::OpenAI,
            model: "text-embedding-ada-002".to_string(),
            base_url: None,
            api_key: None,
            workers: constants::EMBED_WORKERS,
        }
    }
}

/// GitHub API configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    pub token: Option<String>,
    pub api_url: String,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("api_url", &self.api_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: constants::GITHUB_API_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

/// Style guide source and chunking configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuideConfig {
    /// Path to the HTML style guide.
    pub path: Option<PathBuf>,
    pub selectors: Vec<String>,
    pub min_chunk_chars: usize,
}

impl Default for GuideConfig {
    fn default() -> Self {
        Self {
            path: None,
            selectors: constants::DEFAULT_SELECTORS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            min_chunk_chars: constants::MIN_CHUNK_CHARS,
        }
    }
}

/// Review pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Base instruction placed at the top of every prompt.
    pub prompt: String,
    pub top_k: usize,
    pub max_concurrent_files: usize,
    pub comment_position: u32,
    /// Only files ending in one of these suffixes are reviewed. Empty means all files.
    pub extensions: Vec<String>,
    /// Send an explicitly ungrounded prompt instead of failing when no passages exist.
    pub allow_ungrounded: bool,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            prompt: constants::DEFAULT_PROMPT.to_string(),
            top_k: constants::TOP_K,
            max_concurrent_files: 4,
            comment_position: 1,
            extensions: Vec::new(),
            allow_ungrounded: false,
        }
    }
}

impl Config {
    /// Load configuration with proper layering.
    ///
    /// Reads from global config, the working-directory config, then applies
    /// environment variable overrides. File layers merge key by key, so a
    /// key the local file sets always wins, even when it restates a default.
    pub fn load(work_dir: Option<&Path>, env: &Env) -> Result<Self, ConfigError> {
        let mut layered = Table::new();

        // Layer 4: global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                merge_tables(&mut layered, Self::load_file(&global_path)?);
            }
        }

        // Layer 3: working-directory config
        if let Some(dir) = work_dir {
            let local_path = dir.join(constants::CONFIG_FILENAME);
            if local_path.exists() {
                merge_tables(&mut layered, Self::load_file(&local_path)?);
            }
        }

        let mut config: Config = layered
            .try_into()
            .map_err(|source| ConfigError::Layered { source })?;

        // Layer 2: environment variables
        config.apply_env_vars(env);

        Ok(config)
    }

    /// Read one config file as a raw table, checking that it is a valid config on its own.
    fn load_file(path: &Path) -> Result<Table, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        let parse_error = |source: toml::de::Error| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source,
        };
        let table: Table = toml::from_str(&content).map_err(parse_error)?;
        table.clone().try_into::<Config>().map_err(parse_error)?;
        Ok(table)
    }

    /// Get the global config file path.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(constants::CONFIG_DIR).join("config.toml"))
    }

    /// Apply environment variable overrides.
    fn apply_env_vars(&mut self, env: &Env) {
        if let Some(val) = env.var(constants::ENV_PROVIDER) {
            match val.parse::<ProviderName>() {
                Ok(name) => self.provider.name = name,
                Err(_) => tracing::warn!(
                    var = constants::ENV_PROVIDER,
                    value = %val,
                    "ignoring invalid provider override"
                ),
            }
        }
        if let Some(val) = env.var(constants::ENV_MODEL) {
            self.provider.model = val;
        }
        if let Some(val) = env.var(constants::ENV_BASE_URL) {
            self.provider.base_url = Some(val);
        }
        if let Some(val) = env.var(constants::ENV_EMBEDDING_MODEL) {
            self.embedding.model = val;
        }
        if let Some(val) = env.var(constants::ENV_PROMPT) {
            self.review.prompt = val;
        }

        // Provider-specific API key resolution
        if let Some(key) = env.first_of(&[
            constants::ENV_API_KEY,
            self.provider.name.api_key_env_var(),
        ]) {
            self.provider.api_key = Some(key);
        }
        if self.embedding.api_key.is_none() {
            self.embedding.api_key = env.var(self.embedding.name.api_key_env_var());
        }
        if self.embedding.api_key.is_none() && self.embedding.name == self.provider.name {
            self.embedding.api_key = self.provider.api_key.clone();
        }

        // GitHub
        if let Some(token) = env.first_of(&[constants::ENV_GITHUB_TOKEN, "GITHUB_TOKEN"]) {
            self.github.token = Some(token);
        }
        if let Some(val) = env.var(constants::ENV_GITHUB_API_URL) {
            self.github.api_url = val;
        }
    }
}

/// Overlay `other` onto `base`. Nested tables merge recursively; any other
/// value in `other` replaces the one in `base`.
fn merge_tables(base: &mut Table, other: Table) {
    for (key, value) in other {
        if let (Some(Value::Table(existing)), Value::Table(incoming)) = (base.get_mut(&key), &value) {
            merge_tables(existing, incoming.clone());
            continue;
        }
        base.insert(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn no_env() -> Env {
        Env::mock(Vec::<(&str, &str)>::new())
    }

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.provider.name, ProviderName::OpenAI);
        assert_eq!(config.provider.model, "gpt-4o");
        assert_eq!(config.embedding.model, "text-embedding-ada-002");
        assert_eq!(config.embedding.workers, 10);
        assert_eq!(config.review.top_k, 3);
        assert_eq!(config.guide.min_chunk_chars, 30);
        assert_eq!(config.guide.selectors, vec!["p", "li", "h2", "h3"]);
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert!(!config.review.allow_ungrounded);
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[provider]
name = "anthropic"
model = "claude-sonnet-4-20250514"

[embedding]
model = "text-embedding-3-small"
workers = 4

[guide]
path = "docs/style.html"
min_chunk_chars = 40

[review]
top_k = 5
extensions = [".go"]
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.provider.name, ProviderName::Anthropic);
        assert_eq!(config.embedding.model, "text-embedding-3-small");
        assert_eq!(config.embedding.workers, 4);
        assert_eq!(config.guide.path, Some(PathBuf::from("docs/style.html")));
        assert_eq!(config.guide.min_chunk_chars, 40);
        assert_eq!(config.review.top_k, 5);
        assert_eq!(config.review.extensions, vec![".go"]);
        // untouched sections keep defaults
        assert_eq!(config.review.comment_position, 1);
    }

    fn layered(global: &str, local: &str) -> Config {
        let mut table = Table::new();
        merge_tables(&mut table, toml::from_str(global).unwrap());
        merge_tables(&mut table, toml::from_str(local).unwrap());
        table.try_into().unwrap()
    }

    #[test]
    fn local_layer_overrides_global_values() {
        let config = layered(
            r#"
[provider]
name = "gemini"
api_key = "sk-global"

[review]
max_concurrent_files = 8
extensions = [".rs"]
"#,
            r#"
[provider]
model = "gemini-2.0-flash"

[review]
extensions = [".go"]
"#,
        );

        assert_eq!(config.provider.name, ProviderName::Gemini);
        assert_eq!(config.provider.model, "gemini-2.0-flash");
        assert_eq!(config.provider.api_key.as_deref(), Some("sk-global"));
        assert_eq!(config.review.max_concurrent_files, 8);
        assert_eq!(config.review.extensions, vec![".go"]);
    }

    #[test]
    fn local_layer_can_restore_defaults() {
        let config = layered(
            r#"
[embedding]
workers = 4

[review]
allow_ungrounded = true
"#,
            r#"
[embedding]
workers = 10

[review]
allow_ungrounded = false
"#,
        );

        assert_eq!(config.embedding.workers, 10);
        assert!(!config.review.allow_ungrounded);
    }

    #[test]
    fn empty_local_layer_keeps_global() {
        let config = layered("[review]\ntop_k = 5\n", "");
        assert_eq!(config.review.top_k, 5);
    }

    #[test]
    fn load_file_rejects_wrong_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("typed.toml");
        std::fs::write(&path, "[review]\ntop_k = \"three\"\n").unwrap();

        let err = Config::load_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseFile { .. }), "got: {err}");
    }

    #[test]
    fn load_file_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "not valid {{ toml").unwrap();

        let err = Config::load_file(&path).unwrap_err();
        assert!(err.to_string().contains("parse"));
    }

    #[test]
    fn load_file_not_found() {
        let err = Config::load_file(Path::new("/tmp/guidecheck_not_exist_config.toml")).unwrap_err();
        assert!(err.to_string().contains("read"));
    }

    #[test]
    fn load_from_work_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".guidecheck.toml"),
            r#"
[review]
prompt = "Check against Effective Go."
"#,
        )
        .unwrap();

        let config = Config::load(Some(dir.path()), &no_env()).unwrap();
        assert_eq!(config.review.prompt, "Check against Effective Go.");
    }

    #[test]
    fn apply_env_vars_provider_and_keys() {
        let env = Env::mock([
            ("GUIDECHECK_PROVIDER", "openai"),
            ("GUIDECHECK_API_KEY", "sk-env-test"),
            ("GITHUB_TOKEN", "ghp_test"),
        ]);
        let mut config = Config::default();
        config.apply_env_vars(&env);
        assert_eq!(config.provider.api_key.as_deref(), Some("sk-env-test"));
        // same backend for both sides, so the chat key is reused
        assert_eq!(config.embedding.api_key.as_deref(), Some("sk-env-test"));
        assert_eq!(config.github.token.as_deref(), Some("ghp_test"));
    }

    #[test]
    fn apply_env_vars_prefers_tool_specific_github_token() {
        let env = Env::mock([
            ("GUIDECHECK_GITHUB_TOKEN", "ghp_specific"),
            ("GITHUB_TOKEN", "ghp_generic"),
        ]);
        let mut config = Config::default();
        config.apply_env_vars(&env);
        assert_eq!(config.github.token.as_deref(), Some("ghp_specific"));
    }

    #[test]
    fn apply_env_vars_mixed_providers_keep_keys_separate() {
        let env = Env::mock([
            ("GUIDECHECK_PROVIDER", "anthropic"),
            ("ANTHROPIC_API_KEY", "sk-ant"),
            ("OPENAI_API_KEY", "sk-oai"),
        ]);
        let mut config = Config::default();
        config.apply_env_vars(&env);
        assert_eq!(config.provider.name, ProviderName::Anthropic);
        assert_eq!(config.provider.api_key.as_deref(), Some("sk-ant"));
        assert_eq!(config.embedding.api_key.as_deref(), Some("sk-oai"));
    }

    #[test]
    fn apply_env_vars_invalid_provider_falls_back() {
        let env = Env::mock([("GUIDECHECK_PROVIDER", "not-a-provider")]);
        let mut config = Config::default();
        config.apply_env_vars(&env);
        assert_eq!(config.provider.name, ProviderName::OpenAI);
    }

    #[test]
    fn debug_redacts_secrets() {
        let mut config = Config::default();
        config.provider.api_key = Some("sk-secret".into());
        config.github.token = Some("ghp_secret".into());
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(!debug.contains("ghp_secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
