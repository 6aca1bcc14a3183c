//! Config struct and loading logic.
//!
//! Priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables
//! 3. `.revanchor.toml` in repo root
//! 4. `~/.config/revanchor/config.toml` (global defaults)
//! 5. Built-in defaults

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::constants::{
    DEFAULT_MAX_SEARCH_DISTANCE, DEFAULT_SIGNATURE_PREFIX_LEN, DEFAULT_SIMILARITY_THRESHOLD,
};
use crate::env::Env;

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
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub resolver: ResolverConfig,
    pub dedup: DedupConfig,
    pub embedding: EmbeddingConfig,
}

/// Line resolution configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// How far, in lines, correction may search from a rejected line
    /// number. Bounded by the enclosing hunk regardless.
    pub max_search_distance: u32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_search_distance: DEFAULT_MAX_SEARCH_DISTANCE,
        }
    }
}

/// Deduplication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    pub signature_prefix_len: usize,
    pub similarity_threshold: f32,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            signature_prefix_len: DEFAULT_SIGNATURE_PREFIX_LEN,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

/// Embedding service configuration.
///
/// Semantic dedup is enabled when a `base_url` is configured; without
/// one, dedup runs with the signature stage only.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub base_url: Option<String>,
    pub model: String,
    pub api_key: Option<String>,
}

impl std::fmt::Debug for EmbeddingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            model: "text-embedding-3-small".to_string(),
            api_key: None,
        }
    }
}

impl Config {
    /// Load configuration with proper layering.
    ///
    /// Reads from global config, repo-local config, then applies
    /// environment variable overrides.
    pub fn load(repo_root: Option<&Path>, env: &Env) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        // Layer 4: global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global = Self::load_file(&global_path)?;
                config.merge(global);
            }
        }

        // Layer 3: repo-local config
        if let Some(root) = repo_root {
            let local_path = root.join(crate::constants::CONFIG_FILENAME);
            if local_path.exists() {
                let local = Self::load_file(&local_path)?;
                config.merge(local);
            }
        }

        // Layer 2: environment variables
        config.apply_env_vars(env);

        Ok(config)
    }

    /// Load a config from a specific file.
    fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the global config file path.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(crate::constants::CONFIG_DIR).join("config.toml"))
    }

    /// Merge another config into this one (other takes precedence for
    /// non-default values).
    fn merge(&mut self, other: Config) {
        if other.resolver.max_search_distance != ResolverConfig::default().max_search_distance {
            self.resolver.max_search_distance = other.resolver.max_search_distance;
        }

        let default_dedup = DedupConfig::default();
        if other.dedup.signature_prefix_len != default_dedup.signature_prefix_len {
            self.dedup.signature_prefix_len = other.dedup.signature_prefix_len;
        }
        if other.dedup.similarity_threshold != default_dedup.similarity_threshold {
            self.dedup.similarity_threshold = other.dedup.similarity_threshold;
        }

        let default_embedding = EmbeddingConfig::default();
        if other.embedding.base_url.is_some() {
            self.embedding.base_url = other.embedding.base_url;
        }
        if other.embedding.model != default_embedding.model {
            self.embedding.model = other.embedding.model;
        }
        if other.embedding.api_key.is_some() {
            self.embedding.api_key = other.embedding.api_key;
        }
    }

    /// Apply environment variable overrides.
    fn apply_env_vars(&mut self, env: &Env) {
        if let Ok(val) = env.var(crate::constants::ENV_EMBEDDING_URL) {
            self.embedding.base_url = Some(val);
        }
        if let Ok(val) = env.var(crate::constants::ENV_EMBEDDING_MODEL) {
            self.embedding.model = val;
        }
        if let Ok(val) = env.var(crate::constants::ENV_EMBEDDING_API_KEY) {
            self.embedding.api_key = Some(val);
        }

        if let Ok(val) = env.var(crate::constants::ENV_SIMILARITY_THRESHOLD) {
            match val.parse::<f32>() {
                Ok(t) if (0.0..=1.0).contains(&t) => self.dedup.similarity_threshold = t,
                _ => eprintln!(
                    "Warning: ignoring invalid {} value: {val}",
                    crate::constants::ENV_SIMILARITY_THRESHOLD
                ),
            }
        }
        if let Ok(val) = env.var(crate::constants::ENV_MAX_SEARCH_DISTANCE) {
            match val.parse::<u32>() {
                Ok(d) => self.resolver.max_search_distance = d,
                Err(_) => eprintln!(
                    "Warning: ignoring invalid {} value: {val}",
                    crate::constants::ENV_MAX_SEARCH_DISTANCE
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.resolver.max_search_distance, 3);
        assert_eq!(config.dedup.signature_prefix_len, 100);
        assert_eq!(config.dedup.similarity_threshold, 0.90);
        assert!(config.embedding.base_url.is_none());
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[resolver]
max_search_distance = 5

[dedup]
similarity_threshold = 0.85

[embedding]
base_url = "http://localhost:11434/v1"
model = "nomic-embed-text"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.resolver.max_search_distance, 5);
        assert_eq!(config.dedup.similarity_threshold, 0.85);
        assert_eq!(
            config.embedding.base_url.as_deref(),
            Some("http://localhost:11434/v1")
        );
        assert_eq!(config.embedding.model, "nomic-embed-text");
    }

    #[test]
    fn merge_overrides_non_default_values() {
        let mut base = Config::default();
        let mut other = Config::default();
        other.resolver.max_search_distance = 7;
        other.dedup.signature_prefix_len = 50;
        other.embedding.base_url = Some("https://api.example.com/v1".to_string());
        other.embedding.api_key = Some("sk-test".to_string());

        base.merge(other);

        assert_eq!(base.resolver.max_search_distance, 7);
        assert_eq!(base.dedup.signature_prefix_len, 50);
        assert_eq!(
            base.embedding.base_url.as_deref(),
            Some("https://api.example.com/v1")
        );
        assert_eq!(base.embedding.api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn merge_keeps_base_when_other_is_default() {
        let mut base = Config::default();
        base.resolver.max_search_distance = 10;
        base.embedding.base_url = Some("http://localhost:8080".to_string());

        base.merge(Config::default());

        assert_eq!(base.resolver.max_search_distance, 10);
        assert!(base.embedding.base_url.is_some());
    }

    #[test]
    fn load_file_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "not valid {{ toml").unwrap();

        let result = Config::load_file(&path);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("parse"));
    }

    #[test]
    fn load_from_repo_root() {
        let env = Env::mock(Vec::<(&str, &str)>::new());

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".revanchor.toml"),
            r#"
[resolver]
max_search_distance = 2
"#,
        )
        .unwrap();

        let config = Config::load(Some(dir.path()), &env).unwrap();
        assert_eq!(config.resolver.max_search_distance, 2);
    }

    #[test]
    fn load_without_any_config_files() {
        let env = Env::mock(Vec::<(&str, &str)>::new());
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(dir.path()), &env).unwrap();
        assert_eq!(config.resolver.max_search_distance, 3);
    }

    #[test]
    fn apply_env_vars_embedding() {
        let env = Env::mock([
            ("REVANCHOR_EMBEDDING_URL", "http://localhost:11434/v1"),
            ("REVANCHOR_EMBEDDING_MODEL", "nomic-embed-text"),
            ("REVANCHOR_EMBEDDING_API_KEY", "sk-env-test"),
        ]);
        let mut config = Config::default();
        config.apply_env_vars(&env);
        assert_eq!(
            config.embedding.base_url.as_deref(),
            Some("http://localhost:11434/v1")
        );
        assert_eq!(config.embedding.model, "nomic-embed-text");
        assert_eq!(config.embedding.api_key.as_deref(), Some("sk-env-test"));
    }

    #[test]
    fn apply_env_vars_tuning() {
        let env = Env::mock([
            ("REVANCHOR_SIMILARITY_THRESHOLD", "0.8"),
            ("REVANCHOR_MAX_SEARCH_DISTANCE", "6"),
        ]);
        let mut config = Config::default();
        config.apply_env_vars(&env);
        assert_eq!(config.dedup.similarity_threshold, 0.8);
        assert_eq!(config.resolver.max_search_distance, 6);
    }

    #[test]
    fn apply_env_vars_invalid_values_fall_back() {
        let env = Env::mock([
            ("REVANCHOR_SIMILARITY_THRESHOLD", "2.5"),
            ("REVANCHOR_MAX_SEARCH_DISTANCE", "many"),
        ]);
        let mut config = Config::default();
        config.apply_env_vars(&env);
        assert_eq!(config.dedup.similarity_threshold, 0.90);
        assert_eq!(config.resolver.max_search_distance, 3);
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = EmbeddingConfig {
            api_key: Some("sk-secret".to_string()),
            ..EmbeddingConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("REDACTED"));
    }
}
