//! Configuration loading and validation for Sidecar.
//!
//! Loads configuration from a TOML file with environment variable
//! overrides. Every field has a serde default so a missing or partial file
//! still yields a working config. API keys are redacted in `Debug` output.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// The root configuration structure.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Fallback API key, used when a provider entry carries none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default LLM provider name.
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default temperature for completions.
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Default max tokens per response.
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// Response cache capacity (FIFO eviction past this bound).
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Rolling transcript history cap for streaming classification.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Provider-specific configurations, keyed by provider name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

/// Per-provider settings.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key for this provider (falls back to the root `api_key`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL override (proxies, self-hosted gateways, test servers).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Default model for this provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

fn default_provider() -> String {
    "openai".into()
}
fn default_temperature() -> f32 {
    0.3
}
fn default_max_tokens() -> u32 {
    4096
}
fn default_cache_capacity() -> usize {
    50
}
fn default_history_limit() -> usize {
    50
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            cache_capacity: default_cache_capacity(),
            history_limit: default_history_limit(),
            providers: HashMap::new(),
        }
    }
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("cache_capacity", &self.cache_capacity)
            .field("history_limit", &self.history_limit)
            .field("providers", &self.providers)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

impl AppConfig {
    /// Load from a TOML file, then apply environment overrides. A missing
    /// file yields defaults (still with env overrides applied).
    pub fn load(path: &Path) -> sidecar_core::Result<Self> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path).map_err(|e| {
                sidecar_core::Error::Config {
                    message: format!("failed to read {}: {e}", path.display()),
                }
            })?;
            toml::from_str(&raw).map_err(|e| sidecar_core::Error::Config {
                message: format!("invalid config {}: {e}", path.display()),
            })?
        } else {
            debug!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Environment variables beat file values.
    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("SIDECAR_API_KEY") {
            self.api_key = Some(key);
        }
        if let Ok(provider) = std::env::var("SIDECAR_PROVIDER") {
            self.default_provider = provider;
        }
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            self.providers
                .entry("openai".into())
                .or_default()
                .api_key
                .get_or_insert(key);
        }
        if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
            self.providers
                .entry("anthropic".into())
                .or_default()
                .api_key
                .get_or_insert(key);
        }
    }

    fn validate(&self) -> sidecar_core::Result<()> {
        if !(0.0..=2.0).contains(&self.default_temperature) {
            return Err(sidecar_core::Error::Config {
                message: format!(
                    "default_temperature must be in [0.0, 2.0], got {}",
                    self.default_temperature
                ),
            });
        }
        if self.cache_capacity == 0 {
            return Err(sidecar_core::Error::Config {
                message: "cache_capacity must be at least 1".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_sane() {
        let config = AppConfig::default();
        assert_eq!(config.default_provider, "openai");
        assert_eq!(config.cache_capacity, 50);
        assert_eq!(config.history_limit, 50);
        assert!((config.default_temperature - 0.3).abs() < f32::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            default_provider = "anthropic"

            [providers.anthropic]
            api_key = "sk-ant-test"
            default_model = "claude-sonnet-4-20250514"
            "#,
        )
        .unwrap();
        assert_eq!(config.default_provider, "anthropic");
        assert_eq!(config.cache_capacity, 50);
        assert_eq!(
            config.providers["anthropic"].api_key.as_deref(),
            Some("sk-ant-test")
        );
    }

    #[test]
    fn load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.default_provider, "openai");
    }

    #[test]
    fn load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "cache_capacity = 0").unwrap();

        let err = AppConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("cache_capacity"));
    }

    #[test]
    fn debug_redacts_keys() {
        let config = AppConfig {
            api_key: Some("sk-super-secret".into()),
            ..Default::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
