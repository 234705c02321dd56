// =============================================================================
// Runtime Configuration — service settings with atomic save
// =============================================================================
//
// Every tunable the service exposes lives here: the minimum history gate,
// completion model settings, quote-feed and share-link templates.  Settings
// can be changed at runtime through the API and are written back on shutdown.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash.  All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
//
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::advisor::CompletionSettings;
use crate::types::PromptLanguage;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

fn default_min_rows() -> usize {
    90
}

fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_llm_temperature() -> f64 {
    0.5
}

fn default_llm_timeout_secs() -> u64 {
    60
}

fn default_quote_feed_url() -> String {
    "https://stooq.com/q/d/l/?s={symbol}&i=d".to_string()
}

fn default_quote_feed_timeout_secs() -> u64 {
    10
}

fn default_share_intent_url() -> String {
    "https://twitter.com/intent/tweet".to_string()
}

fn default_share_hashtags() -> String {
    "#テクニカル分析 #CFD #LazyTech".to_string()
}

// =============================================================================
// LlmParams
// =============================================================================

/// Completion endpoint and sampling parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmParams {
    /// API root; `/chat/completions` is appended.
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default = "default_llm_temperature")]
    pub temperature: f64,

    /// Optional cap on generated tokens.
    #[serde(default)]
    pub max_tokens: Option<u32>,

    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmParams {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            temperature: default_llm_temperature(),
            max_tokens: None,
            timeout_secs: default_llm_timeout_secs(),
        }
    }
}

impl LlmParams {
    pub fn completion_settings(&self) -> CompletionSettings {
        CompletionSettings {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

// =============================================================================
// RuntimeConfig
// =============================================================================

/// Top-level runtime configuration.
///
/// Every field has a serde default so that older JSON files missing new fields
/// will still deserialise correctly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Address the HTTP API listens on.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Minimum number of daily rows an analysis request must supply.
    #[serde(default = "default_min_rows")]
    pub min_rows: usize,

    /// Language of indicator summaries and prompts.
    #[serde(default)]
    pub language: PromptLanguage,

    #[serde(default)]
    pub llm: LlmParams,

    /// Daily CSV URL; `{symbol}` is replaced with the requested symbol.
    #[serde(default = "default_quote_feed_url")]
    pub quote_feed_url: String,

    #[serde(default = "default_quote_feed_timeout_secs")]
    pub quote_feed_timeout_secs: u64,

    #[serde(default = "default_share_intent_url")]
    pub share_intent_url: String,

    #[serde(default = "default_share_hashtags")]
    pub share_hashtags: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            min_rows: default_min_rows(),
            language: PromptLanguage::default(),
            llm: LlmParams::default(),
            quote_feed_url: default_quote_feed_url(),
            quote_feed_timeout_secs: default_quote_feed_timeout_secs(),
            share_intent_url: default_share_intent_url(),
            share_hashtags: default_share_hashtags(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        info!(
            path = %path.display(),
            min_rows = config.min_rows,
            model = %config.llm.model,
            language = %config.language,
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise runtime config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "runtime config saved (atomic)");
        Ok(())
    }

    /// Apply environment overrides (`ADVISOR_BIND_ADDR`, `ADVISOR_LLM_ENDPOINT`,
    /// `ADVISOR_LLM_MODEL`).
    pub fn apply_env_overrides(&mut self) {
        if let Ok(addr) = std::env::var("ADVISOR_BIND_ADDR") {
            if !addr.trim().is_empty() {
                self.bind_addr = addr.trim().to_string();
            }
        }
        if let Ok(url) = std::env::var("ADVISOR_LLM_ENDPOINT") {
            if !url.trim().is_empty() {
                self.llm.base_url = url.trim().to_string();
            }
        }
        if let Ok(model) = std::env::var("ADVISOR_LLM_MODEL") {
            if !model.trim().is_empty() {
                self.llm.model = model.trim().to_string();
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = RuntimeConfig::default();
        assert_eq!(cfg.min_rows, 90);
        assert_eq!(cfg.language, PromptLanguage::Japanese);
        assert_eq!(cfg.llm.model, "gpt-4o-mini");
        assert!((cfg.llm.temperature - 0.5).abs() < f64::EPSILON);
        assert!(cfg.quote_feed_url.contains("{symbol}"));
        assert!(cfg.share_hashtags.contains("#LazyTech"));
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: RuntimeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, RuntimeConfig::default());
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{ "min_rows": 120, "language": "english", "llm": { "model": "gpt-4o" } }"#;
        let cfg: RuntimeConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.min_rows, 120);
        assert_eq!(cfg.language, PromptLanguage::English);
        assert_eq!(cfg.llm.model, "gpt-4o");
        assert!((cfg.llm.temperature - 0.5).abs() < f64::EPSILON);
        assert_eq!(cfg.bind_addr, "0.0.0.0:3001");
    }

    #[test]
    fn completion_settings_mirror_llm_params() {
        let cfg = RuntimeConfig::default();
        let s = cfg.llm.completion_settings();
        assert_eq!(s.model, cfg.llm.model);
        assert_eq!(s.max_tokens, None);
    }

    #[test]
    fn save_then_load() {
        let dir = std::env::temp_dir().join(format!("advisor-config-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("advisor_config.json");

        let mut cfg = RuntimeConfig::default();
        cfg.min_rows = 60;
        cfg.save(&path).unwrap();
        assert!(!path.with_extension("json.tmp").exists());

        let loaded = RuntimeConfig::load(&path).unwrap();
        assert_eq!(loaded, cfg);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn load_missing_file_is_an_error() {
        assert!(RuntimeConfig::load("/nonexistent/advisor_config.json").is_err());
    }
}
