//! Configuration file support for Fukushu.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/fukushu/config.toml`.
//! API credentials (`BUNPRO_TOKEN`, `GEMINI_API_KEY`) are read from the
//! environment and never stored here.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub lesson: LessonConfig,

    #[serde(default)]
    pub upstream: UpstreamConfig,

    #[serde(default)]
    pub gemini: GeminiConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Lesson defaults used when the CLI flags are omitted
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LessonConfig {
    #[serde(default = "default_user")]
    pub user: String,

    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default = "default_vocab_count")]
    pub vocab_count: usize,

    #[serde(default = "default_grammar_count")]
    pub grammar_count: usize,
}

impl Default for LessonConfig {
    fn default() -> Self {
        Self {
            user: default_user(),
            level: default_level(),
            vocab_count: default_vocab_count(),
            grammar_count: default_grammar_count(),
        }
    }
}

/// Upstream review API configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_upstream_base_url")]
    pub base_url: String,

    /// Bounds for the randomized pause between page requests
    #[serde(default = "default_page_delay_min_ms")]
    pub page_delay_min_ms: u64,

    #[serde(default = "default_page_delay_max_ms")]
    pub page_delay_max_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_upstream_base_url(),
            page_delay_min_ms: default_page_delay_min_ms(),
            page_delay_max_ms: default_page_delay_max_ms(),
        }
    }
}

/// Gemini lesson generation configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default = "default_gemini_model")]
    pub model: String,

    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: default_gemini_model(),
            base_url: default_gemini_base_url(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").expect("HOME environment variable not set");
        PathBuf::from(home).join(".local/share")
    });
    base.join("fukushu")
}

fn default_user() -> String {
    "local".into()
}

fn default_level() -> String {
    "N5".into()
}

fn default_vocab_count() -> usize {
    3
}

fn default_grammar_count() -> usize {
    2
}

fn default_upstream_base_url() -> String {
    "https://api.bunpro.jp/api/frontend".into()
}

fn default_page_delay_min_ms() -> u64 {
    500
}

fn default_page_delay_max_ms() -> u64 {
    1500
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".into()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join("fukushu").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.lesson.vocab_count, 3);
        assert_eq!(config.lesson.grammar_count, 2);
        assert_eq!(config.lesson.level, "N5");
        assert!(config.upstream.page_delay_min_ms <= config.upstream.page_delay_max_ms);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.lesson.vocab_count, parsed.lesson.vocab_count);
        assert_eq!(config.upstream.base_url, parsed.upstream.base_url);
        assert_eq!(config.gemini.model, parsed.gemini.model);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[lesson]
vocab_count = 5
level = "N3"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.lesson.vocab_count, 5);
        assert_eq!(config.lesson.level, "N3");
        assert_eq!(config.lesson.grammar_count, 2); // default
        assert_eq!(config.gemini.model, "gemini-2.0-flash"); // default
    }
}
