//! Application configuration
//!
//! Loading, validating and saving the pipeline settings (languages, provider,
//! tree limits, output validator) from a JSON file.

use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::{Path, PathBuf};

use crate::language_utils;

/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language and supported site languages
    #[serde(default)]
    pub languages: LanguageConfig,

    /// Translation provider settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Tree translation settings
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Output validator settings
    #[serde(default)]
    pub validation: ValidationConfig,

    /// SQLite database path; the platform data directory is used when unset
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Supported site languages and the designated source language
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LanguageConfig {
    /// Language all content is authored in
    #[serde(default = "default_source_language")]
    pub source: String,

    /// Every language the site is published in, source included
    #[serde(default = "default_supported_languages")]
    pub supported: Vec<String>,
}

impl LanguageConfig {
    /// Create a language set from a source and a supported list
    pub fn new(source: impl Into<String>, supported: &[&str]) -> Self {
        Self {
            source: source.into(),
            supported: supported.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Supported languages minus the source language, in declared order
    pub fn target_languages(&self) -> Vec<String> {
        self.supported
            .iter()
            .filter(|code| !self.is_source(code))
            .cloned()
            .collect()
    }

    /// Whether a code names the source language
    pub fn is_source(&self, code: &str) -> bool {
        code == self.source || language_utils::language_codes_match(code, &self.source)
    }

    /// Whether a code is one of the supported languages
    pub fn is_supported(&self, code: &str) -> bool {
        self.canonical(code).is_some()
    }

    /// Configured spelling of a supported language, matching case and aliases
    ///
    /// Storage keys always use this spelling, so `EN` and `eng` resolve to `en`.
    pub fn canonical(&self, code: &str) -> Option<&str> {
        self.supported
            .iter()
            .find(|s| s.as_str() == code)
            .or_else(|| {
                self.supported
                    .iter()
                    .find(|s| language_utils::language_codes_match(s, code))
            })
            .map(String::as_str)
    }

    /// Check codes, duplicates and source membership; canonicalizes codes in place
    pub fn validate(&mut self) -> Result<()> {
        self.source = language_utils::validate_language_code(&self.source)
            .with_context(|| format!("Invalid source language '{}'", self.source))?;

        let mut canonical: Vec<String> = Vec::with_capacity(self.supported.len());
        for code in &self.supported {
            let normalized = language_utils::validate_language_code(code)
                .with_context(|| format!("Invalid supported language '{}'", code))?;
            if canonical.contains(&normalized) {
                return Err(anyhow!("Duplicate supported language: {}", normalized));
            }
            canonical.push(normalized);
        }
        self.supported = canonical;

        if !self.supported.contains(&self.source) {
            return Err(anyhow!(
                "Source language '{}' must be listed in supported languages",
                self.source
            ));
        }

        if self.target_languages().is_empty() {
            warn!("No target languages configured; translation runs will do nothing");
        }

        Ok(())
    }
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            source: default_source_language(),
            supported: default_supported_languages(),
        }
    }
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Google Cloud Translation v2
    #[default]
    Google,
    /// Anthropic Messages API
    Anthropic,
    /// Local Ollama server
    Ollama,
    /// Deterministic offline provider for dry runs
    Mock,
}

impl ProviderKind {
    /// Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Google => "Google Translate",
            Self::Anthropic => "Anthropic",
            Self::Ollama => "Ollama",
            Self::Mock => "Mock",
        }
    }

    /// Environment variable consulted when no API key is configured
    pub fn api_key_env_var(&self) -> Option<&'static str> {
        match self {
            Self::Google => Some("GOOGLE_TRANSLATE_API_KEY"),
            Self::Anthropic => Some("ANTHROPIC_API_KEY"),
            Self::Ollama | Self::Mock => None,
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Google => write!(f, "google"),
            Self::Anthropic => write!(f, "anthropic"),
            Self::Ollama => write!(f, "ollama"),
            Self::Mock => write!(f, "mock"),
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "anthropic" => Ok(Self::Anthropic),
            "ollama" => Ok(Self::Ollama),
            "mock" => Ok(Self::Mock),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    /// Provider type identifier
    #[serde(rename = "type", default)]
    pub kind: ProviderKind,

    /// Model name (LLM providers only)
    #[serde(default = "String::new")]
    pub model: String,

    /// API key; falls back to the provider's environment variable
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    /// Time budget for one provider call in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Pause between consecutive provider calls in milliseconds
    #[serde(default)]
    pub request_delay_ms: u64,

    /// Temperature for LLM providers
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl ProviderConfig {
    /// Provider config with defaults for the given type
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            model: String::new(),
            api_key: String::new(),
            endpoint: String::new(),
            timeout_secs: default_timeout_secs(),
            request_delay_ms: 0,
            temperature: default_temperature(),
        }
    }

    /// Get the model, falling back to the provider default
    pub fn get_model(&self) -> String {
        if !self.model.is_empty() {
            return self.model.clone();
        }

        match self.kind {
            ProviderKind::Google | ProviderKind::Mock => String::new(),
            ProviderKind::Anthropic => default_anthropic_model(),
            ProviderKind::Ollama => default_ollama_model(),
        }
    }

    /// Get the endpoint, falling back to the provider default
    pub fn get_endpoint(&self) -> String {
        if !self.endpoint.is_empty() {
            return self.endpoint.clone();
        }

        match self.kind {
            ProviderKind::Google => default_google_endpoint(),
            ProviderKind::Anthropic => default_anthropic_endpoint(),
            ProviderKind::Ollama => default_ollama_endpoint(),
            ProviderKind::Mock => String::new(),
        }
    }

    /// Get the API key from config or the environment
    pub fn get_api_key(&self) -> String {
        if !self.api_key.is_empty() {
            return self.api_key.clone();
        }

        self.kind
            .api_key_env_var()
            .and_then(|var| std::env::var(var).ok())
            .unwrap_or_default()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::new(ProviderKind::default())
    }
}

/// Tree translation settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Nesting depth beyond which subtrees are left untranslated
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

/// Output validator settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ValidationConfig {
    /// Whether translated leaves are checked at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Distinct source-language keywords needed to flag a leak
    #[serde(default = "default_keyword_threshold")]
    pub keyword_threshold: usize,

    /// Source-language function words; built-in list for the source language when empty
    #[serde(default)]
    pub source_keywords: Vec<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            keyword_threshold: default_keyword_threshold(),
            source_keywords: Vec::new(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching `log` level filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_source_language() -> String {
    "id".to_string()
}

fn default_supported_languages() -> Vec<String> {
    vec!["id".to_string(), "en".to_string()]
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_depth() -> usize {
    5
}

fn default_keyword_threshold() -> usize {
    2
}

fn default_true() -> bool {
    true
}

fn default_google_endpoint() -> String {
    "https://translation.googleapis.com/language/translate/v2".to_string()
}

fn default_anthropic_endpoint() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_anthropic_model() -> String {
    "claude-3-haiku-20240307".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2:3b".to_string()
}

impl Config {
    /// Parse a configuration from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse configuration JSON")
    }

    /// Load the configuration file, writing a default one if it does not exist
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            return Self::from_json_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path));
        }

        warn!("Config file not found at {:?}, creating default config.", path);
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config to JSON")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&mut self) -> Result<()> {
        self.languages.validate()?;

        if self.provider.timeout_secs == 0 {
            return Err(anyhow!("Provider timeout must be at least one second"));
        }

        if self.translation.max_depth == 0 {
            return Err(anyhow!("translation.max_depth must be greater than zero"));
        }

        if self.validation.keyword_threshold == 0 {
            return Err(anyhow!("validation.keyword_threshold must be greater than zero"));
        }

        match self.provider.kind {
            ProviderKind::Google | ProviderKind::Anthropic => {
                if self.provider.get_api_key().is_empty() {
                    return Err(anyhow!(
                        "API key is required for the {} provider (set provider.api_key or {})",
                        self.provider.kind.display_name(),
                        self.provider.kind.api_key_env_var().unwrap_or_default()
                    ));
                }
            }
            ProviderKind::Ollama => {
                url::Url::parse(&self.provider.get_endpoint())
                    .with_context(|| format!("Invalid Ollama endpoint: {}", self.provider.get_endpoint()))?;
            }
            ProviderKind::Mock => {}
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            languages: LanguageConfig::default(),
            provider: ProviderConfig::default(),
            translation: TranslationConfig::default(),
            validation: ValidationConfig::default(),
            database_path: None,
            log_level: LogLevel::default(),
        }
    }
}
