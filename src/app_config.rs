use anyhow::{anyhow, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::{Path, PathBuf};
use url::Url;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO)
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language code (ISO)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Root of the documentation tree to mirror; `~` expands to the home directory
    #[serde(default = "default_source_dir")]
    pub source_dir: String,

    /// Root of the mirrored tree; deleted and rebuilt on every run
    #[serde(default = "default_destination_dir")]
    pub destination_dir: String,

    /// Worker pool size for each phase
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    /// Public Google Translate web endpoint
    #[default]
    Google,
    /// Local Ollama server
    Ollama,
}

impl TranslationProvider {
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Google => "google".to_string(),
            Self::Ollama => "ollama".to_string(),
        }
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

/// Per-backend settings, one entry per supported provider
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    #[serde(rename = "type")]
    pub provider_type: String,

    /// Model name; unused by Google
    #[serde(default = "String::new")]
    pub model: String,

    /// Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    #[serde(default = "default_max_chars_per_request")]
    pub max_chars_per_request: usize,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Rate limit (requests per minute)
    #[serde(default)]
    pub rate_limit: Option<u32>,
}

impl ProviderConfig {
    pub fn new(provider_type: TranslationProvider) -> Self {
        match provider_type {
            TranslationProvider::Google => Self {
                provider_type: "google".to_string(),
                model: String::new(),
                endpoint: default_google_endpoint(),
                max_chars_per_request: default_max_chars_per_request(),
                timeout_secs: default_timeout_secs(),
                rate_limit: default_google_rate_limit(),
            },
            TranslationProvider::Ollama => Self {
                provider_type: "ollama".to_string(),
                model: default_ollama_model(),
                endpoint: default_ollama_endpoint(),
                max_chars_per_request: default_max_chars_per_request(),
                timeout_secs: default_ollama_timeout_secs(),
                rate_limit: None,
            },
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Available translation providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Settings shared by the LLM-backed providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// System prompt template for translation
    /// Placeholders: {source_language}, {target_language}
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            temperature: default_temperature(),
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

fn default_source_language() -> String {
    "en".to_string()
}

fn default_target_language() -> String {
    "ru".to_string()
}

fn default_source_dir() -> String {
    "~/public_html/blfs-book".to_string()
}

fn default_destination_dir() -> String {
    "~/public_html/blfs-ru".to_string()
}

fn default_workers() -> usize {
    5
}

fn default_max_chars_per_request() -> usize {
    5000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_ollama_timeout_secs() -> u64 {
    120
}

fn default_temperature() -> f32 {
    0.1
}

fn default_google_endpoint() -> String {
    "https://translate.googleapis.com".to_string()
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2".to_string()
}

fn default_google_rate_limit() -> Option<u32> {
    Some(120)
}

fn default_system_prompt() -> String {
    "You are a professional translator of technical documentation. Translate the following text from {source_language} to {target_language}. Tokens of the form __NAME0__ are placeholders: copy them verbatim and do not translate, reorder the characters of, or remove them. Respond with the translation only.".to_string()
}

/// Expand a leading `~` to the user's home directory
pub fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Normalize `.` and `..` components without touching the filesystem
fn lexical_normalize(path: &Path) -> PathBuf {
    use std::path::Component;

    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Absolute, lexically normalized form of `path`, canonical when it exists
fn comparable_path(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    lexical_normalize(&absolute)
}

/// Reject roots where deleting the destination would also delete the source.
///
/// Fails when the two paths are equal or when either one lies inside the other.
pub fn ensure_disjoint_roots(source: &Path, destination: &Path) -> Result<()> {
    let source = comparable_path(source);
    let destination = comparable_path(destination);
    if source == destination {
        return Err(anyhow!(
            "Source and destination directories must differ: {}",
            source.display()
        ));
    }
    if destination.starts_with(&source) {
        return Err(anyhow!(
            "Destination {} lies inside the source tree {}",
            destination.display(),
            source.display()
        ));
    }
    if source.starts_with(&destination) {
        return Err(anyhow!(
            "Source {} lies inside the destination {}, which is deleted before every run",
            source.display(),
            destination.display()
        ));
    }
    Ok(())
}

impl Config {
    /// Source root with `~` expanded
    pub fn source_path(&self) -> PathBuf {
        expand_tilde(&self.source_dir)
    }

    /// Destination root with `~` expanded
    pub fn destination_path(&self) -> PathBuf {
        expand_tilde(&self.destination_dir)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let _source_name = crate::language_utils::get_language_name(&self.source_language)?;
        let _target_name = crate::language_utils::get_language_name(&self.target_language)?;

        if crate::language_utils::language_codes_match(
            &self.source_language,
            &self.target_language,
        ) {
            warn!(
                "Source and target language are both '{}'; pages keep their language",
                self.target_language
            );
        }

        if self.workers == 0 {
            return Err(anyhow!("workers must be at least 1"));
        }

        let endpoint = self.translation.get_endpoint();
        Url::parse(&endpoint).map_err(|e| {
            anyhow!(
                "Invalid endpoint '{}' for provider {}: {}",
                endpoint,
                self.translation.provider,
                e
            )
        })?;

        ensure_disjoint_roots(&self.source_path(), &self.destination_path())?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_language: default_target_language(),
            source_dir: default_source_dir(),
            destination_dir: default_destination_dir(),
            workers: default_workers(),
            translation: TranslationConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        self.get_provider_config(&self.provider)
    }

    pub fn get_provider_config(
        &self,
        provider_type: &TranslationProvider,
    ) -> Option<&ProviderConfig> {
        let provider_str = provider_type.to_lowercase_string();
        self.available_providers
            .iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }

        match self.provider {
            TranslationProvider::Google => String::new(),
            TranslationProvider::Ollama => default_ollama_model(),
        }
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        match self.provider {
            TranslationProvider::Google => default_google_endpoint(),
            TranslationProvider::Ollama => default_ollama_endpoint(),
        }
    }

    pub fn get_max_chars_per_request(&self) -> usize {
        if let Some(provider_config) = self.get_active_provider_config() {
            if provider_config.max_chars_per_request > 0 {
                return provider_config.max_chars_per_request;
            }
        }

        default_max_chars_per_request()
    }

    pub fn get_timeout_secs(&self) -> u64 {
        if let Some(provider_config) = self.get_active_provider_config() {
            if provider_config.timeout_secs > 0 {
                return provider_config.timeout_secs;
            }
        }

        match self.provider {
            TranslationProvider::Google => default_timeout_secs(),
            TranslationProvider::Ollama => default_ollama_timeout_secs(),
        }
    }

    /// Get the rate limit for the active provider
    pub fn get_rate_limit(&self) -> Option<u32> {
        if let Some(provider_config) = self.get_active_provider_config() {
            return provider_config.rate_limit;
        }

        match self.provider {
            TranslationProvider::Google => default_google_rate_limit(),
            TranslationProvider::Ollama => None,
        }
    }

    /// Override the model of the active provider, adding an entry if none exists
    pub fn set_model(&mut self, model: &str) {
        let provider_str = self.provider.to_lowercase_string();
        match self
            .available_providers
            .iter_mut()
            .find(|p| p.provider_type == provider_str)
        {
            Some(provider_config) => provider_config.model = model.to_string(),
            None => {
                let mut provider_config = ProviderConfig::new(self.provider.clone());
                provider_config.model = model.to_string();
                self.available_providers.push(provider_config);
            }
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            available_providers: vec![
                ProviderConfig::new(TranslationProvider::Google),
                ProviderConfig::new(TranslationProvider::Ollama),
            ],
            common: TranslationCommonConfig::default(),
        }
    }
}
