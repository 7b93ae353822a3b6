//! Inference provider configuration.
//!
//! A `ProviderConfig` is built once (usually from the environment) and passed
//! explicitly to the client and engine constructors.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default sampling temperature for synthesized answers.
pub const DEFAULT_SYNTHESIS_TEMPERATURE: f32 = 0.3;

/// Default request timeout for completion calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Supported inference providers.
///
/// All of them are addressed through an OpenAI-compatible chat completions
/// endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Ollama,
    OpenAi,
    Gemini,
}

impl Provider {
    /// Parses a provider name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Some(Self::Ollama),
            "openai" | "open_ai" => Some(Self::OpenAi),
            "gemini" => Some(Self::Gemini),
            _ => None,
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::Ollama => "http://localhost:11434/v1",
            Self::OpenAi => "https://api.openai.com/v1",
            Self::Gemini => "https://generativelanguage.googleapis.com/v1beta/openai",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Self::Ollama => "llama3",
            Self::OpenAi => "gpt-4o-mini",
            Self::Gemini => "gemini-2.5-flash",
        }
    }

    /// Environment variable holding the API key, if the provider needs one.
    pub fn api_key_env(self) -> Option<&'static str> {
        match self {
            Self::Ollama => None,
            Self::OpenAi => Some("OPENAI_API_KEY"),
            Self::Gemini => Some("GEMINI_API_KEY"),
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ollama => write!(f, "ollama"),
            Self::OpenAi => write!(f, "openai"),
            Self::Gemini => write!(f, "gemini"),
        }
    }
}

/// Everything needed to talk to an inference provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub provider: Provider,
    pub model: String,
    pub base_url: String,
    pub api_key: Option<String>,
    /// Temperature for generative synthesis. Extraction always runs at 0.
    pub synthesis_temperature: f32,
    pub timeout: Duration,
}

impl ProviderConfig {
    /// Creates a configuration using the provider's default URL and model.
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            model: provider.default_model().to_string(),
            base_url: provider.default_base_url().to_string(),
            api_key: None,
            synthesis_temperature: DEFAULT_SYNTHESIS_TEMPERATURE,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Reads configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `CIVIC_PROVIDER`: `ollama`, `openai` or `gemini` (default `gemini`)
    /// - `CIVIC_MODEL`: overrides the provider's default model
    /// - `CIVIC_BASE_URL`: overrides the provider's default endpoint
    /// - `CIVIC_SYNTHESIS_TEMPERATURE`: overrides the synthesis temperature
    /// - `OPENAI_API_KEY` / `GEMINI_API_KEY`: provider credentials
    ///
    /// Unparseable provider names fall back to the default provider with a
    /// warning rather than failing.
    pub fn from_env() -> Self {
        let provider = match std::env::var("CIVIC_PROVIDER") {
            Ok(name) => Provider::parse(&name).unwrap_or_else(|| {
                tracing::warn!(provider = %name, "unknown CIVIC_PROVIDER, using gemini");
                Provider::Gemini
            }),
            Err(_) => Provider::Gemini,
        };

        let mut config = Self::new(provider);

        if let Ok(model) = std::env::var("CIVIC_MODEL")
            && !model.trim().is_empty()
        {
            config.model = model.trim().to_string();
        }

        if let Ok(url) = std::env::var("CIVIC_BASE_URL")
            && !url.trim().is_empty()
        {
            config.base_url = url.trim().to_string();
        }

        if let Ok(raw) = std::env::var("CIVIC_SYNTHESIS_TEMPERATURE") {
            match raw.trim().parse::<f32>() {
                Ok(value) if (0.0..=2.0).contains(&value) => config.synthesis_temperature = value,
                _ => tracing::warn!(value = %raw, "ignoring invalid CIVIC_SYNTHESIS_TEMPERATURE"),
            }
        }

        config.api_key = provider
            .api_key_env()
            .and_then(|var| std::env::var(var).ok())
            .filter(|key| !key.trim().is_empty());

        config
    }

    /// Sets the model name.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 6] = [
        "CIVIC_PROVIDER",
        "CIVIC_MODEL",
        "CIVIC_BASE_URL",
        "CIVIC_SYNTHESIS_TEMPERATURE",
        "OPENAI_API_KEY",
        "GEMINI_API_KEY",
    ];

    fn clear_env() {
        for var in VARS {
            unsafe {
                std::env::remove_var(var);
            }
        }
    }

    #[test]
    fn provider_parse() {
        assert_eq!(Provider::parse("OLLAMA"), Some(Provider::Ollama));
        assert_eq!(Provider::parse("openai"), Some(Provider::OpenAi));
        assert_eq!(Provider::parse(" Gemini "), Some(Provider::Gemini));
        assert_eq!(Provider::parse("anthropic"), None);
    }

    #[test]
    fn new_uses_provider_defaults() {
        let config = ProviderConfig::new(Provider::Ollama);
        assert_eq!(config.base_url, "http://localhost:11434/v1");
        assert_eq!(config.model, "llama3");
        assert_eq!(config.synthesis_temperature, DEFAULT_SYNTHESIS_TEMPERATURE);
        assert!(config.api_key.is_none());
    }

    #[test]
    #[serial]
    fn from_env_defaults_to_gemini() {
        clear_env();

        let config = ProviderConfig::from_env();
        assert_eq!(config.provider, Provider::Gemini);
        assert_eq!(config.model, "gemini-2.5-flash");
        assert!(config.api_key.is_none());
    }

    #[test]
    #[serial]
    fn from_env_reads_overrides_and_key() {
        clear_env();
        unsafe {
            std::env::set_var("CIVIC_PROVIDER", "openai");
            std::env::set_var("CIVIC_MODEL", "gpt-4o");
            std::env::set_var("CIVIC_SYNTHESIS_TEMPERATURE", "0.7");
            std::env::set_var("OPENAI_API_KEY", "sk-test");
        }

        let config = ProviderConfig::from_env();
        assert_eq!(config.provider, Provider::OpenAi);
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.synthesis_temperature, 0.7);
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));

        clear_env();
    }

    #[test]
    #[serial]
    fn from_env_ignores_invalid_values() {
        clear_env();
        unsafe {
            std::env::set_var("CIVIC_PROVIDER", "mystery");
            std::env::set_var("CIVIC_SYNTHESIS_TEMPERATURE", "warm");
        }

        let config = ProviderConfig::from_env();
        assert_eq!(config.provider, Provider::Gemini);
        assert_eq!(config.synthesis_temperature, DEFAULT_SYNTHESIS_TEMPERATURE);

        clear_env();
    }
}
