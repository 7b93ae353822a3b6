/// Chat completion client for OpenAI-compatible inference endpoints.
///
/// This module provides `ChatClient` for making synchronous HTTP requests to a
/// `/chat/completions` endpoint, the `CompletionProvider` trait that the
/// discovery pipeline depends on, and the retry policy shared by both modes.
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{Provider, ProviderConfig};

/// Placeholder key sent to providers that do not check credentials.
const LOCAL_API_KEY: &str = "ollama";

/// Delays between retry attempts (exponential backoff).
const BACKOFF_DELAYS: [Duration; 3] = [
    Duration::from_secs(1),
    Duration::from_secs(2),
    Duration::from_secs(4),
];

/// Errors that can occur when calling the inference service.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Network-related errors (connection failures, DNS resolution, etc.)
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Request or response timeout errors
    #[error("Request timed out")]
    Timeout(#[source] reqwest::Error),

    /// HTTP errors with status code
    #[error("HTTP error: status {status}")]
    Http { status: u16 },

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Provider-level errors (missing content, refusals, malformed payloads)
    #[error("Inference API error: {message}")]
    Api { message: String },

    /// Invalid URL configuration error
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The provider requires an API key and none was configured
    #[error("Missing API key for provider {provider}")]
    MissingApiKey { provider: Provider },
}

/// Injected completion capability used by the interpreter and synthesizer.
///
/// The two operations correspond to the two ways the pipeline uses the
/// service: deterministic structured extraction and generative prose. Test
/// suites substitute a scripted implementation for the network client.
pub trait CompletionProvider: Send + Sync {
    /// Requests a single JSON object at temperature 0.
    ///
    /// Returns the raw response text; callers are responsible for parsing.
    fn complete_structured(&self, system: &str, user: &str) -> Result<String, LlmError>;

    /// Requests free text at the provider's configured synthesis temperature.
    fn complete_text(&self, system: &str, user: &str) -> Result<String, LlmError>;
}

/// Builder for constructing `ChatClient` instances.
///
/// # Examples
///
/// ```
/// use civic_discovery::{ChatClientBuilder, Provider};
///
/// let client = ChatClientBuilder::new(Provider::Ollama)
///     .base_url("http://localhost:11434/v1")
///     .model("llama3")
///     .build()
///     .expect("Failed to create client");
///
/// assert_eq!(client.model(), "llama3");
/// ```
#[derive(Debug)]
pub struct ChatClientBuilder {
    config: ProviderConfig,
    retry_delays: Vec<Duration>,
}

impl ChatClientBuilder {
    /// Creates a builder with the provider's default endpoint and model.
    pub fn new(provider: Provider) -> Self {
        Self::from_config(ProviderConfig::new(provider))
    }

    /// Creates a builder from a complete configuration value.
    pub fn from_config(config: ProviderConfig) -> Self {
        Self {
            config,
            retry_delays: BACKOFF_DELAYS.to_vec(),
        }
    }

    /// Sets the base URL of the OpenAI-compatible API (e.g., "https://api.openai.com/v1").
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Sets the model identifier.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Sets the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    /// Sets the synthesis temperature.
    pub fn synthesis_temperature(mut self, temperature: f32) -> Self {
        self.config.synthesis_temperature = temperature;
        self
    }

    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Sets the delays slept before each retry of a transient failure.
    ///
    /// Defaults to 1s, 2s, 4s. An empty slice disables retries.
    pub fn retry_delays(mut self, delays: &[Duration]) -> Self {
        self.retry_delays = delays.to_vec();
        self
    }

    /// Builds the `ChatClient`.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::InvalidUrl` if the base URL does not parse, and
    /// `LlmError::MissingApiKey` if the provider needs a key and none is set.
    pub fn build(self) -> Result<ChatClient, LlmError> {
        let ChatClientBuilder {
            config,
            retry_delays,
        } = self;
        let base_url = config.base_url.trim_end_matches('/').to_string();

        reqwest::Url::parse(&base_url)
            .map_err(|e| LlmError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let api_key = match (&config.api_key, config.provider.api_key_env()) {
            (Some(key), _) => key.clone(),
            (None, None) => LOCAL_API_KEY.to_string(),
            (None, Some(_)) => {
                return Err(LlmError::MissingApiKey {
                    provider: config.provider,
                });
            }
        };

        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(LlmError::Network)?;

        Ok(ChatClient {
            client,
            base_url,
            model: config.model,
            api_key,
            synthesis_temperature: config.synthesis_temperature,
            retry_delays,
        })
    }
}

/// Synchronous client for an OpenAI-compatible chat completions endpoint.
///
/// Each call is a blocking round trip, retried with exponential backoff on
/// transient failures. Construct it with `ChatClientBuilder`.
pub struct ChatClient {
    client: reqwest::blocking::Client,
    base_url: String,
    model: String,
    api_key: String,
    synthesis_temperature: f32,
    retry_delays: Vec<Duration>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl ChatClient {
    /// Returns the base URL configured for this client.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the model name configured for this client.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the temperature used for generative completions.
    pub fn synthesis_temperature(&self) -> f32 {
        self.synthesis_temperature
    }

    /// Deterministic JSON-mode request: temperature 0 and a forced JSON object.
    fn structured_request<'a>(&'a self, system: &'a str, user: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: conversation(system, user),
            temperature: 0.0,
            response_format: Some(ResponseFormat {
                kind: "json_object",
            }),
        }
    }

    /// Generative request at the configured synthesis temperature.
    fn text_request<'a>(&'a self, system: &'a str, user: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: conversation(system, user),
            temperature: self.synthesis_temperature,
            response_format: None,
        }
    }

    fn chat(&self, request: &ChatRequest<'_>) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);

        retry_with_delays(&self.retry_delays, || {
            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(request)
                .send()
                .map_err(transport_error)?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().unwrap_or_default();
                tracing::debug!(
                    status = status.as_u16(),
                    body = %body,
                    "completion request rejected"
                );
                return Err(LlmError::Http {
                    status: status.as_u16(),
                });
            }

            let text = response.text().map_err(transport_error)?;
            parse_chat_response(&text)
        })
    }
}

impl CompletionProvider for ChatClient {
    fn complete_structured(&self, system: &str, user: &str) -> Result<String, LlmError> {
        self.chat(&self.structured_request(system, user))
    }

    fn complete_text(&self, system: &str, user: &str) -> Result<String, LlmError> {
        self.chat(&self.text_request(system, user))
    }
}

fn conversation<'a>(system: &'a str, user: &'a str) -> Vec<ChatMessage<'a>> {
    vec![
        ChatMessage {
            role: "system",
            content: system,
        },
        ChatMessage {
            role: "user",
            content: user,
        },
    ]
}

/// Extracts the first choice's message content from a response body.
fn parse_chat_response(body: &str) -> Result<String, LlmError> {
    let parsed: ChatResponse = serde_json::from_str(body).map_err(LlmError::Serialization)?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| LlmError::Api {
            message: "Missing message content in completion response".to_string(),
        })
}

fn transport_error(error: reqwest::Error) -> LlmError {
    if error.is_timeout() {
        LlmError::Timeout(error)
    } else {
        LlmError::Network(error)
    }
}

/// Retries an operation once per entry in `delays`, sleeping before each retry.
///
/// Only transient errors (network failures, timeouts, HTTP 5xx) are retried.
/// Client errors (HTTP 4xx) and malformed responses fail immediately.
/// Returns the first success, the first non-retryable error, or the last
/// error once every delay has been used.
pub fn retry_with_delays<F, T>(delays: &[Duration], mut f: F) -> Result<T, LlmError>
where
    F: FnMut() -> Result<T, LlmError>,
{
    let mut last_error = match f() {
        Ok(result) => return Ok(result),
        Err(e) if !should_retry(&e) => return Err(e),
        Err(e) => e,
    };

    for delay in delays {
        tracing::debug!(
            error = %last_error,
            delay_ms = delay.as_millis() as u64,
            "retrying completion request"
        );
        thread::sleep(*delay);

        match f() {
            Ok(result) => return Ok(result),
            Err(e) if !should_retry(&e) => return Err(e),
            Err(e) => last_error = e,
        }
    }

    Err(last_error)
}

/// Returns `true` for transient errors (HTTP 5xx, network errors, timeouts).
fn should_retry(error: &LlmError) -> bool {
    match error {
        LlmError::Network(_) | LlmError::Timeout(_) => true,
        LlmError::Http { status } => (500..600).contains(status),
        LlmError::Serialization(_)
        | LlmError::Api { .. }
        | LlmError::InvalidUrl(_)
        | LlmError::MissingApiKey { .. } => false,
    }
}
