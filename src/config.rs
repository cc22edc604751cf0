//! Configuration types for the trak-ai service

use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::time::Duration;
use url::Url;

/// Well-known local model identifier used when a request does not name one
pub const DEFAULT_MODEL: &str = "mistral:7b-instruct-q4_0";

/// Default Ollama endpoint on the local loopback
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Service configuration for the AI layer
///
/// Holds the model/endpoint defaults and the fixed per-operation timeouts.
/// Callers may override model and endpoint per request; timeouts are not
/// caller-configurable.
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// Default model identifier for all operations
    pub default_model: String,
    /// Default generation endpoint URL
    pub default_endpoint: Url,
    /// Timeout for availability probes and model listing
    pub probe_timeout: Duration,
    /// Timeout for single-shot generation calls
    pub generate_timeout: Duration,
    /// Timeout for category suggestion (shorter, the output is one word)
    pub category_timeout: Duration,
    /// Timeout for streaming generation calls
    pub stream_timeout: Duration,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            default_model: DEFAULT_MODEL.to_string(),
            default_endpoint: Url::parse(DEFAULT_ENDPOINT).expect("valid default endpoint URL"),
            probe_timeout: Duration::from_secs(5),
            generate_timeout: Duration::from_secs(30),
            category_timeout: Duration::from_secs(20),
            stream_timeout: Duration::from_secs(30),
        }
    }
}

impl AiConfig {
    /// Create a configuration from environment variables
    ///
    /// Reads `TRAK_AI_MODEL` and `TRAK_OLLAMA_URL` when set, falling back to
    /// the local defaults. Loads `.env` if present so local development picks
    /// up overrides.
    pub fn from_env() -> Result<Self> {
        let _ = dotenv();

        let mut config = Self::default();

        if let Ok(model) = std::env::var("TRAK_AI_MODEL") {
            config.default_model = model;
        }
        if let Ok(url) = std::env::var("TRAK_OLLAMA_URL") {
            config.default_endpoint = Url::parse(&url)
                .map_err(|e| Error::config(format!("invalid TRAK_OLLAMA_URL: {e}")))?;
        }

        Ok(config)
    }

    /// Set the default model
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Set the default endpoint
    pub fn with_default_endpoint(mut self, endpoint: Url) -> Self {
        self.default_endpoint = endpoint;
        self
    }

    /// Set the probe timeout
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Set the single-shot generation timeout
    pub fn with_generate_timeout(mut self, timeout: Duration) -> Self {
        self.generate_timeout = timeout;
        self
    }

    /// Set the streaming timeout
    pub fn with_stream_timeout(mut self, timeout: Duration) -> Self {
        self.stream_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_local_endpoint() {
        let config = AiConfig::default();
        assert_eq!(config.default_model, DEFAULT_MODEL);
        assert_eq!(config.default_endpoint.as_str(), "http://localhost:11434/");
        assert_eq!(config.probe_timeout, Duration::from_secs(5));
    }

    #[test]
    fn builder_overrides_defaults() {
        let endpoint = Url::parse("http://192.168.1.20:11434").unwrap();
        let config = AiConfig::default()
            .with_default_model("llama3:8b")
            .with_default_endpoint(endpoint.clone())
            .with_probe_timeout(Duration::from_secs(1));

        assert_eq!(config.default_model, "llama3:8b");
        assert_eq!(config.default_endpoint, endpoint);
        assert_eq!(config.probe_timeout, Duration::from_secs(1));
    }
}
