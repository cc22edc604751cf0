//! Ollama API client with streaming support
//!
//! Talks to one HTTP-based Ollama endpoint, hiding its request/response
//! shape behind four operations: availability probing, model listing,
//! single-shot completion and token streaming. The endpoint is an untrusted,
//! possibly-absent external process (the local model server may not be
//! running, may be slow to load a model, or may emit corrupt lines while
//! streaming), so no operation here ever lets a transport error escape as an
//! unhandled fault.

use crate::client::GenerationClient;
use crate::config::AiConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::Stream;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use url::Url;

/// One generation request, constructed fresh per call
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Prompt text
    pub prompt: String,
    /// Model identifier
    pub model: String,
    /// Endpoint base URL
    pub endpoint: Url,
    /// Sampling temperature
    pub temperature: f32,
    /// Top-p sampling
    pub top_p: Option<f32>,
    /// Maximum tokens for the completion
    pub max_tokens: Option<u32>,
    /// Whether to stream the response
    pub stream: bool,
    /// Deadline for single-shot calls, fixed per operation kind. Streaming
    /// calls are bounded by the client's connect/read-gap timeout instead.
    pub timeout: Duration,
}

impl GenerationRequest {
    /// Create a new request with the default sampling settings
    pub fn new(model: impl Into<String>, endpoint: Url, prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            endpoint,
            temperature: 0.7,
            top_p: None,
            max_tokens: None,
            stream: false,
            timeout: Duration::from_secs(30),
        }
    }

    /// Set the temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the top-p parameter
    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// Set the maximum tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Enable streaming
    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Wire body for `POST /api/generate`
#[derive(Serialize)]
struct GenerateBody<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

/// Sampling options nested in the generate body
#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

impl From<&GenerationRequest> for GenerateOptions {
    fn from(request: &GenerationRequest) -> Self {
        Self {
            temperature: request.temperature,
            top_p: request.top_p,
            max_tokens: request.max_tokens,
        }
    }
}

/// Non-streaming response from `/api/generate`
#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// One decoded unit from a streaming response
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GenerationChunk {
    /// Incremental text, absent on pure bookkeeping lines
    #[serde(default)]
    pub response: Option<String>,
    /// Terminal marker; the final line of a stream carries `true`
    #[serde(default)]
    pub done: bool,
}

/// Model descriptor as reported by `/api/tags`
///
/// Only the name is interpreted here; everything else the endpoint reports
/// (size, digest, modification time) is passed through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Model name, e.g. "mistral:7b-instruct-q4_0"
    pub name: String,
    /// Remaining fields from the endpoint, passed through as-is
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Body of `GET /api/tags`
#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelDescriptor>,
}

/// A lazy, finite, non-restartable sequence of generation chunks
pub struct GenerationStream {
    inner: Pin<Box<dyn Stream<Item = Result<GenerationChunk>> + Send>>,
}

impl GenerationStream {
    /// Wrap an already-decoded chunk sequence
    pub fn new(stream: impl Stream<Item = Result<GenerationChunk>> + Send + 'static) -> Self {
        Self {
            inner: Box::pin(stream),
        }
    }

    /// Decode a raw transport byte stream as newline-delimited JSON chunks
    ///
    /// Each line is an independently-framed JSON object. Lines that fail to
    /// decode are skipped, not fatal. A line carrying the done marker is
    /// yielded and then the upstream is not read further. A transport error
    /// yields one `Err` item and ends the sequence.
    pub(crate) fn decode(
        bytes: impl Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
    ) -> Self {
        let chunks = async_stream::stream! {
            futures::pin_mut!(bytes);
            // Raw byte buffer: transport chunk boundaries can fall inside a
            // multibyte character, so UTF-8 is only interpreted per complete
            // line.
            let mut buffer: Vec<u8> = Vec::new();

            while let Some(next) = bytes.next().await {
                let data = match next {
                    Ok(data) => data,
                    Err(e) => {
                        yield Err(Error::Http(e));
                        return;
                    }
                };
                buffer.extend_from_slice(&data);

                while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
                    let line: Vec<u8> = buffer.drain(..=pos).collect();
                    if let Some(chunk) = parse_line(&line) {
                        let done = chunk.done;
                        yield Ok(chunk);
                        if done {
                            return;
                        }
                    }
                }
            }

            // Final line may arrive without a trailing newline.
            if let Some(chunk) = parse_line(&buffer) {
                yield Ok(chunk);
            }
        };

        Self::new(chunks)
    }
}

/// Decode one newline-delimited line as a chunk
///
/// Blank lines and lines that fail to decode are skipped, not fatal.
fn parse_line(line: &[u8]) -> Option<GenerationChunk> {
    let trimmed = line.trim_ascii();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_slice::<GenerationChunk>(trimmed) {
        Ok(chunk) => Some(chunk),
        Err(e) => {
            tracing::debug!(error = %e, "skipping undecodable stream line");
            None
        }
    }
}

impl Stream for GenerationStream {
    type Item = Result<GenerationChunk>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

/// Ollama endpoint client
pub struct OllamaClient {
    /// HTTP client for probes and single-shot calls
    client: Client,
    /// HTTP client for streaming calls
    stream_client: Client,
    /// Configuration
    config: AiConfig,
}

impl OllamaClient {
    /// Create a new Ollama client with the given configuration
    ///
    /// Probe and single-shot budgets differ, so their deadlines are applied
    /// per request. Streaming gets its own client: a whole-request deadline
    /// would kill any generation running longer than the budget even while
    /// tokens are flowing, so the stream timeout bounds the connect and the
    /// gap between reads instead.
    pub fn new(config: AiConfig) -> Result<Self> {
        let client = Client::builder().build()?;
        let stream_client = Client::builder()
            .connect_timeout(config.stream_timeout)
            .read_timeout(config.stream_timeout)
            .build()?;
        Ok(Self {
            client,
            stream_client,
            config,
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    fn tags_url(endpoint: &Url) -> String {
        format!("{}/api/tags", endpoint.as_str().trim_end_matches('/'))
    }

    fn generate_url(endpoint: &Url) -> String {
        format!("{}/api/generate", endpoint.as_str().trim_end_matches('/'))
    }
}

#[async_trait]
impl GenerationClient for OllamaClient {
    async fn probe(&self, endpoint: &Url) -> bool {
        let url = Self::tags_url(endpoint);
        match self
            .client
            .get(&url)
            .timeout(self.config.probe_timeout)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                tracing::debug!(%endpoint, "connected to generation endpoint");
                true
            }
            Ok(response) => {
                tracing::warn!(%endpoint, status = %response.status(), "probe returned non-success status");
                false
            }
            Err(e) => {
                tracing::warn!(%endpoint, error = %e, "probe failed");
                false
            }
        }
    }

    async fn list_models(&self, endpoint: &Url) -> Vec<ModelDescriptor> {
        let url = Self::tags_url(endpoint);
        let response = match self
            .client
            .get(&url)
            .timeout(self.config.probe_timeout)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                tracing::warn!(%endpoint, status = %response.status(), "model listing returned non-success status");
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!(%endpoint, error = %e, "model listing failed");
                return Vec::new();
            }
        };

        match response.json::<TagsResponse>().await {
            Ok(tags) => {
                tracing::debug!(%endpoint, count = tags.models.len(), "listed models");
                tags.models
            }
            Err(e) => {
                tracing::warn!(%endpoint, error = %e, "model listing body failed to decode");
                Vec::new()
            }
        }
    }

    async fn complete(&self, request: GenerationRequest) -> Option<String> {
        let url = Self::generate_url(&request.endpoint);
        let body = GenerateBody {
            model: &request.model,
            prompt: &request.prompt,
            stream: false,
            options: GenerateOptions::from(&request),
        };

        let response = match self
            .client
            .post(&url)
            .timeout(request.timeout)
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(model = %request.model, error = %e, "completion request failed");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(model = %request.model, status = %response.status(), "completion returned non-success status");
            return None;
        }

        match response.json::<GenerateResponse>().await {
            Ok(generated) => {
                let text = generated.response.trim().to_string();
                if text.is_empty() {
                    tracing::warn!(model = %request.model, "completion returned empty output");
                    None
                } else {
                    Some(text)
                }
            }
            Err(e) => {
                tracing::warn!(model = %request.model, error = %e, "completion body failed to decode");
                None
            }
        }
    }

    async fn stream(&self, request: GenerationRequest) -> Result<GenerationStream> {
        let url = Self::generate_url(&request.endpoint);
        let body = GenerateBody {
            model: &request.model,
            prompt: &request.prompt,
            stream: true,
            options: GenerateOptions::from(&request),
        };

        let response = self
            .stream_client
            .post(&url)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::generation(format!(
                "Failed to get AI response: {}",
                response.status().as_u16()
            )));
        }

        Ok(GenerationStream::decode(response.bytes_stream()))
    }

    fn client_type(&self) -> &str {
        "ollama"
    }
}
