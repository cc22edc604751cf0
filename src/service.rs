//! Request orchestrator for the six AI operations
//!
//! Validates inputs, gates every generation call behind an availability
//! probe, builds the matching prompt and shapes the outcome. Unavailability
//! (`Error::Unavailable`) is kept distinct from generation failure so clients
//! can retry once the local model server starts.

use crate::client::GenerationClient;
use crate::config::AiConfig;
use crate::error::{Error, Result};
use crate::ollama::{GenerationRequest, ModelDescriptor, OllamaClient};
use crate::prompts::{self, Category, ChatContext, TaskBrief};
use crate::relay::{self, RelayEvent};
use futures::stream::Stream;
use serde::Serialize;
use std::sync::Arc;
use url::Url;

/// Per-request model/endpoint overrides; unset fields fall back to the
/// configured defaults
#[derive(Debug, Clone, Default)]
pub struct Target {
    /// Model identifier override
    pub model: Option<String>,
    /// Endpoint URL override
    pub url: Option<Url>,
}

/// Result of a status check, recomputed on every query
#[derive(Debug, Clone, Serialize)]
pub struct EndpointStatus {
    /// Whether the endpoint answered the probe
    pub available: bool,
    /// Models the endpoint hosts; empty when unavailable
    pub models: Vec<ModelDescriptor>,
}

/// Result of the combined title + description enhancement
#[derive(Debug, Clone, Serialize)]
pub struct EnhancedTask {
    /// Generated title, or the raw input when title generation failed
    pub title: String,
    /// Generated description, or the raw input when it failed
    pub description: String,
}

/// Orchestrator over one generation endpoint client
#[derive(Clone)]
pub struct AiService {
    client: Arc<dyn GenerationClient>,
    config: AiConfig,
}

impl AiService {
    /// Create a service backed by a real Ollama client
    pub fn new(config: AiConfig) -> Result<Self> {
        let client = Arc::new(OllamaClient::new(config.clone())?);
        Ok(Self::with_client(client, config))
    }

    /// Create a service over an arbitrary generation client
    pub fn with_client(client: Arc<dyn GenerationClient>, config: AiConfig) -> Self {
        Self { client, config }
    }

    /// Get the configuration
    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    fn resolve(&self, target: &Target) -> (String, Url) {
        let model = target
            .model
            .clone()
            .unwrap_or_else(|| self.config.default_model.clone());
        let endpoint = target
            .url
            .clone()
            .unwrap_or_else(|| self.config.default_endpoint.clone());
        (model, endpoint)
    }

    async fn ensure_available(&self, endpoint: &Url) -> Result<()> {
        if self.client.probe(endpoint).await {
            Ok(())
        } else {
            Err(Error::Unavailable)
        }
    }

    fn title_request(&self, model: &str, endpoint: &Url, description: &str) -> GenerationRequest {
        GenerationRequest::new(model, endpoint.clone(), prompts::title_prompt(description))
            .with_temperature(0.3)
            .with_top_p(0.9)
            .with_max_tokens(50)
            .with_timeout(self.config.generate_timeout)
    }

    fn description_request(&self, model: &str, endpoint: &Url, user_input: &str) -> GenerationRequest {
        GenerationRequest::new(model, endpoint.clone(), prompts::description_prompt(user_input))
            .with_temperature(0.5)
            .with_top_p(0.9)
            .with_max_tokens(100)
            .with_timeout(self.config.generate_timeout)
    }

    /// Check endpoint availability and list its models
    ///
    /// Never fails; an unreachable endpoint reports `available: false` with
    /// no models.
    pub async fn status(&self, url: Option<Url>) -> EndpointStatus {
        let endpoint = url.unwrap_or_else(|| self.config.default_endpoint.clone());
        tracing::info!(%endpoint, "checking generation endpoint status");

        let available = self.client.probe(&endpoint).await;
        let models = if available {
            self.client.list_models(&endpoint).await
        } else {
            Vec::new()
        };

        EndpointStatus { available, models }
    }

    /// Generate a task title from a free-text description
    pub async fn generate_title(&self, description: &str, target: &Target) -> Result<String> {
        if description.trim().is_empty() {
            return Err(Error::invalid_input("description is required"));
        }
        let (model, endpoint) = self.resolve(target);
        self.ensure_available(&endpoint).await?;

        let raw = self
            .client
            .complete(self.title_request(&model, &endpoint, description))
            .await
            .ok_or_else(|| Error::generation("Failed to generate title"))?;
        Ok(prompts::clean_title(&raw))
    }

    /// Summarize a work session from its task list
    pub async fn generate_summary(&self, tasks: &[TaskBrief], target: &Target) -> Result<String> {
        if tasks.is_empty() {
            return Err(Error::invalid_input("at least one task is required"));
        }
        let (model, endpoint) = self.resolve(target);
        self.ensure_available(&endpoint).await?;

        let request =
            GenerationRequest::new(model, endpoint, prompts::summary_prompt(tasks))
                .with_temperature(0.7)
                .with_timeout(self.config.generate_timeout);
        self.client
            .complete(request)
            .await
            .ok_or_else(|| Error::generation("Failed to generate summary"))
    }

    /// Suggest a category for a task, always one of the fixed set
    pub async fn suggest_category(
        &self,
        title: &str,
        description: Option<&str>,
        target: &Target,
    ) -> Result<Category> {
        if title.trim().is_empty() {
            return Err(Error::invalid_input("title is required"));
        }
        let (model, endpoint) = self.resolve(target);
        self.ensure_available(&endpoint).await?;

        let request =
            GenerationRequest::new(model, endpoint, prompts::category_prompt(title, description))
                .with_temperature(0.3)
                .with_timeout(self.config.category_timeout);
        let raw = self
            .client
            .complete(request)
            .await
            .ok_or_else(|| Error::generation("Failed to generate category"))?;
        Ok(Category::from_raw(&raw))
    }

    /// Generate both an enhanced title and description from raw input
    ///
    /// Partial success is acceptable here, and only here: whichever of the
    /// two generations fails falls back to echoing the raw input instead of
    /// failing the whole request.
    pub async fn enhance_task(&self, user_input: &str, target: &Target) -> Result<EnhancedTask> {
        if user_input.trim().is_empty() {
            return Err(Error::invalid_input("user_input is required"));
        }
        let (model, endpoint) = self.resolve(target);
        self.ensure_available(&endpoint).await?;

        let title = self
            .client
            .complete(self.title_request(&model, &endpoint, user_input))
            .await
            .map(|raw| prompts::clean_title(&raw))
            .unwrap_or_else(|| {
                tracing::warn!("title generation failed, echoing raw input");
                user_input.to_string()
            });
        let description = self
            .client
            .complete(self.description_request(&model, &endpoint, user_input))
            .await
            .map(|raw| prompts::clean_description(&raw))
            .unwrap_or_else(|| {
                tracing::warn!("description generation failed, echoing raw input");
                user_input.to_string()
            });

        Ok(EnhancedTask { title, description })
    }

    /// Open a streaming chat session
    ///
    /// Validation happens here, before anything touches the network; every
    /// later failure (probe, connect, mid-stream) surfaces as an `Error`
    /// frame inside the returned event stream.
    pub fn chat(
        &self,
        message: &str,
        context: &ChatContext,
        target: &Target,
    ) -> Result<impl Stream<Item = RelayEvent>> {
        if message.trim().is_empty() {
            return Err(Error::invalid_input("message is required"));
        }
        let (model, endpoint) = self.resolve(target);
        tracing::info!(%model, %endpoint, "opening chat relay session");

        let request =
            GenerationRequest::new(model, endpoint, prompts::chat_prompt(message, context))
                .with_temperature(0.7)
                .with_max_tokens(200)
                .with_stream(true);
        Ok(relay::relay_session(self.client.clone(), request))
    }
}
