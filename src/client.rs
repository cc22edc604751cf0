//! Generation client trait shared by concrete endpoint backends

use crate::error::Result;
use crate::ollama::{GenerationRequest, GenerationStream, ModelDescriptor};
use async_trait::async_trait;
use url::Url;

/// Trait for text-generation endpoint clients
///
/// Every operation is total from the caller's point of view: transport
/// failures never propagate as faults, they resolve to `false`, an empty
/// list, `None`, or an error item inside the returned stream.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Check whether the endpoint is reachable and answering
    async fn probe(&self, endpoint: &Url) -> bool;

    /// List the models the endpoint hosts; empty on any failure
    async fn list_models(&self, endpoint: &Url) -> Vec<ModelDescriptor>;

    /// Single-shot generation; `None` means "generation unavailable",
    /// never an empty result
    async fn complete(&self, request: GenerationRequest) -> Option<String>;

    /// Open a streaming generation session
    async fn stream(&self, request: GenerationRequest) -> Result<GenerationStream>;

    /// Get the client type for debugging/logging
    fn client_type(&self) -> &str;
}
