//! Scripted generation client for unit tests

use crate::client::GenerationClient;
use crate::error::{Error, Result};
use crate::ollama::{GenerationChunk, GenerationRequest, GenerationStream, ModelDescriptor};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use url::Url;

/// A generation client whose answers are scripted up front
///
/// Call counters are `Arc`s so tests can keep a handle after moving the
/// client into the code under test.
pub struct ScriptedClient {
    available: bool,
    open_error: Mutex<Option<String>>,
    chunks: Mutex<Vec<Result<GenerationChunk>>>,
    completions: Mutex<VecDeque<Option<String>>>,
    pub probe_calls: Arc<AtomicUsize>,
    pub complete_calls: Arc<AtomicUsize>,
    pub stream_calls: Arc<AtomicUsize>,
}

impl ScriptedClient {
    /// A client whose endpoint answers the probe
    pub fn available() -> Self {
        Self {
            available: true,
            open_error: Mutex::new(None),
            chunks: Mutex::new(Vec::new()),
            completions: Mutex::new(VecDeque::new()),
            probe_calls: Arc::new(AtomicUsize::new(0)),
            complete_calls: Arc::new(AtomicUsize::new(0)),
            stream_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A client whose endpoint fails the probe
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::available()
        }
    }

    /// Script the chunk sequence the streaming call will produce
    pub fn with_chunks(self, chunks: Vec<Result<GenerationChunk>>) -> Self {
        *self.chunks.lock().unwrap() = chunks;
        self
    }

    /// Script a failure when opening the streaming call
    pub fn with_open_error(self, message: impl Into<String>) -> Self {
        *self.open_error.lock().unwrap() = Some(message.into());
        self
    }

    /// Script the outputs of successive single-shot completions, in order
    pub fn with_completions(self, completions: Vec<Option<&str>>) -> Self {
        *self.completions.lock().unwrap() = completions
            .into_iter()
            .map(|c| c.map(str::to_string))
            .collect();
        self
    }
}

#[async_trait]
impl GenerationClient for ScriptedClient {
    async fn probe(&self, _endpoint: &Url) -> bool {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        self.available
    }

    async fn list_models(&self, _endpoint: &Url) -> Vec<ModelDescriptor> {
        Vec::new()
    }

    async fn complete(&self, _request: GenerationRequest) -> Option<String> {
        self.complete_calls.fetch_add(1, Ordering::SeqCst);
        self.completions.lock().unwrap().pop_front().flatten()
    }

    async fn stream(&self, _request: GenerationRequest) -> Result<GenerationStream> {
        self.stream_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.open_error.lock().unwrap().take() {
            return Err(Error::generation(message));
        }
        let chunks = std::mem::take(&mut *self.chunks.lock().unwrap());
        Ok(GenerationStream::new(futures::stream::iter(chunks)))
    }

    fn client_type(&self) -> &str {
        "scripted"
    }
}
