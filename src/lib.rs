//! # trak-ai
//!
//! AI enrichment service for the TRAK time tracker. Talks to a local or
//! remote Ollama endpoint for task title/description/category generation,
//! work-session summaries and a streaming productivity chat, and exposes
//! those operations over HTTP.
//!
//! The endpoint is treated as a possibly-absent external process: every
//! operation distinguishes "unavailable" from "generation failed", and the
//! chat relay forwards tokens as Server-Sent Events with exactly one
//! terminal frame per session.

pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod ollama;
pub mod prompts;
pub mod relay;
pub mod server;
pub mod service;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::GenerationClient;
pub use config::AiConfig;
pub use error::{Error, Result};
pub use ollama::{GenerationChunk, GenerationRequest, GenerationStream, ModelDescriptor, OllamaClient};
pub use prompts::{Category, ChatContext, StatSnapshot, TaskBrief};
pub use relay::{relay_session, RelayEvent};
pub use server::{create_router, run_server};
pub use service::{AiService, EndpointStatus, EnhancedTask, Target};
pub use state::AppState;
