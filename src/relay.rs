//! Stream relay: republishes a generation token stream as framed events
//!
//! A relay session walks `Idle -> Connecting -> Streaming -> Terminated`.
//! The availability probe runs before the upstream stream is ever opened,
//! tokens are forwarded in receipt order with no buffering beyond the current
//! line, and every session ends with exactly one terminal event (`Done` or
//! `Error`). Terminated is absorbing.
//!
//! The session is a lazy, finite, non-restartable stream. Dropping it (the
//! client disconnected) drops the upstream connection at the next suspension
//! point, so the remote stream is never consumed past a gone client.

use crate::client::GenerationClient;
use crate::error::Error;
use crate::ollama::GenerationRequest;
use futures::stream::Stream;
use futures::StreamExt;
use serde_json::json;
use std::sync::Arc;

/// One client-facing framed unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    /// Incremental generated text
    Token(String),
    /// Clean end of the session
    Done,
    /// Failed end of the session
    Error(String),
}

impl RelayEvent {
    /// Whether this event ends the session
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RelayEvent::Token(_))
    }

    /// JSON payload carried by the frame
    pub fn payload(&self) -> serde_json::Value {
        match self {
            RelayEvent::Token(text) => json!({ "token": text }),
            RelayEvent::Done => json!({ "done": true }),
            RelayEvent::Error(message) => json!({ "error": message }),
        }
    }

    /// Textual event frame, `data: <json>` followed by a blank line
    pub fn to_frame(&self) -> String {
        format!("data: {}\n\n", self.payload())
    }
}

fn error_message(error: &Error) -> String {
    match error {
        Error::Http(e) => format!("Cannot connect to Ollama: {e}"),
        Error::GenerationFailed(msg) => msg.clone(),
        other => other.to_string(),
    }
}

/// Run one relay session against the given client
///
/// The returned stream produces `Token` events in receipt order and exactly
/// one terminal event. If the endpoint fails the availability probe the
/// upstream stream is never opened and the only event is an `Error`.
pub fn relay_session(
    client: Arc<dyn GenerationClient>,
    request: GenerationRequest,
) -> impl Stream<Item = RelayEvent> {
    async_stream::stream! {
        // Idle -> Connecting: probe before touching the generation API.
        if !client.probe(&request.endpoint).await {
            tracing::warn!(endpoint = %request.endpoint, "relay aborted, endpoint unavailable");
            yield RelayEvent::Error("Ollama is not available".to_string());
            return;
        }

        // Connecting -> Streaming: open the upstream token stream.
        let mut chunks = match client.stream(request).await {
            Ok(chunks) => chunks,
            Err(e) => {
                tracing::warn!(error = %e, "relay failed to open upstream stream");
                yield RelayEvent::Error(error_message(&e));
                return;
            }
        };

        // Streaming loop. Malformed lines were already skipped by the
        // decoder and produce no event here.
        while let Some(item) = chunks.next().await {
            match item {
                Ok(chunk) => {
                    if let Some(text) = chunk.response {
                        if !text.is_empty() {
                            yield RelayEvent::Token(text);
                        }
                    }
                    if chunk.done {
                        tracing::debug!("relay session complete");
                        yield RelayEvent::Done;
                        return;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "relay transport failure mid-stream");
                    yield RelayEvent::Error(error_message(&e));
                    return;
                }
            }
        }

        // Upstream ended without a done marker: truncation still terminates
        // the session with a single terminal event.
        tracing::warn!("upstream stream ended without a done marker");
        yield RelayEvent::Error("generation stream ended unexpectedly".to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ollama::GenerationChunk;
    use crate::test_support::ScriptedClient;
    use url::Url;

    fn token(text: &str) -> crate::error::Result<GenerationChunk> {
        Ok(GenerationChunk {
            response: Some(text.to_string()),
            done: false,
        })
    }

    fn done() -> crate::error::Result<GenerationChunk> {
        Ok(GenerationChunk {
            response: Some(String::new()),
            done: true,
        })
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new(
            "mistral:7b-instruct-q4_0",
            Url::parse(crate::config::DEFAULT_ENDPOINT).unwrap(),
            "prompt",
        )
        .with_stream(true)
    }

    async fn collect(client: ScriptedClient) -> Vec<RelayEvent> {
        relay_session(Arc::new(client), request()).collect().await
    }

    fn terminal_count(events: &[RelayEvent]) -> usize {
        events.iter().filter(|e| e.is_terminal()).count()
    }

    #[tokio::test]
    async fn tokens_then_done_in_receipt_order() {
        let client =
            ScriptedClient::available().with_chunks(vec![token("Hel"), token("lo"), done()]);
        let events = collect(client).await;

        assert_eq!(
            events,
            vec![
                RelayEvent::Token("Hel".to_string()),
                RelayEvent::Token("lo".to_string()),
                RelayEvent::Done,
            ]
        );
        assert_eq!(terminal_count(&events), 1);
    }

    #[tokio::test]
    async fn probe_failure_emits_single_error_and_never_opens_stream() {
        let client = ScriptedClient::unavailable();
        let stream_calls = client.stream_calls.clone();
        let events = collect(client).await;

        assert_eq!(
            events,
            vec![RelayEvent::Error("Ollama is not available".to_string())]
        );
        assert_eq!(stream_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn open_failure_emits_single_error() {
        let client = ScriptedClient::available().with_open_error("Failed to get AI response: 500");
        let events = collect(client).await;

        assert_eq!(
            events,
            vec![RelayEvent::Error(
                "Failed to get AI response: 500".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn mid_stream_failure_still_ends_with_exactly_one_terminal() {
        let client = ScriptedClient::available().with_chunks(vec![
            token("partial "),
            token("answer"),
            Err(crate::error::Error::generation("connection reset")),
        ]);
        let events = collect(client).await;

        assert_eq!(events.len(), 3);
        assert_eq!(events[0], RelayEvent::Token("partial ".to_string()));
        assert_eq!(events[1], RelayEvent::Token("answer".to_string()));
        assert!(matches!(events[2], RelayEvent::Error(_)));
        assert_eq!(terminal_count(&events), 1);
    }

    #[tokio::test]
    async fn truncated_stream_terminates_with_error() {
        let client = ScriptedClient::available().with_chunks(vec![token("half")]);
        let events = collect(client).await;

        assert_eq!(events.len(), 2);
        assert_eq!(events[0], RelayEvent::Token("half".to_string()));
        assert_eq!(
            events[1],
            RelayEvent::Error("generation stream ended unexpectedly".to_string())
        );
    }

    #[tokio::test]
    async fn final_chunk_with_text_and_done_yields_token_then_done() {
        let client = ScriptedClient::available().with_chunks(vec![Ok(GenerationChunk {
            response: Some("ok".to_string()),
            done: true,
        })]);
        let events = collect(client).await;

        assert_eq!(
            events,
            vec![RelayEvent::Token("ok".to_string()), RelayEvent::Done]
        );
    }

    #[tokio::test]
    async fn tokens_concatenate_to_upstream_text() {
        let fragments = ["On", "e ", "tw", "o ", "three"];
        let mut chunks: Vec<_> = fragments.iter().map(|f| token(f)).collect();
        chunks.push(done());
        let client = ScriptedClient::available().with_chunks(chunks);
        let events = collect(client).await;

        let concatenated: String = events
            .iter()
            .filter_map(|e| match e {
                RelayEvent::Token(text) => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(concatenated, fragments.concat());
    }

    #[test]
    fn frames_serialize_to_the_event_protocol() {
        assert_eq!(
            RelayEvent::Token("Hi".to_string()).to_frame(),
            "data: {\"token\":\"Hi\"}\n\n"
        );
        assert_eq!(RelayEvent::Done.to_frame(), "data: {\"done\":true}\n\n");
        assert_eq!(
            RelayEvent::Error("boom".to_string()).to_frame(),
            "data: {\"error\":\"boom\"}\n\n"
        );
    }

    #[test]
    fn only_token_events_are_non_terminal() {
        assert!(!RelayEvent::Token("x".to_string()).is_terminal());
        assert!(RelayEvent::Done.is_terminal());
        assert!(RelayEvent::Error("x".to_string()).is_terminal());
    }
}
