//! Error types for the trak-ai service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for trak-ai operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the trak-ai service
#[derive(Debug, Error)]
pub enum Error {
    /// The generation endpoint could not be reached or answered with a
    /// non-success status before producing useful output
    #[error("generation endpoint is not available")]
    Unavailable,

    /// The endpoint was reachable but returned no usable output
    #[error("generation failed: {0}")]
    GenerationFailed(String),

    /// A required input field is missing or empty
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a generation-failure error
    pub fn generation(msg: impl Into<String>) -> Self {
        Self::GenerationFailed(msg.into())
    }

    /// Create an invalid-input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Error::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Ollama is not available".to_string(),
            ),
            Error::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            Error::GenerationFailed(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            Error::Http(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            Error::Serialization(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            Error::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_maps_to_503() {
        let response = Error::Unavailable.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn invalid_input_maps_to_400() {
        let response = Error::invalid_input("description is required").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn generation_failure_maps_to_500() {
        let response = Error::generation("Failed to generate title").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
