//! Error types for the core library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Infrastructure errors: configuration, IO, preview server, clipboard
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid configuration in {path}: {message}")]
    ConfigInvalid { path: PathBuf, message: String },

    #[error("Clipboard error: {message}")]
    Clipboard { message: String },
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn clipboard(message: impl Into<String>) -> Self {
        Self::Clipboard {
            message: message.into(),
        }
    }
}

/// Diagnostic category of a [`GenerationError`].
///
/// Both categories are shown to the user identically; the distinction only
/// ends up in the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationErrorKind {
    Transport,
    SchemaViolation,
}

impl GenerationErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationErrorKind::Transport => "transport",
            GenerationErrorKind::SchemaViolation => "schema_violation",
        }
    }
}

/// Failure of a single generation turn
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("no API key configured (set GEMINI_API_KEY)")]
    MissingApiKey,

    #[error("request to generation service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("generation service returned {status}: {body}")]
    Service { status: u16, body: String },

    #[error("generation service returned no response payload")]
    EmptyResponse,

    #[error("response payload is not valid JSON for the schema: {0}")]
    MalformedPayload(#[source] serde_json::Error),

    #[error("response payload is missing required field `{field}`")]
    SchemaViolation { field: &'static str },
}

impl GenerationError {
    pub fn kind(&self) -> GenerationErrorKind {
        match self {
            GenerationError::MissingApiKey
            | GenerationError::Transport(_)
            | GenerationError::Service { .. } => GenerationErrorKind::Transport,
            GenerationError::EmptyResponse
            | GenerationError::MalformedPayload(_)
            | GenerationError::SchemaViolation { .. } => GenerationErrorKind::SchemaViolation,
        }
    }

    pub fn service(status: u16, body: impl Into<String>) -> Self {
        Self::Service {
            status,
            body: body.into(),
        }
    }
}
