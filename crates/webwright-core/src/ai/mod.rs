//! Remote generation service seam.
//!
//! The controller only ever talks to a [`GenerationBackend`]; the production
//! implementation is [`GeminiClient`], tests substitute scripted fakes.

pub mod gemini;

pub use gemini::GeminiClient;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::session::SessionSettings;

/// Speaker of a turn in the conversation replayed to the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Model,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Model => "model",
        }
    }
}

/// One turn of session history, as sent over the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: TurnRole,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            text: text.into(),
        }
    }
}

/// A single request: fixed session settings plus the full conversation, with
/// the new user turn last.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub settings: Arc<SessionSettings>,
    pub contents: Vec<Turn>,
}

impl GenerateRequest {
    /// The user text this request was issued for
    pub fn prompt(&self) -> Option<&str> {
        self.contents
            .last()
            .filter(|turn| turn.role == TurnRole::User)
            .map(|turn| turn.text.as_str())
    }
}

/// Remote generation service.
///
/// Returns the raw structured payload text, or `None` when the service
/// answered without one.
#[trait_variant::make(GenerationBackend: Send)]
pub trait LocalGenerationBackend {
    async fn generate(&self, request: &GenerateRequest) -> Result<Option<String>, GenerationError>;
}
