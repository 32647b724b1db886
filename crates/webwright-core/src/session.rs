//! Chat session lifecycle.
//!
//! The generation endpoint is stateless, so a session is the client-held
//! conversation that gets replayed on every turn. At most one session is live
//! at a time; starting a new one throws the old history away.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::ai::{GenerateRequest, Turn};
use crate::prompt;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Fixed configuration every session is bound to
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub model: String,
    pub system_instruction: String,
    pub response_schema: Value,
    pub temperature: f32,
}

impl SessionSettings {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_instruction: prompt::SYSTEM_INSTRUCTION.to_string(),
            response_schema: prompt::response_schema(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL)
    }
}

/// Identifies one session for the lifetime of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// A live conversation with the generation service
#[derive(Debug)]
pub struct ChatSession {
    id: SessionId,
    settings: Arc<SessionSettings>,
    history: Vec<Turn>,
}

impl ChatSession {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    /// Build the request for the next turn without touching the history.
    pub fn request_for(&self, user_text: &str) -> GenerateRequest {
        let mut contents = self.history.clone();
        contents.push(Turn::user(user_text));
        GenerateRequest {
            settings: Arc::clone(&self.settings),
            contents,
        }
    }

    /// Append a completed exchange so later turns carry it as context.
    pub fn record_turn(&mut self, user_text: &str, model_text: &str) {
        self.history.push(Turn::user(user_text));
        self.history.push(Turn::model(model_text));
    }
}

/// Owns the single live session handle
#[derive(Debug)]
pub struct SessionManager {
    settings: Arc<SessionSettings>,
    current: Option<ChatSession>,
    next_id: u64,
}

impl SessionManager {
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            settings: Arc::new(settings),
            current: None,
            next_id: 1,
        }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Create a fresh session, discarding any live one.
    pub fn start(&mut self) -> SessionId {
        if let Some(old) = self.current.take() {
            tracing::info!(
                old = %old.id,
                discarded_turns = old.history.len(),
                "Discarding chat session"
            );
        }
        let session = self.open_session();
        self.current.insert(session).id
    }

    pub fn reset(&mut self) -> SessionId {
        self.current = None;
        self.start()
    }

    /// The live session, starting one first if there is none.
    pub fn ensure_started(&mut self) -> &mut ChatSession {
        let session = match self.current.take() {
            Some(session) => session,
            None => self.open_session(),
        };
        self.current.insert(session)
    }

    fn open_session(&mut self) -> ChatSession {
        let id = SessionId(self.next_id);
        self.next_id += 1;
        tracing::info!(session = %id, model = %self.settings.model, "Started chat session");
        ChatSession {
            id,
            settings: Arc::clone(&self.settings),
            history: Vec::new(),
        }
    }

    pub fn current(&self) -> Option<&ChatSession> {
        self.current.as_ref()
    }

    /// The live session if it is the one identified by `id`.
    pub fn session_mut(&mut self, id: SessionId) -> Option<&mut ChatSession> {
        self.current.as_mut().filter(|session| session.id == id)
    }

    pub fn current_id(&self) -> Option<SessionId> {
        self.current.as_ref().map(|session| session.id)
    }

    pub fn is_live(&self) -> bool {
        self.current.is_some()
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(SessionSettings::default())
    }
}
