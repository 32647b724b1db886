//! UI-agnostic application state types
//!
//! This module contains the data structures the controller owns and any
//! front end renders. None of them depend on a specific UI framework.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// A chat message in the transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
    pub timestamp: DateTime<Local>,
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

/// Ordered, append-only conversation history.
///
/// Messages are never edited or removed individually; the only way to drop
/// them is [`Transcript::clear`] on reset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message stamped now. Timestamps never go backwards, even if
    /// the wall clock does.
    pub fn push(&mut self, role: ChatRole, text: impl Into<String>) -> &ChatMessage {
        let now = Local::now();
        let timestamp = match self.messages.last() {
            Some(last) if last.timestamp > now => last.timestamp,
            _ => now,
        };
        self.messages.push(ChatMessage {
            role,
            text: text.into(),
            timestamp,
        });
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

/// Which representation of the artifact the workspace shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewTab {
    #[default]
    Preview,
    Code,
}

impl ViewTab {
    pub fn label(&self) -> &'static str {
        match self {
            ViewTab::Preview => "Preview",
            ViewTab::Code => "Code",
        }
    }

    pub fn all() -> [ViewTab; 2] {
        [ViewTab::Preview, ViewTab::Code]
    }
}
