//! # webwright-core
//!
//! UI-agnostic core of Webwright: chat sessions against a structured-output
//! generation service, the application state controller, and the sandboxed
//! preview and code views.

pub mod ai;
pub mod code_view;
pub mod config;
pub mod controller;
pub mod error;
pub mod generation;
pub mod logging;
pub mod preview;
pub mod preview_server;
pub mod prompt;
pub mod session;
pub mod state;

// Re-export main types for convenience
pub use ai::{GeminiClient, GenerateRequest, GenerationBackend, Turn, TurnRole};
pub use code_view::{Clipboard, CodeView, SystemClipboard};
pub use config::Config;
pub use controller::{Resolution, SubmitRejected, Workbench};
pub use error::{Error, GenerationError, GenerationErrorKind, Result};
pub use generation::{CompletedTurn, GeneratedResponse, GenerationClient, PendingTurn};
pub use preview::{DeviceView, PreviewFrame, PreviewRenderer};
pub use preview_server::PreviewServer;
pub use session::{SessionId, SessionManager, SessionSettings};
pub use state::{ChatMessage, ChatRole, Transcript, ViewTab};
