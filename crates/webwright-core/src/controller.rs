//! Application state controller.
//!
//! Owns the artifact, the transcript and the view selectors, and is the only
//! thing that mutates them. A generation goes through two explicit phases:
//!
//! 1. [`Workbench::submit`] validates the input, appends the user message and
//!    marks the workbench busy, handing back a [`PendingTurn`].
//! 2. The caller awaits [`PendingTurn::run`] wherever it likes and passes the
//!    result to [`Workbench::resolve`].
//!
//! Because the user message is appended before the pending turn even exists,
//! it always precedes the model message that answers it.

use crate::ai::GenerationBackend;
use crate::error::GenerationErrorKind;
use crate::generation::{CompletedTurn, GenerationClient, PendingTurn};
use crate::preview::DeviceView;
use crate::prompt::{GENERATION_ERROR_NOTICE, PLACEHOLDER_HTML, RESET_CONFIRM_PROMPT};
use crate::session::SessionId;
use crate::state::{ChatRole, Transcript, ViewTab};

/// Why a submission did not start a generation. Neither case is shown to the
/// user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejected {
    /// Empty or whitespace-only input
    Empty,
    /// A generation is already in flight
    Busy,
}

/// What [`Workbench::resolve`] did with a completed turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// New artifact installed and the model's message appended
    Applied,
    /// Generic error notice appended, artifact untouched
    Failed(GenerationErrorKind),
    /// The turn belonged to a session that was reset; nothing changed
    Stale,
}

pub struct Workbench<B> {
    client: GenerationClient<B>,
    current_html: String,
    transcript: Transcript,
    device: DeviceView,
    view: ViewTab,
    /// Session of the generation in flight, if any
    in_flight: Option<SessionId>,
}

impl<B> Workbench<B>
where
    B: GenerationBackend + Sync + 'static,
{
    pub fn new(client: GenerationClient<B>) -> Self {
        Self {
            client,
            current_html: PLACEHOLDER_HTML.to_string(),
            transcript: Transcript::new(),
            device: DeviceView::default(),
            view: ViewTab::default(),
            in_flight: None,
        }
    }

    pub fn current_html(&self) -> &str {
        &self.current_html
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn device(&self) -> DeviceView {
        self.device
    }

    pub fn view(&self) -> ViewTab {
        self.view
    }

    pub fn is_generating(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.client.sessions().current_id()
    }

    pub fn client(&self) -> &GenerationClient<B> {
        &self.client
    }

    pub fn set_device(&mut self, device: DeviceView) {
        self.device = device;
    }

    pub fn set_view(&mut self, view: ViewTab) {
        self.view = view;
    }

    /// Start a generation for `text`.
    pub fn submit(&mut self, text: &str) -> Result<PendingTurn<B>, SubmitRejected> {
        if self.is_generating() {
            tracing::debug!("Submission rejected: generation already in flight");
            return Err(SubmitRejected::Busy);
        }
        if text.trim().is_empty() {
            return Err(SubmitRejected::Empty);
        }

        self.transcript.push(ChatRole::User, text);
        let pending = self.client.begin(text);
        self.in_flight = Some(pending.session_id());
        tracing::info!(
            session = %pending.session_id(),
            chars = text.chars().count(),
            "Submitted generation request"
        );
        Ok(pending)
    }

    /// Apply the outcome of a turn started by [`Workbench::submit`].
    pub fn resolve(&mut self, turn: CompletedTurn) -> Resolution {
        if self.in_flight != Some(turn.session_id) {
            tracing::warn!(
                turn_session = %turn.session_id,
                current_session = ?self.session_id(),
                "Discarding result from a reset session"
            );
            return Resolution::Stale;
        }
        self.in_flight = None;
        self.client.commit(&turn);

        match turn.result {
            Ok(response) => {
                tracing::info!(
                    session = %turn.session_id,
                    html_bytes = response.html.len(),
                    "Generation succeeded"
                );
                self.current_html = response.html;
                self.transcript.push(ChatRole::Model, response.message);
                self.view = ViewTab::Preview;
                Resolution::Applied
            }
            Err(err) => {
                let kind = err.kind();
                tracing::error!(
                    session = %turn.session_id,
                    kind = kind.as_str(),
                    "Generation failed: {}",
                    err
                );
                self.transcript.push(ChatRole::Model, GENERATION_ERROR_NOTICE);
                Resolution::Failed(kind)
            }
        }
    }

    /// Submit and wait for the outcome in one step.
    pub async fn send(&mut self, text: &str) -> Result<Resolution, SubmitRejected> {
        let pending = self.submit(text)?;
        let completed = pending.run().await;
        Ok(self.resolve(completed))
    }

    /// Give up on the generation in flight when its task died without
    /// producing a [`CompletedTurn`]. The user still gets exactly one reply.
    pub fn abandon(&mut self) -> bool {
        let Some(session) = self.in_flight.take() else {
            return false;
        };
        tracing::error!(%session, "Generation task ended without a result");
        self.transcript.push(ChatRole::Model, GENERATION_ERROR_NOTICE);
        true
    }

    /// Start over, if `confirm` agrees to [`RESET_CONFIRM_PROMPT`].
    ///
    /// On confirmation the session is replaced, the placeholder document is
    /// restored, the transcript is emptied and the workbench is idle again.
    /// A generation still in flight is orphaned: its result will resolve as
    /// [`Resolution::Stale`]. Returns whether the reset happened.
    pub fn reset(&mut self, confirm: impl FnOnce(&str) -> bool) -> bool {
        if !confirm(RESET_CONFIRM_PROMPT) {
            tracing::debug!("Reset declined");
            return false;
        }

        if let Some(orphaned) = self.in_flight.take() {
            tracing::warn!(session = %orphaned, "Reset while a generation was in flight");
        }
        let session = self.client.sessions_mut().reset();
        self.current_html = PLACEHOLDER_HTML.to_string();
        self.transcript.clear();
        tracing::info!(%session, "Workbench reset");
        true
    }
}
