//! Generation client: one user utterance in, one validated
//! [`GeneratedResponse`] (or [`GenerationError`]) out.
//!
//! A turn is split in three so an event loop can await the network call off
//! to the side: [`GenerationClient::begin`] snapshots the live session,
//! [`PendingTurn::run`] performs the request, [`GenerationClient::commit`]
//! records the exchange back into the session.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::ai::{GenerateRequest, GenerationBackend};
use crate::error::GenerationError;
use crate::session::{SessionId, SessionManager};

/// Validated payload of a successful turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedResponse {
    pub html: String,
    pub message: String,
}

/// Shape the service is asked for; fields stay optional so absence can be
/// reported as a schema violation instead of a generic parse error.
#[derive(Deserialize)]
struct RawResponse {
    html: Option<String>,
    message: Option<String>,
}

impl GeneratedResponse {
    /// Decode and validate a raw structured payload.
    pub fn decode(payload: &str) -> Result<Self, GenerationError> {
        let value: Value =
            serde_json::from_str(payload).map_err(GenerationError::MalformedPayload)?;
        if !value.is_object() {
            return Err(GenerationError::MalformedPayload(serde::de::Error::custom(
                "expected a JSON object",
            )));
        }
        let raw: RawResponse =
            serde_json::from_value(value).map_err(GenerationError::MalformedPayload)?;

        let html = raw
            .html
            .ok_or(GenerationError::SchemaViolation { field: "html" })?;
        let message = raw
            .message
            .ok_or(GenerationError::SchemaViolation { field: "message" })?;

        Ok(Self { html, message })
    }
}

/// A turn issued against a specific session, not yet sent
pub struct PendingTurn<B> {
    backend: Arc<B>,
    session_id: SessionId,
    user_text: String,
    request: GenerateRequest,
}

impl<B> PendingTurn<B>
where
    B: GenerationBackend + Sync + 'static,
{
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn user_text(&self) -> &str {
        &self.user_text
    }

    /// Perform the network round-trip. Never retries.
    pub async fn run(self) -> CompletedTurn {
        // Any payload the service produced is part of the conversation, even
        // one that fails validation here.
        let (result, raw_payload) = match self.backend.generate(&self.request).await {
            Ok(Some(payload)) => (GeneratedResponse::decode(&payload), Some(payload)),
            Ok(None) => (Err(GenerationError::EmptyResponse), None),
            Err(err) => (Err(err), None),
        };

        CompletedTurn {
            session_id: self.session_id,
            user_text: self.user_text,
            raw_payload,
            result,
        }
    }
}

/// Outcome of a [`PendingTurn`], tagged with the session it belongs to
#[derive(Debug)]
pub struct CompletedTurn {
    pub session_id: SessionId,
    pub user_text: String,
    raw_payload: Option<String>,
    pub result: Result<GeneratedResponse, GenerationError>,
}

pub struct GenerationClient<B> {
    backend: Arc<B>,
    sessions: SessionManager,
}

impl<B> GenerationClient<B>
where
    B: GenerationBackend + Sync + 'static,
{
    pub fn new(backend: B, sessions: SessionManager) -> Self {
        Self {
            backend: Arc::new(backend),
            sessions,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn sessions_mut(&mut self) -> &mut SessionManager {
        &mut self.sessions
    }

    /// Prepare a turn in the live session, starting one if needed.
    pub fn begin(&mut self, user_text: &str) -> PendingTurn<B> {
        let session = self.sessions.ensure_started();
        PendingTurn {
            backend: Arc::clone(&self.backend),
            session_id: session.id(),
            user_text: user_text.to_string(),
            request: session.request_for(user_text),
        }
    }

    /// Record the exchange into its session's history if the service
    /// answered with a payload. Transport failures and empty replies leave
    /// the history alone.
    ///
    /// Returns `false` when the turn belongs to a session that is no longer
    /// live; nothing is recorded in that case.
    pub fn commit(&mut self, turn: &CompletedTurn) -> bool {
        let Some(session) = self.sessions.session_mut(turn.session_id) else {
            return false;
        };
        if let Some(payload) = &turn.raw_payload {
            session.record_turn(&turn.user_text, payload);
        }
        true
    }

    /// Send one utterance and wait for the validated response.
    pub async fn send(&mut self, user_text: &str) -> Result<GeneratedResponse, GenerationError> {
        let pending = self.begin(user_text);
        let completed = pending.run().await;
        self.commit(&completed);
        completed.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::TurnRole;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Default)]
    struct ScriptedBackend {
        replies: Mutex<VecDeque<Result<Option<String>, GenerationError>>>,
        requests: Mutex<Vec<GenerateRequest>>,
    }

    impl ScriptedBackend {
        fn with(replies: Vec<Result<Option<String>, GenerationError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::default(),
            }
        }
    }

    impl GenerationBackend for ScriptedBackend {
        async fn generate(
            &self,
            request: &GenerateRequest,
        ) -> Result<Option<String>, GenerationError> {
            self.requests.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(GenerationError::EmptyResponse))
        }
    }

    fn payload(html: &str, message: &str) -> Result<Option<String>, GenerationError> {
        Ok(Some(
            serde_json::json!({ "html": html, "message": message }).to_string(),
        ))
    }

    #[test]
    fn test_decode_valid_payload() {
        let response =
            GeneratedResponse::decode(r#"{"html":"<html></html>","message":"Built it"}"#).unwrap();
        assert_eq!(response.html, "<html></html>");
        assert_eq!(response.message, "Built it");
    }

    #[test]
    fn test_decode_missing_fields() {
        let err = GeneratedResponse::decode(r#"{"message":"no html"}"#).unwrap_err();
        assert!(matches!(err, GenerationError::SchemaViolation { field: "html" }));

        let err = GeneratedResponse::decode(r#"{"html":"<p></p>"}"#).unwrap_err();
        assert!(matches!(
            err,
            GenerationError::SchemaViolation { field: "message" }
        ));
    }

    #[test]
    fn test_decode_malformed_payloads() {
        for payload in ["not json", r#"["<p></p>","msg"]"#, r#"{"html":42,"message":"x"}"#, ""] {
            let err = GeneratedResponse::decode(payload).unwrap_err();
            assert!(
                matches!(err, GenerationError::MalformedPayload(_)),
                "payload {payload:?} gave {err:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_send_starts_session_lazily() {
        let backend = ScriptedBackend::with(vec![payload("<h1>Hi</h1>", "Made a heading")]);
        let mut client = GenerationClient::new(backend, SessionManager::default());
        assert!(!client.sessions().is_live());

        let response = client.send("a heading").await.unwrap();
        assert_eq!(response.html, "<h1>Hi</h1>");
        assert!(client.sessions().is_live());
    }

    #[tokio::test]
    async fn test_successful_turns_become_context() {
        let backend = ScriptedBackend::with(vec![
            payload("<p>1</p>", "first"),
            payload("<p>2</p>", "second"),
        ]);
        let mut client = GenerationClient::new(backend, SessionManager::default());

        client.send("one").await.unwrap();
        client.send("two").await.unwrap();

        let requests = client.backend().requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].contents.len(), 1);
        let second = &requests[1].contents;
        assert_eq!(second.len(), 3);
        assert_eq!(second[0].text, "one");
        assert_eq!(second[1].role, TurnRole::Model);
        assert_eq!(second[2].text, "two");
    }

    #[tokio::test]
    async fn test_invalid_payload_still_becomes_context() {
        let backend = ScriptedBackend::with(vec![
            Ok(Some(r#"{"message":"no html"}"#.to_string())),
            payload("<p>ok</p>", "ok"),
        ]);
        let mut client = GenerationClient::new(backend, SessionManager::default());

        let err = client.send("broken").await.unwrap_err();
        assert!(matches!(err, GenerationError::SchemaViolation { field: "html" }));
        let history = client.sessions().current().unwrap().history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].text, r#"{"message":"no html"}"#);

        client.send("again").await.unwrap();
        let requests = client.backend().requests.lock().unwrap();
        let sizes: Vec<usize> = requests.iter().map(|r| r.contents.len()).collect();
        assert_eq!(sizes, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_transport_and_empty_replies_are_not_recorded() {
        let backend = ScriptedBackend::with(vec![
            Err(GenerationError::service(500, "boom")),
            Ok(None),
        ]);
        let mut client = GenerationClient::new(backend, SessionManager::default());

        client.send("first").await.unwrap_err();
        client.send("second").await.unwrap_err();
        assert!(client.sessions().current().unwrap().history().is_empty());
    }

    #[tokio::test]
    async fn test_empty_reply_is_an_error() {
        let backend = ScriptedBackend::with(vec![Ok(None)]);
        let mut client = GenerationClient::new(backend, SessionManager::default());
        let err = client.send("anything").await.unwrap_err();
        assert!(matches!(err, GenerationError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_commit_rejects_turn_from_old_session() {
        let backend = ScriptedBackend::with(vec![payload("<p>late</p>", "late")]);
        let mut client = GenerationClient::new(backend, SessionManager::default());

        let pending = client.begin("slow request");
        let old_session = pending.session_id();
        client.sessions_mut().reset();

        let completed = pending.run().await;
        assert_eq!(completed.session_id, old_session);
        assert!(!client.commit(&completed));
        assert!(client.sessions().current().unwrap().history().is_empty());
    }
}
