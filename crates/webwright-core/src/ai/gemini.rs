use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{GenerateRequest, GenerationBackend, Turn};
use crate::error::GenerationError;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    response_mime_type: String,
    response_schema: Value,
    temperature: f32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    system_instruction: GeminiContent,
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: &str) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: &str, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }
}

impl GenerationBackend for GeminiClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<Option<String>, GenerationError> {
        if !self.has_api_key() {
            return Err(GenerationError::MissingApiKey);
        }

        let body = build_request_body(request);
        let url = self.endpoint(&request.settings.model);
        tracing::debug!(
            model = %request.settings.model,
            turns = request.contents.len(),
            "Sending generateContent request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(GenerationError::service(status.as_u16(), text));
        }

        let gemini_response: GeminiResponse = response.json().await?;
        Ok(extract_text(gemini_response))
    }
}

fn to_content(turn: &Turn) -> GeminiContent {
    GeminiContent {
        role: Some(turn.role.as_str().to_string()),
        parts: vec![GeminiPart {
            text: turn.text.clone(),
        }],
    }
}

fn build_request_body(request: &GenerateRequest) -> GeminiRequest {
    let settings = &request.settings;
    GeminiRequest {
        system_instruction: GeminiContent {
            role: None,
            parts: vec![GeminiPart {
                text: settings.system_instruction.clone(),
            }],
        },
        contents: request.contents.iter().map(to_content).collect(),
        generation_config: GeminiGenerationConfig {
            response_mime_type: "application/json".to_string(),
            response_schema: settings.response_schema.clone(),
            temperature: settings.temperature,
        },
    }
}

/// Concatenated text of the first candidate, `None` if there is nothing.
fn extract_text(response: GeminiResponse) -> Option<String> {
    let text: String = response
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .filter_map(|part| part.text)
        .collect();

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionSettings;
    use std::sync::Arc;

    fn request() -> GenerateRequest {
        GenerateRequest {
            settings: Arc::new(SessionSettings::new("gemini-2.5-flash")),
            contents: vec![
                Turn::user("a bakery page"),
                Turn::model(r#"{"html":"<html></html>","message":"done"}"#),
                Turn::user("make it blue"),
            ],
        }
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(build_request_body(&request())).unwrap();

        assert!(body["systemInstruction"]["role"].is_null());
        assert!(body["systemInstruction"]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("Tailwind"));
        assert_eq!(body["contents"].as_array().unwrap().len(), 3);
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["contents"][2]["parts"][0]["text"], "make it blue");
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
        let temperature = body["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temperature - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let response: GeminiResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"{\"html\":"},{"text":"\"x\"}"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text(response).as_deref(), Some(r#"{"html":"x"}"#));
    }

    #[test]
    fn test_extract_text_empty_cases() {
        let no_candidates: GeminiResponse = serde_json::from_str("{}").unwrap();
        assert!(extract_text(no_candidates).is_none());

        let no_content: GeminiResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap();
        assert!(extract_text(no_content).is_none());

        let empty_text: GeminiResponse =
            serde_json::from_str(r#"{"candidates":[{"content":{"parts":[{"text":""}]}}]}"#)
                .unwrap();
        assert!(extract_text(empty_text).is_none());
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = GeminiClient::with_base_url("key", "http://localhost:9000/");
        assert_eq!(
            client.endpoint("gemini-2.5-flash"),
            "http://localhost:9000/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_network() {
        let client = GeminiClient::new("");
        let err = client.generate(&request()).await.unwrap_err();
        assert!(matches!(err, GenerationError::MissingApiKey));
    }
}
