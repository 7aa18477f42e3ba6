//! GeminiClient -- concrete [`GenerationClient`] implementation for Gemini.
//!
//! Sends one `generateContent` call per request. The persona instruction is
//! delivered as a priming exchange (a user turn followed by a model
//! acknowledgment) ahead of the conversation history.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and travels only in
//! the query string. Transport errors are stripped of their URL before they
//! are reported, so the key never reaches logs or callers.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use tagarela_core::llm::client::GenerationClient;
use tagarela_types::chat::MessageRole;
use tagarela_types::config::GeminiConfig;
use tagarela_types::llm::{FinishReason, GenerationError, GenerationRequest};

use super::types::{
    GeminiContent, GeminiErrorResponse, GeminiGenerationConfig, GeminiRequest, GeminiResponse,
};

/// Model turn that follows the persona instruction in the priming exchange.
pub const PERSONA_ACKNOWLEDGMENT: &str = "Entendido! Estou pronta para conversar.";

/// Gemini generation client.
///
/// `api_key` may be absent; every call then fails with
/// [`GenerationError::MissingCredentials`] without touching the network.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    base_url: String,
    model: String,
}

impl GeminiClient {
    /// Create a client with bounded connect and total-call timeouts.
    pub fn new(config: &GeminiConfig, api_key: Option<SecretString>) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| GenerationError::Transport(e.without_url().to_string()))?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    /// Whether an API key was supplied.
    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// Convert a generic [`GenerationRequest`] into a [`GeminiRequest`].
    fn to_gemini_request(&self, request: &GenerationRequest) -> GeminiRequest {
        let mut contents = Vec::with_capacity(request.history.len() + 3);

        if let Some(instruction) = &request.persona_instruction {
            contents.push(GeminiContent::text(MessageRole::User.as_str(), instruction));
            contents.push(GeminiContent::text(
                MessageRole::Model.as_str(),
                PERSONA_ACKNOWLEDGMENT,
            ));
        }

        for (index, entry) in request.history.iter().enumerate() {
            let role = entry
                .role
                .as_deref()
                .and_then(|r| r.parse::<MessageRole>().ok());
            let text = entry.text.as_deref().filter(|t| !t.trim().is_empty());

            match (role, text) {
                (Some(role), Some(text)) => {
                    contents.push(GeminiContent::text(role.as_str(), text));
                }
                _ => {
                    warn!(
                        index,
                        role = ?entry.role,
                        has_text = text.is_some(),
                        "Skipping malformed history entry"
                    );
                }
            }
        }

        contents.push(GeminiContent::text(
            MessageRole::User.as_str(),
            request.prompt.as_str(),
        ));

        GeminiRequest {
            contents,
            generation_config: GeminiGenerationConfig {
                temperature: request.params.temperature,
                top_p: request.params.top_p,
                top_k: request.params.top_k,
            },
        }
    }
}

fn transport_error(e: reqwest::Error) -> GenerationError {
    let e = e.without_url();
    if e.is_timeout() {
        GenerationError::Timeout(e.to_string())
    } else if e.is_connect() {
        GenerationError::Connection(e.to_string())
    } else {
        GenerationError::Transport(e.to_string())
    }
}

/// Map a successful response body to the client outcome.
fn classify_response(response: &GeminiResponse) -> Result<Option<String>, GenerationError> {
    if let Some(text) = response.first_text() {
        return Ok(Some(text.to_string()));
    }

    let Some(raw_reason) = response.finish_reason() else {
        return Ok(None);
    };

    match raw_reason.parse::<FinishReason>() {
        Ok(FinishReason::Safety) => Err(GenerationError::BlockedForSafety),
        Ok(FinishReason::Recitation) => Err(GenerationError::BlockedForRecitation),
        Ok(FinishReason::Other) => Err(GenerationError::Interrupted),
        Ok(FinishReason::Stop) => Ok(Some(String::new())),
        Err(_) => {
            debug!(finish_reason = raw_reason, "Unrecognized finish reason without text");
            Ok(None)
        }
    }
}

impl GenerationClient for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<Option<String>, GenerationError> {
        let Some(api_key) = &self.api_key else {
            return Err(GenerationError::MissingCredentials);
        };

        let body = self.to_gemini_request(request);
        debug!(turns = body.contents.len(), model = %self.model, "Sending generateContent request");

        let response = self
            .client
            .post(self.url())
            .query(&[("key", api_key.expose_secret())])
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let raw_body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "Generation service rejected the request");
            return Err(match serde_json::from_str::<GeminiErrorResponse>(&raw_body) {
                Ok(parsed) => GenerationError::Rejected {
                    status: status.as_u16(),
                    message: parsed.error.message,
                },
                Err(_) => GenerationError::RejectedRaw {
                    status: status.as_u16(),
                    body: raw_body,
                },
            });
        }

        let parsed: GeminiResponse = serde_json::from_str(&raw_body)
            .map_err(|e| GenerationError::InvalidResponse(format!("failed to parse response: {e}")))?;

        let outcome = classify_response(&parsed);
        debug!(
            finish_reason = parsed.finish_reason().unwrap_or("none"),
            has_text = matches!(outcome, Ok(Some(ref t)) if !t.is_empty()),
            "Generation finished"
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::Json;
    use axum::extract::Query;
    use axum::http::{StatusCode, header};
    use axum::response::IntoResponse;
    use serde_json::{Value, json};
    use tagarela_types::llm::{GenerationParams, HistoryEntry};

    use super::*;

    /// A request captured by the fake server.
    #[derive(Debug, Clone)]
    struct Captured {
        path: String,
        key: Option<String>,
        body: Value,
    }

    struct FakeGemini {
        base_url: String,
        captured: Arc<Mutex<Vec<Captured>>>,
    }

    impl FakeGemini {
        fn last(&self) -> Captured {
            self.captured.lock().unwrap().last().cloned().unwrap()
        }

        fn hits(&self) -> usize {
            self.captured.lock().unwrap().len()
        }
    }

    /// Spawn an in-process server answering every POST with `status` and `body`.
    async fn fake_gemini(status: StatusCode, body: &str, delay: Duration) -> FakeGemini {
        let captured: Arc<Mutex<Vec<Captured>>> = Arc::default();
        let recorder = Arc::clone(&captured);
        let body = body.to_string();

        let handler = move |uri: axum::http::Uri,
                            Query(query): Query<HashMap<String, String>>,
                            Json(payload): Json<Value>| {
            let recorder = Arc::clone(&recorder);
            let body = body.clone();
            async move {
                recorder.lock().unwrap().push(Captured {
                    path: uri.path().to_string(),
                    key: query.get("key").cloned(),
                    body: payload,
                });
                tokio::time::sleep(delay).await;
                (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
            }
        };

        let app = axum::Router::new().route("/v1beta/models/{call}", axum::routing::post(handler));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        FakeGemini {
            base_url: format!("http://{addr}/v1beta"),
            captured,
        }
    }

    fn config_for(base_url: &str) -> GeminiConfig {
        GeminiConfig {
            base_url: base_url.to_string(),
            model: "gemini-1.5-flash".to_string(),
            connect_timeout_secs: 1,
            request_timeout_secs: 1,
        }
    }

    fn client_for(fake: &FakeGemini) -> GeminiClient {
        GeminiClient::new(
            &config_for(&fake.base_url),
            Some(SecretString::from("test-key-not-real")),
        )
        .unwrap()
    }

    fn text_body(text: &str) -> String {
        json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": text}]},
                "finishReason": "STOP"
            }]
        })
        .to_string()
    }

    fn finish_only_body(reason: &str) -> String {
        json!({"candidates": [{"finishReason": reason}]}).to_string()
    }

    fn persona_request(prompt: &str) -> GenerationRequest {
        GenerationRequest::new(prompt).with_persona("Seja simpática.")
    }

    #[test]
    fn test_client_name_and_model() {
        let client = GeminiClient::new(&GeminiConfig::default(), None).unwrap();
        assert_eq!(client.name(), "gemini");
        assert_eq!(client.model(), "gemini-1.5-flash");
        assert!(!client.has_credentials());
    }

    #[test]
    fn test_url_trims_trailing_slash() {
        let client = GeminiClient::new(&config_for("http://localhost:9999/v1beta/"), None).unwrap();
        assert_eq!(
            client.url(),
            "http://localhost:9999/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn test_persona_occupies_first_two_turns() {
        let client = GeminiClient::new(&GeminiConfig::default(), None).unwrap();
        let request = persona_request("Tudo bem?").with_history(vec![
            HistoryEntry::new("user", "Oi"),
            HistoryEntry::new("model", "Olá!"),
        ]);

        let body = client.to_gemini_request(&request);

        assert_eq!(body.contents.len(), 5);
        assert_eq!(body.contents[0].role, "user");
        assert_eq!(body.contents[0].parts[0].text, "Seja simpática.");
        assert_eq!(body.contents[1].role, "model");
        assert_eq!(body.contents[1].parts[0].text, PERSONA_ACKNOWLEDGMENT);
        assert_eq!(body.contents[2].parts[0].text, "Oi");
        assert_eq!(body.contents[3].role, "model");
        assert_eq!(body.contents[4].role, "user");
        assert_eq!(body.contents[4].parts[0].text, "Tudo bem?");
    }

    #[test]
    fn test_no_persona_means_no_priming() {
        let client = GeminiClient::new(&GeminiConfig::default(), None).unwrap();
        let body = client.to_gemini_request(&GenerationRequest::new("Oi"));
        assert_eq!(body.contents.len(), 1);
        assert_eq!(body.contents[0].parts[0].text, "Oi");
    }

    #[test]
    fn test_malformed_history_entries_are_skipped() {
        let client = GeminiClient::new(&GeminiConfig::default(), None).unwrap();
        let request = GenerationRequest::new("E agora?").with_history(vec![
            HistoryEntry::new("user", "válida"),
            HistoryEntry {
                role: None,
                text: Some("sem papel".to_string()),
            },
            HistoryEntry::new("system", "papel desconhecido"),
            HistoryEntry {
                role: Some("model".to_string()),
                text: None,
            },
            HistoryEntry::new("model", "   "),
            HistoryEntry::new("model", "também válida"),
        ]);

        let body = client.to_gemini_request(&request);

        let texts: Vec<&str> = body.contents.iter().map(|c| c.parts[0].text.as_str()).collect();
        assert_eq!(texts, vec!["válida", "também válida", "E agora?"]);
    }

    #[test]
    fn test_unset_params_are_omitted() {
        let client = GeminiClient::new(&GeminiConfig::default(), None).unwrap();
        let request = GenerationRequest::new("Oi").with_params(GenerationParams {
            temperature: Some(0.2),
            top_p: None,
            top_k: None,
        });

        let json = serde_json::to_value(client.to_gemini_request(&request)).unwrap();

        assert_eq!(json["generationConfig"], json!({"temperature": 0.2}));
    }

    #[tokio::test]
    async fn test_missing_key_makes_no_call() {
        let fake = fake_gemini(StatusCode::OK, &text_body("Olá"), Duration::ZERO).await;
        let client = GeminiClient::new(&config_for(&fake.base_url), None).unwrap();

        let result = client.generate(&GenerationRequest::new("Oi")).await;

        assert!(matches!(result, Err(GenerationError::MissingCredentials)));
        assert_eq!(fake.hits(), 0);
    }

    #[tokio::test]
    async fn test_successful_text_reply() {
        let fake = fake_gemini(StatusCode::OK, &text_body("Olá! Tudo ótimo."), Duration::ZERO).await;
        let client = client_for(&fake);

        let reply = client.generate(&persona_request("Oi")).await.unwrap();

        assert_eq!(reply.as_deref(), Some("Olá! Tudo ótimo."));
        let captured = fake.last();
        assert_eq!(captured.path, "/v1beta/models/gemini-1.5-flash:generateContent");
        assert_eq!(captured.key.as_deref(), Some("test-key-not-real"));
        assert_eq!(captured.body["contents"][0]["parts"][0]["text"], "Seja simpática.");
        assert_eq!(captured.body["contents"][1]["role"], "model");
        assert_eq!(captured.body["generationConfig"]["temperature"], 0.7);
        assert_eq!(captured.body["generationConfig"]["topP"], 0.9);
        assert!(captured.body["generationConfig"].get("topK").is_none());
    }

    #[tokio::test]
    async fn test_rejection_with_json_message() {
        let body = json!({"error": {"code": 403, "message": "invalid key"}}).to_string();
        let fake = fake_gemini(StatusCode::FORBIDDEN, &body, Duration::ZERO).await;

        let err = client_for(&fake)
            .generate(&GenerationRequest::new("Oi"))
            .await
            .unwrap_err();

        match &err {
            GenerationError::Rejected { status, message } => {
                assert_eq!(*status, 403);
                assert_eq!(message, "invalid key");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
        assert!(err.public_message().contains("invalid key"));
    }

    #[tokio::test]
    async fn test_rejection_with_raw_body() {
        let fake = fake_gemini(
            StatusCode::INTERNAL_SERVER_ERROR,
            "<html>upstream exploded</html>",
            Duration::ZERO,
        )
        .await;

        let err = client_for(&fake)
            .generate(&GenerationRequest::new("Oi"))
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::RejectedRaw { status: 500, .. }));
        assert!(!err.public_message().contains("exploded"));
    }

    #[tokio::test]
    async fn test_unparseable_success_body() {
        let fake = fake_gemini(StatusCode::OK, "not json at all", Duration::ZERO).await;

        let err = client_for(&fake)
            .generate(&GenerationRequest::new("Oi"))
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_finish_reason_classification() {
        let cases = [
            ("SAFETY", "safety"),
            ("RECITATION", "recitation"),
            ("OTHER", "interrupted"),
        ];

        for (reason, expected) in cases {
            let fake = fake_gemini(StatusCode::OK, &finish_only_body(reason), Duration::ZERO).await;
            let err = client_for(&fake)
                .generate(&GenerationRequest::new("Oi"))
                .await
                .unwrap_err();

            let kind = match err {
                GenerationError::BlockedForSafety => "safety",
                GenerationError::BlockedForRecitation => "recitation",
                GenerationError::Interrupted => "interrupted",
                other => panic!("unexpected error for {reason}: {other:?}"),
            };
            assert_eq!(kind, expected);
        }
    }

    #[tokio::test]
    async fn test_stop_without_text_is_empty_reply() {
        let fake = fake_gemini(StatusCode::OK, &finish_only_body("STOP"), Duration::ZERO).await;

        let reply = client_for(&fake)
            .generate(&GenerationRequest::new("Oi"))
            .await
            .unwrap();

        assert_eq!(reply.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_unrecognized_finish_reason_is_none() {
        let fake = fake_gemini(StatusCode::OK, &finish_only_body("MAX_TOKENS"), Duration::ZERO).await;
        let reply = client_for(&fake)
            .generate(&GenerationRequest::new("Oi"))
            .await
            .unwrap();
        assert!(reply.is_none());

        let fake = fake_gemini(StatusCode::OK, "{}", Duration::ZERO).await;
        let reply = client_for(&fake)
            .generate(&GenerationRequest::new("Oi"))
            .await
            .unwrap();
        assert!(reply.is_none());
    }

    #[tokio::test]
    async fn test_slow_service_times_out() {
        let fake = fake_gemini(StatusCode::OK, &text_body("tarde demais"), Duration::from_secs(3)).await;

        let err = client_for(&fake)
            .generate(&GenerationRequest::new("Oi"))
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::Timeout(_)));
        assert!(!err.to_string().contains("test-key-not-real"));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_connection_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = GeminiClient::new(
            &config_for(&format!("http://{addr}/v1beta")),
            Some(SecretString::from("test-key-not-real")),
        )
        .unwrap();

        let err = client.generate(&GenerationRequest::new("Oi")).await.unwrap_err();

        assert!(matches!(err, GenerationError::Connection(_)));
        assert!(!err.to_string().contains("test-key-not-real"));
    }
}
