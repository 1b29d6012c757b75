//! Hugging Face Inference API text-generation client.
//!
//! Wire format (`POST {api_base}/{model}`):
//!
//! ```text
//! { "inputs": "<prompt>",
//!   "parameters": { "max_new_tokens": 1024, "temperature": 0.5,
//!                   "return_full_text": false } }
//! ```
//!
//! The service answers `[{"generated_text": "..."}]` on success (some
//! deployments return a bare object) and `{"error": "..."}` with a non-2xx
//! status on failure.

use crate::error::{InferenceError, InsightsError};
use crate::pipeline::llm::{GenerationParams, TextGenerator};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Client bound to one model and one bearer credential.
pub struct HuggingFaceClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: RequestParameters,
}

#[derive(Debug, Serialize)]
struct RequestParameters {
    max_new_tokens: usize,
    temperature: f32,
    return_full_text: bool,
}

#[derive(Debug, Deserialize)]
struct GeneratedText {
    generated_text: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GenerationResponse {
    Many(Vec<GeneratedText>),
    One(GeneratedText),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl HuggingFaceClient {
    /// Build the client. Fails when the token cannot form a valid
    /// `Authorization` header or the TLS backend cannot initialise.
    pub fn new(api_base: &str, model: &str, token: &str) -> Result<Self, InsightsError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.trim())).map_err(|e| {
            InsightsError::ClientInit {
                detail: format!("credential is not a valid header value: {e}"),
            }
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("doc-insights/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| InsightsError::ClientInit {
                detail: e.to_string(),
            })?;

        Ok(Self {
            http,
            endpoint: endpoint_url(api_base, model),
            model: model.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TextGenerator for HuggingFaceClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, InferenceError> {
        let body = build_request(prompt, params);
        debug!("POST {}", self.endpoint);

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| InferenceError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| InferenceError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(InferenceError::Service {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        parse_generation_response(&text)
    }
}

/// Join base URL and model id with exactly one slash.
pub fn endpoint_url(api_base: &str, model: &str) -> String {
    format!(
        "{}/{}",
        api_base.trim_end_matches('/'),
        model.trim_start_matches('/')
    )
}

fn build_request<'a>(prompt: &'a str, params: &GenerationParams) -> GenerationRequest<'a> {
    GenerationRequest {
        inputs: prompt,
        parameters: RequestParameters {
            max_new_tokens: params.max_new_tokens,
            temperature: params.temperature,
            return_full_text: false,
        },
    }
}

/// Extract generated text from a successful response body.
pub fn parse_generation_response(body: &str) -> Result<String, InferenceError> {
    let parsed: GenerationResponse = serde_json::from_str(body).map_err(|e| {
        InferenceError::InvalidResponse(format!("{e}; body starts with {:?}", preview(body)))
    })?;

    match parsed {
        GenerationResponse::One(g) => Ok(g.generated_text),
        GenerationResponse::Many(list) => list
            .into_iter()
            .next()
            .map(|g| g.generated_text)
            .ok_or_else(|| InferenceError::InvalidResponse("empty generation list".into())),
    }
}

/// The `"error"` field of a failure body, or the body itself.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| preview(body).to_string())
}

fn preview(body: &str) -> &str {
    match body.char_indices().nth(200) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};

    /// Serve `app` on an ephemeral local port and return its base URL.
    async fn spawn_server(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/models")
    }

    #[test]
    fn endpoint_joins_cleanly() {
        assert_eq!(
            endpoint_url("https://host/models/", "org/model"),
            "https://host/models/org/model"
        );
        assert_eq!(endpoint_url("https://host/models", "/m"), "https://host/models/m");
    }

    #[test]
    fn request_body_shape() {
        let body = build_request("hi", &GenerationParams::default());
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "inputs": "hi",
                "parameters": {
                    "max_new_tokens": 1024,
                    "temperature": 0.5,
                    "return_full_text": false
                }
            })
        );
    }

    #[test]
    fn parses_list_and_object_forms() {
        assert_eq!(
            parse_generation_response(r###"[{"generated_text":"## Summary"}]"###).unwrap(),
            "## Summary"
        );
        assert_eq!(
            parse_generation_response(r#"{"generated_text":"ok"}"#).unwrap(),
            "ok"
        );
    }

    #[test]
    fn empty_list_is_invalid() {
        assert!(matches!(
            parse_generation_response("[]"),
            Err(InferenceError::InvalidResponse(_))
        ));
    }

    #[test]
    fn garbage_is_invalid() {
        assert!(matches!(
            parse_generation_response("<html>502</html>"),
            Err(InferenceError::InvalidResponse(_))
        ));
    }

    #[test]
    fn error_body_extracted() {
        assert_eq!(
            error_message(r#"{"error":"Model is currently loading"}"#),
            "Model is currently loading"
        );
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn invalid_token_fails_construction() {
        let err = HuggingFaceClient::new("https://host", "m", "bad\ntoken").err().unwrap();
        assert!(matches!(err, InsightsError::ClientInit { .. }));
    }

    #[test]
    fn valid_token_builds_client() {
        let client = HuggingFaceClient::new("https://host/models", "org/m", "hf_abc").unwrap();
        assert_eq!(client.endpoint(), "https://host/models/org/m");
        assert_eq!(client.model(), "org/m");
    }

    #[tokio::test]
    async fn generate_sends_bearer_and_reads_list_body() {
        let app = Router::new().route(
            "/models/{*model}",
            post(
                |headers: axum::http::HeaderMap, Json(body): Json<serde_json::Value>| async move {
                    let auth = headers
                        .get(AUTHORIZATION)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    let reply = format!(
                        "{auth}|{}|{}|{}",
                        body["inputs"].as_str().unwrap_or_default(),
                        body["parameters"]["max_new_tokens"],
                        body["parameters"]["return_full_text"]
                    );
                    Json(serde_json::json!([{ "generated_text": reply }]))
                },
            ),
        );
        let base = spawn_server(app).await;
        let client = HuggingFaceClient::new(&base, "org/m", "hf_abc").unwrap();

        let text = client
            .generate("prompt", &GenerationParams::default())
            .await
            .unwrap();
        assert_eq!(text, "Bearer hf_abc|prompt|1024|false");
    }

    #[tokio::test]
    async fn error_status_becomes_service_error() {
        let app = Router::new().route(
            "/models/{*model}",
            post(|| async {
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(serde_json::json!({ "error": "Model is currently loading" })),
                )
            }),
        );
        let base = spawn_server(app).await;
        let client = HuggingFaceClient::new(&base, "org/m", "hf_abc").unwrap();

        let err = client
            .generate("prompt", &GenerationParams::default())
            .await
            .unwrap_err();
        match err {
            InferenceError::Service { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "Model is currently loading");
            }
            other => panic!("expected Service error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client =
            HuggingFaceClient::new(&format!("http://{addr}/models"), "org/m", "hf_abc").unwrap();
        let err = client
            .generate("prompt", &GenerationParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, InferenceError::Transport(_)), "got {err:?}");
    }
}
