//! Groq provider implementation.
//!
//! Talks to Groq's OpenAI-compatible `/chat/completions` endpoint. Works
//! unchanged against any other OpenAI-compatible endpoint via
//! `with_base_url`, which is what the test suites and self-hosted
//! deployments use.

use async_trait::async_trait;
use ironwren_core::error::ProviderError;
use ironwren_core::provider::{CompletionRequest, CompletionResponse, Provider, Usage};
use serde::Deserialize;
use tracing::{debug, warn};

const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// An LLM provider backed by the Groq API.
pub struct GroqProvider {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl GroqProvider {
    /// Create a provider pointing at the public Groq endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            name: "groq".into(),
            base_url: GROQ_BASE_URL.into(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Point the provider at a different OpenAI-compatible base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl Provider for GroqProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<CompletionResponse, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut body = serde_json::json!({
            "model": request.model,
            "messages": request.messages,
            "temperature": request.temperature,
        });

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        debug!(provider = %self.name, model = %request.model, "Sending completion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(e.to_string())
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(ProviderError::RateLimited {
                retry_after_secs: 5,
            });
        }

        if status == 401 || status == 403 {
            return Err(ProviderError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Provider returned error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ApiResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: 200,
                message: format!("Failed to parse response: {e}"),
            })?;

        let choice =
            api_response
                .choices
                .into_iter()
                .next()
                .ok_or_else(|| ProviderError::ApiError {
                    status_code: 200,
                    message: "No choices in response".into(),
                })?;

        let usage = api_response.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(CompletionResponse {
            content: choice.message.content.unwrap_or_default(),
            model: api_response.model,
            usage,
        })
    }

    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(response.status().is_success())
    }
}

// --- Groq API types (internal) ---

#[derive(Debug, Deserialize)]
struct ApiResponse {
    model: String,
    choices: Vec<ApiChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironwren_core::provider::ChatMessage;

    #[test]
    fn default_base_url_points_at_groq() {
        let provider = GroqProvider::new("gsk-test");
        assert_eq!(provider.name(), "groq");
        assert!(provider.base_url.contains("api.groq.com"));
    }

    #[test]
    fn base_url_override_strips_trailing_slash() {
        let provider = GroqProvider::new("gsk-test").with_base_url("http://localhost:9999/v1/");
        assert_eq!(provider.base_url, "http://localhost:9999/v1");
    }

    #[test]
    fn request_body_uses_lowercase_roles() {
        let request = CompletionRequest::new(
            "llama-3.1-8b-instant",
            vec![ChatMessage::system("rules"), ChatMessage::user("hi")],
        );
        let json = serde_json::to_string(&request.messages).unwrap();
        assert!(json.contains(r#""role":"system""#));
        assert!(json.contains(r#""role":"user""#));
    }

    #[test]
    fn parse_completion_response() {
        let data = r#"{
            "model": "llama-3.1-8b-instant",
            "choices": [
                {"message": {"role": "assistant", "content": "Hello there"}, "finish_reason": "stop"}
            ],
            "usage": {"prompt_tokens": 12, "completion_tokens": 4, "total_tokens": 16}
        }"#;
        let parsed: ApiResponse = serde_json::from_str(data).unwrap();
        assert_eq!(parsed.model, "llama-3.1-8b-instant");
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("Hello there")
        );
        assert_eq!(parsed.usage.unwrap().total_tokens, 16);
    }

    #[test]
    fn parse_response_without_usage() {
        let data = r#"{"model": "m", "choices": [{"message": {"content": "ok"}}]}"#;
        let parsed: ApiResponse = serde_json::from_str(data).unwrap();
        assert!(parsed.usage.is_none());
    }

    #[test]
    fn parse_response_with_null_content() {
        let data = r#"{"model": "m", "choices": [{"message": {"content": null}}]}"#;
        let parsed: ApiResponse = serde_json::from_str(data).unwrap();
        assert!(parsed.choices[0].message.content.is_none());
    }
}
