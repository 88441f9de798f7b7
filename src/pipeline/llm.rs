//! Completion client: one chat-completion call per comparison.
//!
//! This module is intentionally thin — all prompt engineering lives in
//! [`crate::prompts`] so it can change without touching transport or
//! error-mapping logic here. A run makes exactly one blocking attempt:
//! no retry, no backoff. The one failure class that gets special
//! treatment is HTTP 413, because the per-document character truncation
//! bounds each text insertion but not the request as a whole, and "your
//! document is too big, split it" is far more actionable than the
//! provider's raw error body.

use crate::config::CompareConfig;
use crate::error::CompareError;
use crate::prompts::SYSTEM_PROMPT;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// HTTP client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct CompletionClient {
    http: reqwest::Client,
    config: CompareConfig,
}

/// A successful completion, with token usage when the provider reports it.
#[derive(Debug, Clone)]
pub struct Completion {
    /// `choices[0].message.content` from the response.
    pub content: String,
    /// Prompt tokens (0 when no usage object was returned).
    pub prompt_tokens: u64,
    /// Completion tokens (0 when no usage object was returned).
    pub completion_tokens: u64,
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

impl CompletionClient {
    /// Build a client from the run configuration.
    pub fn new(config: &CompareConfig) -> Result<Self, CompareError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api_timeout_secs))
            .build()
            .map_err(|e| CompareError::Internal(format!("HTTP client build failed: {e}")))?;

        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    /// Send the comparison prompt and return the report text.
    ///
    /// # Errors
    /// * [`CompareError::PayloadTooLarge`] on HTTP 413
    /// * [`CompareError::ApiError`] on any other non-2xx status
    /// * [`CompareError::ApiTimeout`] / [`CompareError::RequestFailed`] on
    ///   network-level failures
    /// * [`CompareError::UnexpectedResponse`] when the 2xx body does not
    ///   contain `choices[0].message.content`
    pub async fn complete(&self, user_prompt: &str) -> Result<Completion, CompareError> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let system = self
            .config
            .system_prompt
            .as_deref()
            .unwrap_or(SYSTEM_PROMPT);

        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: self.config.temperature,
        };

        debug!(
            "POST {} (model={}, prompt={} chars)",
            url,
            self.config.model,
            user_prompt.chars().count()
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.config.api_key.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CompareError::ApiTimeout {
                        secs: self.config.api_timeout_secs,
                    }
                } else {
                    CompareError::RequestFailed {
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if status.as_u16() == 413 {
            return Err(CompareError::PayloadTooLarge);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompareError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            CompareError::UnexpectedResponse {
                detail: format!("body is not valid completion JSON: {e}"),
            }
        })?;

        let (prompt_tokens, completion_tokens) = parsed
            .usage
            .as_ref()
            .map(|u| (u.prompt_tokens, u.completion_tokens))
            .unwrap_or((0, 0));

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| CompareError::UnexpectedResponse {
                detail: "missing choices[0].message.content".into(),
            })?;

        debug!(
            "Completion received: {} chars, {} in / {} out tokens",
            content.chars().count(),
            prompt_tokens,
            completion_tokens
        );

        Ok(Completion {
            content,
            prompt_tokens,
            completion_tokens,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiKey;

    fn config() -> CompareConfig {
        CompareConfig::builder(ApiKey::new("test-key").unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn client_builds_from_default_config() {
        assert!(CompletionClient::new(&config()).is_ok());
    }

    #[test]
    fn request_body_shape() {
        let body = ChatRequest {
            model: "llama3-70b-8192",
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "sys",
                },
                ChatMessage {
                    role: "user",
                    content: "usr",
                },
            ],
            temperature: 0.2,
        };
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["model"], "llama3-70b-8192");
        // f32 → f64 widening makes an exact compare against 0.2 fail.
        assert!((json["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "usr");
    }

    #[test]
    fn response_parses_content_and_usage() {
        let raw = r#"{
            "choices": [{"message": {"role": "assistant", "content": "report text"}}],
            "usage": {"prompt_tokens": 120, "completion_tokens": 45}
        }"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("report text")
        );
        assert_eq!(parsed.usage.as_ref().unwrap().prompt_tokens, 120);
    }

    #[test]
    fn response_without_usage_still_parses() {
        let raw = r#"{"choices": [{"message": {"content": "x"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert!(parsed.usage.is_none());
        assert_eq!(parsed.choices.len(), 1);
    }

    #[test]
    fn response_without_choices_parses_to_empty_vec() {
        // The shape error is raised by complete(), not by serde.
        let raw = r#"{"object": "error"}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert!(parsed.choices.is_empty());
    }
}
