//! Completion clients.
//!
//! A completion is one system+user prompt pair in, one text out. The HTTP
//! client issues a single blocking POST per call with the configured timeout;
//! there are no retries and no streaming, so the text arrives whole or the
//! call fails.

use crate::config::LlmConfig;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompletionError {
    /// Network failure, timeout, or non-success HTTP status.
    #[error("transport error: {0}")]
    Transport(String),
    /// Success status, but no `choices[0].message.content` string in the body.
    #[error("unexpected response shape: {0}")]
    ResponseShape(String),
    #[error("failed to build http client: {0}")]
    Client(String),
}

/// Anything that can turn a system+user prompt pair into completion text.
pub trait CompletionClient {
    fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, CompletionError>;
}

impl<C: CompletionClient + ?Sized> CompletionClient for &C {
    fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, CompletionError> {
        (**self).complete(system_prompt, user_prompt)
    }
}

impl<C: CompletionClient + ?Sized> CompletionClient for Box<C> {
    fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, CompletionError> {
        (**self).complete(system_prompt, user_prompt)
    }
}

// ============================================================================
// HTTP (OpenAI-compatible chat completions)
// ============================================================================

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

pub struct HttpCompletionClient {
    client: reqwest::blocking::Client,
    config: LlmConfig,
}

impl HttpCompletionClient {
    pub fn new(config: LlmConfig) -> Result<Self, CompletionError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| CompletionError::Client(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }
}

impl CompletionClient for HttpCompletionClient {
    fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, CompletionError> {
        let url = &self.config.endpoint;
        let body = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
        };

        tracing::debug!(
            model = %self.config.model,
            system_chars = system_prompt.chars().count(),
            user_chars = user_prompt.chars().count(),
            "requesting completion"
        );

        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .map_err(|e| CompletionError::Transport(format!("failed to reach {url}: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            return Err(CompletionError::Transport(format!("http error {status}: {text}")));
        }

        let data: Value = resp
            .json()
            .map_err(|e| CompletionError::ResponseShape(format!("body is not JSON: {e}")))?;

        let content = data
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                CompletionError::ResponseShape("missing choices[0].message.content".to_string())
            })?;

        tracing::debug!(chars = content.chars().count(), "completion received");
        Ok(content.to_string())
    }
}

// ============================================================================
// Scripted client for tests and offline runs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub system_prompt: String,
    pub user_prompt: String,
}

/// Replays scripted results in order, cycling when exhausted, and records
/// every prompt pair it receives.
pub struct MockCompletionClient {
    results: Vec<Result<String, CompletionError>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockCompletionClient {
    pub fn new(responses: Vec<String>) -> Self {
        Self::with_results(responses.into_iter().map(Ok).collect())
    }

    pub fn with_results(results: Vec<Result<String, CompletionError>>) -> Self {
        Self {
            results,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn always(response: &str) -> Self {
        Self::new(vec![response.to_string()])
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }
}

impl CompletionClient for MockCompletionClient {
    fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, CompletionError> {
        let mut calls = self.calls.lock();
        let idx = calls.len();
        calls.push(RecordedCall {
            system_prompt: system_prompt.to_string(),
            user_prompt: user_prompt.to_string(),
        });

        if self.results.is_empty() {
            return Ok(String::new());
        }
        self.results[idx % self.results.len()].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_cycles_and_records() {
        let client = MockCompletionClient::new(vec!["one".to_string(), "two".to_string()]);

        assert_eq!(client.complete("s1", "u1").unwrap(), "one");
        assert_eq!(client.complete("s2", "u2").unwrap(), "two");
        assert_eq!(client.complete("s3", "u3").unwrap(), "one");

        let calls = client.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1].system_prompt, "s2");
        assert_eq!(calls[1].user_prompt, "u2");
    }

    #[test]
    fn test_mock_replays_errors() {
        let client = MockCompletionClient::with_results(vec![Err(CompletionError::Transport(
            "timed out".to_string(),
        ))]);
        assert!(matches!(
            client.complete("s", "u"),
            Err(CompletionError::Transport(_))
        ));
    }

    #[test]
    fn test_request_body_shape() {
        let body = ChatRequest {
            model: "m",
            messages: [
                ChatMessage {
                    role: "system",
                    content: "sys",
                },
                ChatMessage {
                    role: "user",
                    content: "usr",
                },
            ],
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(
            v,
            serde_json::json!({
                "model": "m",
                "messages": [
                    {"role": "system", "content": "sys"},
                    {"role": "user", "content": "usr"}
                ]
            })
        );
    }
}
