//! OpenAI-compatible chat-completions backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::prompt::{ReviewPrompt, SYSTEM_PROMPT};
use super::{Completion, ReviewClient, ReviewError, TokenUsage};
use crate::config::{Config, ModelFamily};

pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    family: ModelFamily,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: TokenUsage,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.openai_base_url.clone(),
            api_key: config.openai_api_key.clone(),
            model: config.model.clone(),
            family: config.model_family(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    fn request_body<'a>(&'a self, prompt: &'a ReviewPrompt) -> ChatRequest<'a> {
        // Reasoning models reject `max_tokens`.
        let (max_tokens, max_completion_tokens) = match self.family {
            ModelFamily::Standard => (Some(self.max_tokens), None),
            ModelFamily::Reasoning => (None, Some(self.max_tokens)),
        };
        ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.text,
                },
            ],
            temperature: self.temperature,
            max_tokens,
            max_completion_tokens,
        }
    }
}

#[async_trait]
impl ReviewClient for OpenAiClient {
    fn model(&self) -> &str {
        &self.model
    }

    #[instrument(skip_all, fields(model = %self.model))]
    async fn complete(&self, prompt: &ReviewPrompt) -> Result<Completion, ReviewError> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!(prompt_bytes = prompt.text.len(), "posting chat completion");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReviewError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: ChatResponse = response.json().await?;
        debug!(choices = payload.choices.len(), total_tokens = payload.usage.total_tokens, "received completion");

        let text = payload
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(ReviewError::EmptyResponse)?;

        Ok(Completion {
            text,
            usage: payload.usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pr::tests::test_config;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn prompt() -> ReviewPrompt {
        ReviewPrompt {
            text: "Review the diff".to_string(),
        }
    }

    fn completion_body(content: &str) -> serde_json::Value {
        json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 100, "completion_tokens": 20, "total_tokens": 120 }
        })
    }

    #[tokio::test]
    async fn test_complete_sends_chat_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini",
                "max_tokens": 2000,
                "messages": [
                    { "role": "system", "content": SYSTEM_PROMPT },
                    { "role": "user", "content": "Review the diff" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Looks fine")))
            .expect(1)
            .mount(&server)
            .await;

        let config = test_config("http://unused", &server.uri());
        let completion = OpenAiClient::new(&config).complete(&prompt()).await.unwrap();

        assert_eq!(completion.text, "Looks fine");
        assert_eq!(completion.usage.total_tokens, 120);
    }

    #[test]
    fn test_reasoning_model_uses_max_completion_tokens() {
        let mut config = test_config("http://unused", "http://unused");
        config.model = "o3-mini".to_string();
        config.temperature = 1.0;
        let client = OpenAiClient::new(&config);
        let prompt = prompt();
        let body = serde_json::to_value(client.request_body(&prompt)).unwrap();
        assert_eq!(body["max_completion_tokens"], 2000);
        assert!(body.get("max_tokens").is_none());
        assert_eq!(body["temperature"], 1.0);
    }

    #[tokio::test]
    async fn test_complete_reports_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let config = test_config("http://unused", &server.uri());
        let err = OpenAiClient::new(&config).complete(&prompt()).await.unwrap_err();

        assert!(matches!(err, ReviewError::Status { status: 429, .. }));
        assert!(err.to_string().contains("rate limited"));
    }

    #[tokio::test]
    async fn test_complete_rejects_empty_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "role": "assistant", "content": null } }]
            })))
            .mount(&server)
            .await;

        let config = test_config("http://unused", &server.uri());
        let err = OpenAiClient::new(&config).complete(&prompt()).await.unwrap_err();

        assert!(matches!(err, ReviewError::EmptyResponse));
    }
}
