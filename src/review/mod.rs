pub mod openai;
pub mod prompt;

pub use openai::OpenAiClient;
pub use prompt::{build_prompt, ReviewPrompt};

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::console;

/// Prefix of the body written in place of a review when the request fails.
pub const FAILURE_MARKER: &str = "⚠️ Failed to complete AI review";

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("response did not contain review text")]
    EmptyResponse,
}

/// Token counters reported by the completion API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

/// A successful completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub usage: TokenUsage,
}

/// A chat-completion backend able to review a rendered prompt.
#[async_trait]
pub trait ReviewClient: Send + Sync {
    /// Model name the backend sends requests to.
    fn model(&self) -> &str;

    /// Submit the prompt with the fixed system instruction.
    async fn complete(&self, prompt: &ReviewPrompt) -> Result<Completion, ReviewError>;
}

/// Result of the review stage. Always produced, so the report can be written
/// even when the model could not be reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewOutcome {
    Completed { text: String, usage: TokenUsage },
    Failed { message: String },
}

impl ReviewOutcome {
    /// Markdown body to embed in the report.
    pub fn body(&self) -> String {
        match self {
            ReviewOutcome::Completed { text, .. } => text.clone(),
            ReviewOutcome::Failed { message } => format!("{FAILURE_MARKER}: {message}"),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ReviewOutcome::Failed { .. })
    }
}

/// Ask the backend for a review. Errors are logged and folded into
/// [`ReviewOutcome::Failed`]; this never returns an error.
#[instrument(skip_all, fields(model = client.model()))]
pub async fn request_review(client: &dyn ReviewClient, prompt: &ReviewPrompt) -> ReviewOutcome {
    console::step("🤖", "Sending to OpenAI for review...");
    match client.complete(prompt).await {
        Ok(Completion { text, usage }) => {
            info!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "review completed"
            );
            console::success(&format!(
                "Review completed ({} tokens used)",
                usage.total_tokens
            ));
            ReviewOutcome::Completed { text, usage }
        }
        Err(err) => {
            error!(error = %err, "review request failed");
            console::failure(&format!("OpenAI API error: {err}"));
            ReviewOutcome::Failed {
                message: err.to_string(),
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Backend returning a fixed reply, or failing when `reply` is `None`.
    pub struct StubClient {
        pub reply: Option<String>,
    }

    #[async_trait]
    impl ReviewClient for StubClient {
        fn model(&self) -> &str {
            "stub-model"
        }

        async fn complete(&self, _prompt: &ReviewPrompt) -> Result<Completion, ReviewError> {
            match &self.reply {
                Some(text) => Ok(Completion {
                    text: text.clone(),
                    usage: TokenUsage {
                        prompt_tokens: 10,
                        completion_tokens: 2,
                        total_tokens: 12,
                    },
                }),
                None => Err(ReviewError::Status {
                    status: 503,
                    body: "upstream unavailable".to_string(),
                }),
            }
        }
    }

    fn prompt() -> ReviewPrompt {
        ReviewPrompt {
            text: "review this".to_string(),
        }
    }

    #[tokio::test]
    async fn test_request_review_success() {
        let client = StubClient {
            reply: Some("LGTM".to_string()),
        };
        let outcome = request_review(&client, &prompt()).await;
        assert!(!outcome.is_failed());
        assert_eq!(outcome.body(), "LGTM");
    }

    #[tokio::test]
    async fn test_request_review_failure_is_contained() {
        let client = StubClient { reply: None };
        let outcome = request_review(&client, &prompt()).await;
        assert!(outcome.is_failed());
        let body = outcome.body();
        assert!(body.starts_with(FAILURE_MARKER));
        assert!(body.contains("upstream unavailable"));
    }
}
