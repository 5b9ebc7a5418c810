/// Chat-completions client for the hosted summarization service.
///
/// Speaks the OpenAI-compatible `/chat/completions` shape used by Groq.
/// Each query makes exactly one attempt — failures surface immediately and
/// the caller decides whether to ask again. The request timeout is the only
/// hardening applied here.
use std::time::Duration;

pub use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::warn;

const MAX_ERROR_BODY_BYTES: usize = 8 * 1024;

#[derive(Clone, Debug)]
pub struct CompletionClientConfig {
    /// Base URL of the OpenAI-compatible API, e.g. "https://api.groq.com/openai/v1".
    pub base_url: String,
    /// Bearer token sent with every request.
    pub api_key: String,
    /// Per-request timeout; expiry surfaces as a transport error.
    pub timeout: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned status {status}: {body}")]
    Upstream { status: StatusCode, body: String },
}

#[derive(Clone)]
pub struct CompletionClient {
    config: CompletionClientConfig,
    http: reqwest::Client,
}

impl CompletionClient {
    pub fn new(mut config: CompletionClientConfig) -> Result<Self, CompletionError> {
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .user_agent("debug-assistant")
            .build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &CompletionClientConfig {
        &self.config
    }

    /// POST the request to `{base_url}/chat/completions`. One attempt, no retry.
    pub async fn chat_completions(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, CompletionError> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .timeout(self.config.timeout)
            .json(request)
            .send()
            .await?;

        if resp.status().is_success() {
            return Ok(resp.json::<ChatCompletionResponse>().await?);
        }

        let status = resp.status();
        let body = read_limited_text(resp, MAX_ERROR_BODY_BYTES).await;
        Err(CompletionError::Upstream { status, body })
    }
}

async fn read_limited_text(resp: reqwest::Response, max_bytes: usize) -> String {
    match resp.bytes().await {
        Ok(mut b) => {
            if b.len() > max_bytes {
                b.truncate(max_bytes);
            }
            String::from_utf8_lossy(&b).to_string()
        }
        Err(e) => {
            warn!(error = %e, "failed to read upstream error body");
            "<failed to read error body>".to_string()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionChoice {
    pub message: ChatCompletionMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionMessage {
    pub content: Option<String>,
}
