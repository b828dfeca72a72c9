// LLM Client: the single point of entry for completion calls to the llama server.
//
// One POST per call, no retries here. Retry policy lives in the extraction
// loop and only covers unparseable output, never transport failures.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::ModelParams;

#[cfg(test)]
pub mod testing;

const COMPLETIONS_PATH: &str = "/v1/completions";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
/// Stop generation at a code fence or a blank line.
pub const STOP_SEQUENCES: [&str; 2] = ["```", "\n\n"];

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("malformed completion response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("completion response contained no text choice")]
    EmptyChoices,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    stop: [&'a str; 2],
}

#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub text: Option<String>,
}

impl CompletionResponse {
    /// Text of the first choice, if the backend produced one.
    pub fn first_text(&self) -> Option<&str> {
        self.choices.first().and_then(|c| c.text.as_deref())
    }
}

/// Anything that can turn a prompt into generated text.
/// `AppState` carries an `Arc<dyn CompletionBackend>`.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Client for an OpenAI-style `/v1/completions` endpoint (llama.cpp server).
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    endpoint: String,
    params: ModelParams,
}

impl LlmClient {
    pub fn new(base_url: &str, params: ModelParams) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}{COMPLETIONS_PATH}", base_url.trim_end_matches('/')),
            params,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CompletionBackend for LlmClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let request_body = CompletionRequest {
            prompt,
            max_tokens: self.params.max_tokens,
            temperature: self.params.temperature,
            top_p: self.params.top_p,
            stop: STOP_SEQUENCES,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!(
            "Completion call returned {}: prompt_chars={}, body_bytes={}",
            status,
            prompt.len(),
            body.len()
        );

        if !status.is_success() {
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let completion: CompletionResponse = serde_json::from_str(&body)?;
        let text = completion.first_text().ok_or(LlmError::EmptyChoices)?;

        Ok(text.trim().to_string())
    }
}
