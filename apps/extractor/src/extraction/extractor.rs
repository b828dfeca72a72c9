//! Extraction loop: prompt, complete, parse, escalate.
//!
//! Attempts run strictly one after another. Only unparseable output is
//! retried; any backend error ends the loop immediately.
//!
//! The parse check is syntactic. Output that is valid JSON but ignores
//! `output_schema` still counts as success.

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::ExtractionProfile;
use crate::extraction::prompts::{build_prompt, build_retry_prompt};
use crate::llm_client::{CompletionBackend, LlmError};

/// Hard ceiling on backend calls per request.
pub const MAX_ATTEMPTS: u32 = 10;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Error communicating with LLM server: {0}")]
    Backend(#[from] LlmError),

    #[error("Failed to obtain valid JSON after {attempts} attempts")]
    Exhausted { last_output: String, attempts: u32 },
}

/// A successfully parsed backend output.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub value: Value,
    pub attempts: u32,
}

/// One round trip through the backend. Lives only inside a single loop run.
#[derive(Debug)]
pub struct AttemptRecord {
    pub number: u32,
    pub prompt: String,
    pub raw_output: String,
    pub parsed: Option<Value>,
}

impl AttemptRecord {
    fn new(number: u32, prompt: String, raw_output: String) -> Self {
        let parsed = serde_json::from_str::<Value>(&raw_output).ok();
        Self {
            number,
            prompt,
            raw_output,
            parsed,
        }
    }
}

/// Runs the bounded retry loop for one input text.
pub async fn run_extraction(
    backend: &dyn CompletionBackend,
    profile: &ExtractionProfile,
    input_text: &str,
) -> Result<Extraction, ExtractionError> {
    let base_prompt = build_prompt(
        &profile.instruction,
        &profile.template,
        &profile.output_schema,
        input_text,
    );

    let mut previous: Option<AttemptRecord> = None;

    for number in 1..=MAX_ATTEMPTS {
        let prompt = match &previous {
            None => base_prompt.clone(),
            Some(last) => build_retry_prompt(&base_prompt, &last.raw_output, number, MAX_ATTEMPTS),
        };

        let raw_output = backend.complete(&prompt).await?;
        let mut record = AttemptRecord::new(number, prompt, raw_output);
        debug!(
            "Attempt {}/{}: prompt_chars={}, output_chars={}",
            record.number,
            MAX_ATTEMPTS,
            record.prompt.len(),
            record.raw_output.len()
        );

        if let Some(value) = record.parsed.take() {
            info!("Extraction succeeded on attempt {}/{}", number, MAX_ATTEMPTS);
            return Ok(Extraction {
                value,
                attempts: number,
            });
        }

        warn!("Attempt {}/{} produced invalid JSON", number, MAX_ATTEMPTS);
        previous = Some(record);
    }

    Err(ExtractionError::Exhausted {
        last_output: previous.map(|r| r.raw_output).unwrap_or_default(),
        attempts: MAX_ATTEMPTS,
    })
}
