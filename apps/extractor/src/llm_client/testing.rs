//! In-memory backend that replays a fixed script of completions.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{CompletionBackend, LlmError};

/// Returns scripted results in order and records every prompt it receives.
/// Once the script runs out it answers with the fallback text, or
/// `EmptyChoices` when there is none.
pub struct ScriptedBackend {
    script: Mutex<VecDeque<Result<String, LlmError>>>,
    fallback: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new(script: Vec<Result<String, LlmError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Always answers with `text`.
    pub fn always(text: &str) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Some(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// `invalid` for the first `failures` calls, then `valid`.
    pub fn invalid_then_valid(failures: usize, invalid: &str, valid: &str) -> Self {
        let mut script: Vec<Result<String, LlmError>> =
            (0..failures).map(|_| Ok(invalid.to_string())).collect();
        script.push(Ok(valid.to_string()));
        Self::new(script)
    }

    pub fn failing() -> Self {
        Self::new(vec![Err(LlmError::Api {
            status: 500,
            message: "backend down".to_string(),
        })])
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.script.lock().unwrap().pop_front() {
            Some(result) => result,
            None => self.fallback.clone().ok_or(LlmError::EmptyChoices),
        }
    }
}
