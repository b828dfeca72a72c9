use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

const DEFAULT_LLAMA_SERVER_URL: &str = "http://localhost:8000";
const DEFAULT_SETTINGS_PATH: &str = "config.json";

/// Application configuration loaded from environment variables plus the
/// JSON settings file they point at. Built once at startup, read-only after.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub settings_path: PathBuf,
    pub extractor: ExtractorSettings,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let settings_path = PathBuf::from(
            std::env::var("EXTRACTOR_CONFIG").unwrap_or_else(|_| DEFAULT_SETTINGS_PATH.to_string()),
        );
        let extractor = ExtractorSettings::from_file(&settings_path)?;

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            settings_path,
            extractor,
        })
    }
}

/// Contents of the JSON settings file.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractorSettings {
    #[serde(default = "default_llama_server_url")]
    pub llama_server_url: String,
    pub model: ModelParams,
    pub extraction: ExtractionProfile,
}

/// Generation parameters forwarded verbatim on every completion request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelParams {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

/// The instruction/template/schema bundle used to build prompts.
/// `output_schema` is echoed into the prompt only; it is never enforced.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionProfile {
    pub instruction: String,
    pub template: String,
    pub output_schema: Value,
}

fn default_llama_server_url() -> String {
    DEFAULT_LLAMA_SERVER_URL.to_string()
}

impl ExtractorSettings {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        Self::from_json(&raw)
            .with_context(|| format!("failed to parse settings file {}", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("settings must be a JSON object with model and extraction sections")
    }
}
