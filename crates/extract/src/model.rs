use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("language model request failed: {0}")]
    Transport(String),
    #[error("language model returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("language model response could not be read: {0}")]
    Decode(String),
}

/// A text-completion service used as a structured-extraction oracle.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    fn name(&self) -> &str;
    async fn complete(&self, prompt: &str) -> Result<String, ModelError>;
}

// ── Ollama ────────────────────────────────────────────────────────────────────

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "qwen2.5:7b";

#[derive(Debug, Clone)]
pub struct OllamaOptions {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
}

impl Default for OllamaOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.1,
            timeout: Duration::from_secs(120),
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Local Ollama server, non-streaming `/api/generate`.
pub struct OllamaClient {
    client: reqwest::Client,
    options: OllamaOptions,
}

impl OllamaClient {
    pub fn new(options: OllamaOptions) -> Result<Self, ModelError> {
        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|e| ModelError::Transport(e.to_string()))?;
        Ok(Self { client, options })
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.options.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LanguageModel for OllamaClient {
    fn name(&self) -> &str {
        &self.options.model
    }

    async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        let start = Instant::now();
        let body = GenerateRequest {
            model: &self.options.model,
            prompt,
            stream: false,
            options: GenerateOptions { temperature: self.options.temperature },
        };

        debug!(
            model = %self.options.model,
            prompt_chars = prompt.len(),
            "Sending prompt to Ollama"
        );

        let response = self
            .client
            .post(self.generate_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| ModelError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Status { status: status.as_u16(), body });
        }

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ModelError::Decode(e.to_string()))?;

        debug!(
            model = %self.options.model,
            response_chars = generated.response.len(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Ollama completed"
        );
        Ok(generated.response)
    }
}

// ── Canned model (tests and offline demos) ────────────────────────────────────

/// Always answers with the same text and remembers the last prompt it was given.
pub struct CannedModel {
    reply: String,
    last_prompt: Mutex<Option<String>>,
}

impl CannedModel {
    pub fn new(reply: impl Into<String>) -> Self {
        Self { reply: reply.into(), last_prompt: Mutex::new(None) }
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().ok().and_then(|p| p.clone())
    }
}

#[async_trait]
impl LanguageModel for CannedModel {
    fn name(&self) -> &str {
        "canned"
    }

    async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        if let Ok(mut last) = self.last_prompt.lock() {
            *last = Some(prompt.to_string());
        }
        Ok(self.reply.clone())
    }
}
