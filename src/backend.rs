//! Generation backend abstraction.
//!
//! One capability — `generate(prompt) -> text` — behind two adapters: a
//! chat-completion endpoint returning structured choices, and a raw-text HTTP
//! endpoint wrapped in an explicit retry policy. Network I/O is the only side
//! effect; adapters never touch local state.

use crate::config::BackendConfig;
use crate::error::{BackendError, PipelineError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Sampling parameters for the chat-completion adapter.
const CANDIDATE_COUNT: u8 = 5;
const SAMPLING_TEMPERATURE: f32 = 0.9;
const SAMPLING_TOP_P: f32 = 1.0;
const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

fn build_backend_http_client() -> Result<Client, BackendError> {
    Client::builder()
        .connect_timeout(HTTP_CONNECT_TIMEOUT)
        .timeout(HTTP_REQUEST_TIMEOUT)
        .build()
        .map_err(|e| BackendError::RequestFailed(format!("Failed to create HTTP client: {}", e)))
}

/// Generation backend trait.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Obtain raw model output for a prompt.
    async fn generate(&self, prompt: &str) -> Result<String, BackendError>;

    /// Get the backend name.
    fn name(&self) -> &str;
}

/// Explicit retry policy: max attempts with a fixed inter-attempt delay.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Run `op` until it succeeds or attempts are exhausted.
    ///
    /// Every failure is retryable under this policy; exhaustion surfaces the
    /// last error. Exhaustion is fatal for the query, not for the run.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, BackendError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, BackendError>>,
    {
        let mut attempt = 1usize;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.max_attempts => {
                    warn!(attempt, error = %err, "backend attempt failed, retrying");
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    return Err(BackendError::RetriesExhausted {
                        attempts: attempt,
                        last: err.to_string(),
                    });
                }
            }
        }
    }
}

// Chat-completion request/response structures (OpenAI-compatible wire format)
#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    response_format: ResponseFormatSpec,
    messages: Vec<ChatRequestMessage>,
    top_p: f32,
    n: u8,
    temperature: f32,
}

#[derive(Serialize)]
struct ResponseFormatSpec {
    #[serde(rename = "type")]
    format: &'static str,
}

#[derive(Serialize)]
struct ChatRequestMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Structured-completion adapter.
///
/// Requests JSON-object output with five parallel candidates and returns the
/// first candidate's content verbatim.
pub struct ChatCompletionBackend {
    client: Client,
    model: String,
    api_key: String,
    base_url: String,
}

impl ChatCompletionBackend {
    pub fn new(model: String, api_key: String, base_url: String) -> Result<Self, BackendError> {
        let client = build_backend_http_client()?;
        Ok(Self {
            client,
            model,
            api_key,
            base_url,
        })
    }
}

#[async_trait]
impl GenerationBackend for ChatCompletionBackend {
    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            response_format: ResponseFormatSpec {
                format: "json_object",
            },
            messages: vec![
                ChatRequestMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatRequestMessage {
                    role: "user",
                    content: prompt.to_string(),
                },
            ],
            top_p: SAMPLING_TOP_P,
            n: CANDIDATE_COUNT,
            temperature: SAMPLING_TEMPERATURE,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| BackendError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(BackendError::BadStatus { status, body });
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| BackendError::MalformedPayload(format!("Failed to parse response: {}", e)))?;

        let choice = completion
            .choices
            .first()
            .ok_or_else(|| BackendError::MalformedPayload("No choices in response".to_string()))?;

        Ok(choice.message.content.clone())
    }

    fn name(&self) -> &str {
        "chat"
    }
}

#[derive(Serialize)]
struct RawTextRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct RawTextResponse {
    response: String,
    #[serde(default)]
    time: f64,
}

/// Raw-text adapter for a locally served model.
///
/// POSTs `{"text": prompt}` to `{base_url}/chat` and expects
/// `{"response": string, "time": float}`; the whole call is retried under the
/// configured policy on any transport or non-2xx failure.
pub struct RawTextBackend {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl RawTextBackend {
    pub fn new(base_url: String, retry: RetryPolicy) -> Result<Self, BackendError> {
        let client = build_backend_http_client()?;
        Ok(Self {
            client,
            base_url,
            retry,
        })
    }

    async fn attempt(&self, prompt: &str) -> Result<String, BackendError> {
        let url = format!("{}/chat", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&RawTextRequest { text: prompt })
            .send()
            .await
            .map_err(|e| BackendError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(BackendError::BadStatus { status, body });
        }

        let payload: RawTextResponse = response
            .json()
            .await
            .map_err(|e| BackendError::MalformedPayload(format!("Failed to parse response: {}", e)))?;

        debug!(elapsed = payload.time, "raw-text backend responded");
        Ok(payload.response)
    }
}

#[async_trait]
impl GenerationBackend for RawTextBackend {
    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        self.retry.run(|| self.attempt(prompt)).await
    }

    fn name(&self) -> &str {
        "raw"
    }
}

/// Build a backend from configuration.
pub fn build_backend(config: &BackendConfig) -> Result<Box<dyn GenerationBackend>, PipelineError> {
    match config.kind {
        crate::config::BackendKind::Chat => {
            let api_key = config.resolve_api_key().ok_or_else(|| {
                PipelineError::Config(
                    "chat backend requires an API key (config `api_key` or TAILGEN_API_KEY)"
                        .to_string(),
                )
            })?;
            let backend =
                ChatCompletionBackend::new(config.model.clone(), api_key, config.base_url.clone())
                    .map_err(PipelineError::Backend)?;
            Ok(Box::new(backend))
        }
        crate::config::BackendKind::Raw => {
            let backend = RawTextBackend::new(config.base_url.clone(), config.retry_policy())
                .map_err(PipelineError::Backend)?;
            Ok(Box::new(backend))
        }
    }
}

// Mock backend for testing
#[cfg(test)]
pub struct MockBackend {
    responses: std::sync::Mutex<std::collections::VecDeque<Result<String, String>>>,
}

#[cfg(test)]
impl MockBackend {
    pub fn new<I: IntoIterator<Item = Result<String, String>>>(responses: I) -> Self {
        Self {
            responses: std::sync::Mutex::new(responses.into_iter().collect()),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl GenerationBackend for MockBackend {
    async fn generate(&self, _prompt: &str) -> Result<String, BackendError> {
        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(BackendError::RequestFailed(message)),
            None => Ok(r#"{"tails": ["t1", "t2", "t3", "t4", "t5"]}"#.to_string()),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
