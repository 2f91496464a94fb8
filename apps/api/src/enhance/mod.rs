//! Enhancement collaborator: rewrites a summary or an experience description via an
//! OpenAI-compatible chat-completions API (Groq or OpenAI).
//!
//! The draft model never depends on this client directly: it only sees the `Enhancer`
//! trait, and any failure here leaves the draft unchanged.
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod handlers;
pub mod prompts;

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 300;
const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    #[default]
    Groq,
    OpenAi,
}

impl AiProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            AiProvider::Groq => "groq",
            AiProvider::OpenAi => "openai",
        }
    }

    pub fn model(&self) -> &'static str {
        match self {
            AiProvider::Groq => "llama-3.3-70b-versatile",
            AiProvider::OpenAi => "gpt-3.5-turbo",
        }
    }

    fn api_url(&self) -> &'static str {
        match self {
            AiProvider::Groq => "https://api.groq.com/openai/v1/chat/completions",
            AiProvider::OpenAi => "https://api.openai.com/v1/chat/completions",
        }
    }
}

impl fmt::Display for AiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AiProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "groq" => Ok(AiProvider::Groq),
            "openai" => Ok(AiProvider::OpenAi),
            other => Err(format!("unknown AI provider '{other}' (expected groq or openai)")),
        }
    }
}

#[derive(Debug, Error)]
pub enum EnhanceError {
    #[error("No text provided")]
    EmptyInput,

    #[error("{0} API key is not configured")]
    NotConfigured(AiProvider),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("Provider returned no usable text")]
    EmptyContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnhanceKind {
    Summary,
    Bullet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnhanceRequest {
    pub kind: EnhanceKind,
    pub text: String,
    /// Target job title for summaries; unused for bullets.
    pub context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnhanceResponse {
    pub improved: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AiStatus {
    pub provider: AiProvider,
    pub model: &'static str,
    pub configured: bool,
}

/// Text enhancement backend. Swap implementations without touching the session or the
/// handlers.
#[async_trait]
pub trait Enhancer: Send + Sync {
    async fn enhance(&self, request: &EnhanceRequest) -> Result<EnhanceResponse, EnhanceError>;

    fn status(&self) -> AiStatus;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl ChatResponse {
    fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

#[derive(Clone)]
pub struct LlmEnhancer {
    client: Client,
    provider: AiProvider,
    api_key: Option<String>,
}

impl LlmEnhancer {
    pub fn new(provider: AiProvider, api_key: Option<String>) -> Result<Self, EnhanceError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            provider,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    /// One chat-completions call, retried on 429 and 5xx with exponential backoff.
    async fn call(&self, prompt: &str) -> Result<String, EnhanceError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(EnhanceError::NotConfigured(self.provider))?;

        let request_body = ChatRequest {
            model: self.provider.model(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let mut last_error: Option<EnhanceError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 500ms, 1s
                let delay = Duration::from_millis(500 * (1 << (attempt - 1)));
                warn!(
                    "{} call attempt {} failed, retrying after {}ms...",
                    self.provider,
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(self.provider.api_url())
                .bearer_auth(api_key)
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(EnhanceError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("{} API returned {}: {}", self.provider, status, body);
                last_error = Some(EnhanceError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(EnhanceError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let chat: ChatResponse = response.json().await?;
            let text = chat.text().ok_or(EnhanceError::EmptyContent)?;
            debug!("{} enhancement succeeded ({} chars)", self.provider, text.len());
            return Ok(text.to_string());
        }

        Err(last_error.unwrap_or(EnhanceError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl Enhancer for LlmEnhancer {
    async fn enhance(&self, request: &EnhanceRequest) -> Result<EnhanceResponse, EnhanceError> {
        let text = request.text.trim();
        if text.is_empty() {
            return Err(EnhanceError::EmptyInput);
        }
        let prompt = match request.kind {
            EnhanceKind::Summary => prompts::summary_prompt(text, request.context.as_deref()),
            EnhanceKind::Bullet => prompts::bullet_prompt(text),
        };
        let improved = self.call(&prompt).await?;
        Ok(EnhanceResponse { improved })
    }

    fn status(&self) -> AiStatus {
        AiStatus {
            provider: self.provider,
            model: self.provider.model(),
            configured: self.api_key.is_some(),
        }
    }
}
