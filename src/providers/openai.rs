//! OpenAI chat-completions adapter
//!
//! Sends the persona's system context plus the structured turn history to
//! the chat completions endpoint and returns the first choice's text.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::conversation::{Role, Turn};
use crate::personas::Persona;

use super::{classify_api_error, ProviderError};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const MODEL: &str = "gpt-3.5-turbo";

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: &'static str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

impl From<&Turn> for ChatMessage {
    fn from(turn: &Turn) -> Self {
        Self {
            role: match turn.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            },
            content: turn.content.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

pub struct OpenAiProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenAiProvider {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: Option<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key,
        }
    }

    fn api_key(&self) -> Result<&str, ProviderError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ProviderError::Configuration("OpenAI API key is not configured".into()))
    }

    /// Generate a reply for the given history as the given persona.
    pub async fn generate(&self, turns: &[Turn], persona: &Persona) -> Result<String, ProviderError> {
        let api_key = self.api_key()?;

        let mut messages = vec![ChatMessage {
            role: "system",
            content: persona.system_context(),
        }];
        messages.extend(turns.iter().map(ChatMessage::from));

        tracing::debug!(
            persona = persona.id,
            messages = messages.len(),
            "calling OpenAI chat completions"
        );

        let request = ChatCompletionRequest {
            model: MODEL,
            messages,
            temperature: 0.8,
            max_tokens: 1000,
        };

        self.complete(api_key, &request).await
    }

    /// Minimal liveness probe used by connection testing.
    pub async fn probe(&self) -> Result<(), ProviderError> {
        let api_key = self.api_key()?;

        let request = ChatCompletionRequest {
            model: MODEL,
            messages: vec![ChatMessage {
                role: "user",
                content: "Hello".into(),
            }],
            temperature: 0.0,
            max_tokens: 5,
        };

        self.complete(api_key, &request).await.map(|_| ())
    }

    async fn complete(
        &self,
        api_key: &str,
        request: &ChatCompletionRequest,
    ) -> Result<String, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(err) => err.error.message,
                Err(_) => format!("HTTP {}: {}", status, body),
            };
            return Err(classify_api_error(status, message));
        }

        let completion: ChatCompletionResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::Generation(format!("failed to parse OpenAI response: {}", e))
        })?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ProviderError::Generation("no choices in OpenAI response".into()))?;

        Ok(content.trim().to_string())
    }
}
