//! LLM provider integrations
//!
//! Both adapters share the same contract: full turn history plus persona
//! in, plain reply text out. Failures are classified into a closed error
//! taxonomy at the adapter boundary so callers switch on variants instead
//! of sniffing backend error strings.

mod gemini;
mod openai;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;

/// The closed set of known providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    OpenAi,
    Gemini,
}

impl ProviderId {
    pub const ALL: [ProviderId; 2] = [ProviderId::OpenAi, ProviderId::Gemini];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenAi => "openai",
            ProviderId::Gemini => "gemini",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(ProviderId::OpenAi),
            "gemini" => Ok(ProviderId::Gemini),
            _ => Err(()),
        }
    }
}

/// Provider failure taxonomy.
///
/// `Configuration` covers a missing or rejected credential, `Capacity`
/// covers quota and billing rejections, `Generation` is everything else
/// (network, parse, backend 5xx). The backend's native message is carried
/// unmodified inside the variant.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("capacity error: {0}")]
    Capacity(String),

    #[error("generation failed: {0}")]
    Generation(String),
}

impl ProviderError {
    /// User-safe message for the error category. Raw detail goes to the
    /// logs and the event `details` field only.
    pub fn user_message(&self) -> &'static str {
        match self {
            ProviderError::Configuration(_) => {
                "API key issue. Please check your configuration in the .env file."
            }
            ProviderError::Capacity(_) => {
                "API quota or billing issue. Please check your account."
            }
            ProviderError::Generation(_) => {
                "Sorry, I encountered an error while processing your message."
            }
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Generation(err.to_string())
    }
}

/// Classify a backend rejection from its HTTP status and error message.
pub(crate) fn classify_api_error(status: reqwest::StatusCode, message: String) -> ProviderError {
    let lowered = message.to_lowercase();

    if status == reqwest::StatusCode::UNAUTHORIZED
        || status == reqwest::StatusCode::FORBIDDEN
        || lowered.contains("api key")
        || lowered.contains("authentication")
    {
        ProviderError::Configuration(message)
    } else if status == reqwest::StatusCode::TOO_MANY_REQUESTS
        || lowered.contains("quota")
        || lowered.contains("billing")
    {
        ProviderError::Capacity(message)
    } else {
        ProviderError::Generation(message)
    }
}
