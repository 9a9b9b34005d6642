//! Application configuration

use std::env;

use serde::{Deserialize, Serialize};

use crate::providers::ProviderId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub default_provider: ProviderId,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let default_provider = env::var("DEFAULT_LLM_PROVIDER")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(ProviderId::OpenAi);

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            openai_api_key: env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
            gemini_api_key: env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),
            default_provider,
        })
    }

    /// Credential for a specific provider, if configured.
    pub fn credential(&self, provider: ProviderId) -> Option<&str> {
        match provider {
            ProviderId::OpenAi => self.openai_api_key.as_deref(),
            ProviderId::Gemini => self.gemini_api_key.as_deref(),
        }
    }

    /// Whether any provider has a credential. Running with none at all is
    /// supported; generation then degrades to canned demo replies.
    pub fn has_any_credentials(&self) -> bool {
        self.openai_api_key.is_some() || self.gemini_api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_config() -> Config {
        Config {
            host: "127.0.0.1".into(),
            port: 3000,
            openai_api_key: None,
            gemini_api_key: None,
            default_provider: ProviderId::OpenAi,
        }
    }

    #[test]
    fn test_no_credentials() {
        let config = bare_config();
        assert!(!config.has_any_credentials());
        assert!(config.credential(ProviderId::OpenAi).is_none());
        assert!(config.credential(ProviderId::Gemini).is_none());
    }

    #[test]
    fn test_credential_lookup() {
        let config = Config {
            gemini_api_key: Some("g-key".into()),
            ..bare_config()
        };
        assert!(config.has_any_credentials());
        assert_eq!(config.credential(ProviderId::Gemini), Some("g-key"));
        assert!(config.credential(ProviderId::OpenAi).is_none());
    }
}
