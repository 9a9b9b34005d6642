//! LLM orchestration
//!
//! One orchestrator instance per process owns the provider selection, the
//! adapters, and the no-credential fallback policy. Callers reach it
//! through shared application state rather than any ambient global.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::config::Config;
use crate::conversation::{last_user_turn, Turn};
use crate::personas::Persona;
use crate::providers::{GeminiProvider, OpenAiProvider, ProviderError, ProviderId};

use super::fallback::FallbackResponder;

pub struct LlmOrchestrator {
    config: Config,
    openai: OpenAiProvider,
    gemini: GeminiProvider,
    current: RwLock<ProviderId>,
    fallback: FallbackResponder,
}

impl LlmOrchestrator {
    pub fn new(config: Config) -> Self {
        let openai = OpenAiProvider::new(config.openai_api_key.clone());
        let gemini = GeminiProvider::new(config.gemini_api_key.clone());
        let current = RwLock::new(config.default_provider);

        Self {
            config,
            openai,
            gemini,
            current,
            fallback: FallbackResponder::new(),
        }
    }

    /// Currently selected provider. Single atomic read.
    pub fn provider(&self) -> ProviderId {
        *self.current.read().expect("provider selection lock poisoned")
    }

    /// Switch providers. Unknown names are rejected with no state change.
    pub fn set_provider(&self, name: &str) -> bool {
        match name.parse::<ProviderId>() {
            Ok(id) => {
                *self.current.write().expect("provider selection lock poisoned") = id;
                tracing::info!(provider = %id, "LLM provider switched");
                true
            }
            Err(()) => {
                tracing::warn!(provider = name, "rejected unknown LLM provider");
                false
            }
        }
    }

    /// Generate a reply for the turn history as the persona.
    ///
    /// Exactly one attempt against the selected provider; no retries. If no
    /// provider credential is configured anywhere, every failure (which can
    /// then only be the adapter's own missing-key check) degrades to a
    /// canned demo reply. With at least one credential present, failures
    /// propagate typed: a rejected credential is a hard configuration
    /// error, not a trigger for demo mode.
    pub async fn generate(&self, turns: &[Turn], persona: &Persona) -> Result<String, ProviderError> {
        let provider = self.provider();
        tracing::debug!(
            provider = %provider,
            persona = persona.id,
            history_len = turns.len(),
            "dispatching generation"
        );

        let result = match provider {
            ProviderId::OpenAi => self.openai.generate(turns, persona).await,
            ProviderId::Gemini => self.gemini.generate(turns, persona).await,
        };

        match result {
            Ok(reply) => {
                tracing::debug!(provider = %provider, reply_len = reply.len(), "generation succeeded");
                Ok(reply)
            }
            Err(err) if !self.config.has_any_credentials() => {
                tracing::debug!(provider = %provider, error = %err, "no credentials configured, degrading to fallback");
                let last_text = last_user_turn(turns).map(|t| t.content.as_str()).unwrap_or("");
                Ok(self.fallback.respond(last_text, persona))
            }
            Err(err) => {
                tracing::error!(provider = %provider, error = %err, "generation failed");
                Err(err)
            }
        }
    }

    /// Probe every provider that has a credential; providers without one
    /// are reported unavailable without a call. Liveness reporting only.
    pub async fn test_connections(&self) -> HashMap<ProviderId, bool> {
        let mut results = HashMap::new();

        for provider in ProviderId::ALL {
            let reachable = if self.config.credential(provider).is_none() {
                tracing::debug!(provider = %provider, "no API key, skipping connection test");
                false
            } else {
                let probe = match provider {
                    ProviderId::OpenAi => self.openai.probe().await,
                    ProviderId::Gemini => self.gemini.probe().await,
                };
                match probe {
                    Ok(()) => true,
                    Err(err) => {
                        tracing::warn!(provider = %provider, error = %err, "connection test failed");
                        false
                    }
                }
            };
            results.insert(provider, reachable);
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fallback::DEMO_DISCLAIMER;
    use crate::personas::PersonaRegistry;

    fn config_with(openai: Option<&str>, gemini: Option<&str>) -> Config {
        Config {
            host: "127.0.0.1".into(),
            port: 3000,
            openai_api_key: openai.map(String::from),
            gemini_api_key: gemini.map(String::from),
            default_provider: ProviderId::OpenAi,
        }
    }

    #[test]
    fn test_set_provider() {
        let orchestrator = LlmOrchestrator::new(config_with(None, None));
        assert_eq!(orchestrator.provider(), ProviderId::OpenAi);

        assert!(orchestrator.set_provider("gemini"));
        assert_eq!(orchestrator.provider(), ProviderId::Gemini);

        assert!(!orchestrator.set_provider("claude"));
        assert_eq!(orchestrator.provider(), ProviderId::Gemini);

        assert!(!orchestrator.set_provider(""));
        assert_eq!(orchestrator.provider(), ProviderId::Gemini);
    }

    #[tokio::test]
    async fn test_no_credentials_always_falls_back() {
        let orchestrator = LlmOrchestrator::new(config_with(None, None));
        let registry = PersonaRegistry::builtin();
        let persona = registry.get("shakespeare").unwrap();

        for provider in ["openai", "gemini"] {
            assert!(orchestrator.set_provider(provider));
            let reply = orchestrator
                .generate(&[Turn::user("hello")], &persona)
                .await
                .unwrap();
            assert!(reply.ends_with(DEMO_DISCLAIMER));
        }
    }

    #[tokio::test]
    async fn test_missing_key_is_hard_error_when_other_credential_exists() {
        // Gemini selected with no key, but OpenAI has one: this is a setup
        // defect, never demo mode. No network call happens (the adapter
        // fails fast), so the error is Configuration.
        let orchestrator = LlmOrchestrator::new(config_with(Some("sk-test"), None));
        orchestrator.set_provider("gemini");
        let registry = PersonaRegistry::builtin();
        let persona = registry.get("einstein").unwrap();

        let err = orchestrator
            .generate(&[Turn::user("hi")], &persona)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_connection_report_skips_unconfigured() {
        let orchestrator = LlmOrchestrator::new(config_with(None, None));
        let report = orchestrator.test_connections().await;

        assert_eq!(report.len(), ProviderId::ALL.len());
        assert_eq!(report[&ProviderId::OpenAi], false);
        assert_eq!(report[&ProviderId::Gemini], false);
    }
}
