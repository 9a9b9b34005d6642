//! Gemini generateContent adapter
//!
//! Gemini gets the conversation as one narrative prompt: the persona's
//! system context followed by the full history as `Human:` / persona-name
//! lines, closed with an instruction to answer the latest user message.
//! Semantically the backend still sees everything the OpenAI adapter
//! sends, just flattened.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::conversation::{last_user_turn, Role, Turn};
use crate::personas::Persona;

use super::{classify_api_error, ProviderError};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const MODEL: &str = "gemini-2.0-flash";

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

pub struct GeminiProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl GeminiProvider {
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
            .ok_or_else(|| ProviderError::Configuration("Gemini API key is not configured".into()))
    }

    /// Generate a reply for the given history as the given persona.
    pub async fn generate(&self, turns: &[Turn], persona: &Persona) -> Result<String, ProviderError> {
        let api_key = self.api_key()?;
        let prompt = build_prompt(turns, persona);

        tracing::debug!(
            persona = persona.id,
            prompt_len = prompt.len(),
            "calling Gemini generateContent"
        );

        self.generate_content(api_key, prompt).await
    }

    /// Minimal liveness probe used by connection testing.
    pub async fn probe(&self) -> Result<(), ProviderError> {
        let api_key = self.api_key()?;
        self.generate_content(api_key, "Hello".into()).await.map(|_| ())
    }

    async fn generate_content(&self, api_key: &str, prompt: String) -> Result<String, ProviderError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, MODEL);

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&request)
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

        let parsed: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::Generation(format!("failed to parse Gemini response: {}", e))
        })?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| ProviderError::Generation("no candidates in Gemini response".into()))?;

        Ok(text.trim().to_string())
    }
}

/// Flatten persona context plus history into a single narrative prompt.
fn build_prompt(turns: &[Turn], persona: &Persona) -> String {
    let mut prompt = format!("{}\n\n", persona.system_context());

    for turn in turns {
        match turn.role {
            Role::User => prompt.push_str(&format!("Human: {}\n", turn.content)),
            Role::Assistant => prompt.push_str(&format!("{}: {}\n", persona.name, turn.content)),
        }
    }

    if let Some(last) = last_user_turn(turns) {
        prompt.push_str(&format!(
            "\nPlease respond as {} to: {}",
            persona.name, last.content
        ));
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::personas::PersonaRegistry;

    #[tokio::test]
    async fn test_missing_key_fails_fast() {
        let provider = GeminiProvider::new(None);
        let registry = PersonaRegistry::builtin();
        let persona = registry.get("einstein").unwrap();

        let err = provider
            .generate(&[Turn::user("hi")], &persona)
            .await
            .unwrap_err();
        match err {
            ProviderError::Configuration(msg) => assert!(msg.contains("API key")),
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_prompt_flattening() {
        let registry = PersonaRegistry::builtin();
        let persona = registry.get("einstein").unwrap();
        let turns = vec![
            Turn::user("What is light?"),
            Turn::assistant("A fascinating duality!"),
            Turn::user("Tell me more"),
        ];

        let prompt = build_prompt(&turns, &persona);
        assert!(prompt.starts_with(persona.system_prompt));
        assert!(prompt.contains("Human: What is light?\n"));
        assert!(prompt.contains("Albert Einstein: A fascinating duality!\n"));
        assert!(prompt.ends_with("Please respond as Albert Einstein to: Tell me more"));
    }

    #[test]
    fn test_prompt_without_user_turn_has_no_trailing_ask() {
        let registry = PersonaRegistry::builtin();
        let persona = registry.get("shakespeare").unwrap();

        let prompt = build_prompt(&[], &persona);
        assert!(!prompt.contains("Please respond as"));
    }

    #[test]
    fn test_response_parsing() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"Verily!"}],"role":"model"}}]}"#;
        let parsed: GenerateContentResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.candidates[0].content.parts[0].text, "Verily!");
    }
}
