//! HTTP API routes
//!
//! Stateless, informational surface next to the WebSocket channel:
//! persona listing, provider selection, and provider liveness.

use std::collections::HashMap;

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::personas::PersonaCard;
use crate::providers::ProviderId;
use crate::AppState;

#[derive(Debug, Serialize)]
struct ProviderResponse {
    provider: ProviderId,
}

#[derive(Debug, Deserialize)]
struct SetProviderRequest {
    provider: String,
}

#[derive(Debug, Serialize)]
struct SetProviderResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    provider: Option<ProviderId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    connections: HashMap<ProviderId, bool>,
    #[serde(rename = "currentProvider")]
    current_provider: ProviderId,
}

#[derive(Debug, Serialize)]
struct DebugResponse {
    personas: Vec<&'static str>,
    #[serde(rename = "llmProvider")]
    llm_provider: ProviderId,
    timestamp: DateTime<Utc>,
}

async fn list_personas(State(state): State<AppState>) -> Json<Vec<PersonaCard>> {
    Json(state.personas.list())
}

async fn get_provider(State(state): State<AppState>) -> Json<ProviderResponse> {
    Json(ProviderResponse {
        provider: state.orchestrator.provider(),
    })
}

async fn set_provider(
    State(state): State<AppState>,
    Json(request): Json<SetProviderRequest>,
) -> (StatusCode, Json<SetProviderResponse>) {
    if state.orchestrator.set_provider(&request.provider) {
        (
            StatusCode::OK,
            Json(SetProviderResponse {
                success: true,
                provider: Some(state.orchestrator.provider()),
                error: None,
            }),
        )
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(SetProviderResponse {
                success: false,
                provider: None,
                error: Some("Invalid provider"),
            }),
        )
    }
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let connections = state.orchestrator.test_connections().await;
    Json(HealthResponse {
        status: "ok",
        connections,
        current_provider: state.orchestrator.provider(),
    })
}

async fn debug_info(State(state): State<AppState>) -> Json<DebugResponse> {
    Json(DebugResponse {
        personas: state.personas.ids(),
        llm_provider: state.orchestrator.provider(),
        timestamp: Utc::now(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/personas", get(list_personas))
        .route("/api/llm-provider", get(get_provider).post(set_provider))
        .route("/api/health", get(health))
        .route("/api/debug", get(debug_info))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_shape() {
        let mut connections = HashMap::new();
        connections.insert(ProviderId::OpenAi, true);
        connections.insert(ProviderId::Gemini, false);

        let response = HealthResponse {
            status: "ok",
            connections,
            current_provider: ProviderId::OpenAi,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains(r#""status":"ok""#));
        assert!(json.contains(r#""openai":true"#));
        assert!(json.contains(r#""gemini":false"#));
        assert!(json.contains(r#""currentProvider":"openai""#));
    }

    #[test]
    fn test_set_provider_error_shape() {
        let response = SetProviderResponse {
            success: false,
            provider: None,
            error: Some("Invalid provider"),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"success":false,"error":"Invalid provider"}"#);
    }
}
