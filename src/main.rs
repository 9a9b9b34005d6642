//! Cameo - persona chat relay
//!
//! Browser clients hold a WebSocket session with a chosen persona; user
//! turns are relayed to the selected LLM provider (OpenAI or Gemini) and
//! the reply streamed back. With no API keys configured the server still
//! runs, answering with canned demo replies.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod conversation;
mod core;
mod personas;
mod providers;
mod routes;
mod ws;

use crate::core::LlmOrchestrator;
use config::Config;
use personas::PersonaRegistry;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<LlmOrchestrator>,
    pub personas: Arc<PersonaRegistry>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cameo=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    let personas = Arc::new(PersonaRegistry::builtin());
    tracing::info!("loaded {} personas: {:?}", personas.len(), personas.ids());

    if !config.has_any_credentials() {
        tracing::warn!("no provider API keys configured, running in demo fallback mode");
    }

    let orchestrator = Arc::new(LlmOrchestrator::new(config.clone()));

    // Startup liveness report; generation never waits on this.
    {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move {
            let connections = orchestrator.test_connections().await;
            for (provider, ok) in &connections {
                tracing::info!(provider = %provider, reachable = *ok, "LLM connection status");
            }
            tracing::info!(current = %orchestrator.provider(), "active LLM provider");
        });
    }

    let state = AppState {
        orchestrator,
        personas,
    };

    let app = Router::new()
        .merge(routes::router())
        .route("/ws", get(ws::websocket_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!("cameo running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
