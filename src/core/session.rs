//! Per-connection session state machine
//!
//! A session is exclusively owned by its connection: Idle until a persona
//! is joined, Active while history accumulates, back to Idle on clear,
//! persona switch, or disconnect. Events flow out through the connection's
//! channel; the transport layer serializes them.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::conversation::Turn;
use crate::personas::{Persona, PersonaCard, PersonaRegistry};
use crate::ws::message::{OutboundMessage, ServerEvent};

use super::llm::LlmOrchestrator;

/// Replies are held back briefly so they never feel instantaneous.
const REPLY_DELAY: Duration = Duration::from_millis(500);

struct ActiveSession {
    session_id: String,
    persona: Arc<Persona>,
    history: Vec<Turn>,
    /// Delayed reply emissions, aborted on teardown so a clear or
    /// disconnect during the delay window never emits into a dead
    /// session. A client can send again once typing stops, so more than
    /// one reply may be in flight.
    pending_replies: Vec<JoinHandle<()>>,
}

pub struct ChatSession {
    conn_id: String,
    tx: mpsc::UnboundedSender<ServerEvent>,
    orchestrator: Arc<LlmOrchestrator>,
    personas: Arc<PersonaRegistry>,
    active: Option<ActiveSession>,
}

impl ChatSession {
    pub fn new(
        conn_id: impl Into<String>,
        tx: mpsc::UnboundedSender<ServerEvent>,
        orchestrator: Arc<LlmOrchestrator>,
        personas: Arc<PersonaRegistry>,
    ) -> Self {
        Self {
            conn_id: conn_id.into(),
            tx,
            orchestrator,
            personas,
            active: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.session_id.as_str())
    }

    pub fn history_len(&self) -> usize {
        self.active.as_ref().map_or(0, |a| a.history.len())
    }

    fn emit(&self, event: ServerEvent) {
        // A send failure just means the connection is gone.
        let _ = self.tx.send(event);
    }

    /// Join a persona, discarding any prior session wholesale.
    pub fn join(&mut self, persona_id: &str) {
        let Some(persona) = self.personas.get(persona_id) else {
            tracing::warn!(conn = %self.conn_id, persona = persona_id, "join rejected: unknown persona");
            self.emit(ServerEvent::Error {
                message: "Invalid persona".into(),
                details: None,
            });
            return;
        };

        self.teardown();

        let session_id = format!(
            "{}-{}-{}",
            self.conn_id,
            persona.id,
            chrono::Utc::now().timestamp_millis()
        );
        tracing::info!(conn = %self.conn_id, persona = persona.id, session = %session_id, "session joined");

        self.emit(ServerEvent::PersonaJoined {
            persona: PersonaCard::from(persona.as_ref()),
            session_id: session_id.clone(),
        });
        // Greeting is display-only; it never enters the provider-visible history.
        self.emit(ServerEvent::Message(OutboundMessage::ai(
            persona.greeting,
            persona.name,
        )));

        self.active = Some(ActiveSession {
            session_id,
            persona,
            history: Vec::new(),
            pending_replies: Vec::new(),
        });
    }

    /// Relay a user message through the orchestrator.
    pub async fn send(&mut self, content: String) {
        let Some(active) = self.active.as_mut() else {
            tracing::warn!(conn = %self.conn_id, "send rejected: no active session");
            self.emit(ServerEvent::Error {
                message: "No active persona session".into(),
                details: None,
            });
            return;
        };

        active.history.push(Turn::user(content.clone()));
        let turns = active.history.clone();
        let persona = active.persona.clone();

        // User message echoes back before the provider round trip so the
        // UI stays responsive.
        self.emit(ServerEvent::Message(OutboundMessage::user(content)));
        self.emit(ServerEvent::Typing {
            is_typing: true,
            persona: Some(persona.name.to_string()),
        });

        let result = self.orchestrator.generate(&turns, &persona).await;

        self.emit(ServerEvent::Typing {
            is_typing: false,
            persona: None,
        });

        match result {
            Ok(reply) => {
                if let Some(active) = self.active.as_mut() {
                    active.history.push(Turn::assistant(reply.clone()));

                    let event = ServerEvent::Message(OutboundMessage::ai(reply, persona.name));
                    let tx = self.tx.clone();
                    let handle = tokio::spawn(async move {
                        tokio::time::sleep(REPLY_DELAY).await;
                        let _ = tx.send(event);
                    });
                    active.pending_replies.retain(|h| !h.is_finished());
                    active.pending_replies.push(handle);
                }
            }
            Err(err) => {
                tracing::error!(conn = %self.conn_id, error = %err, "generation error");
                self.emit(ServerEvent::Error {
                    message: err.user_message().into(),
                    details: Some(err.to_string()),
                });
            }
        }
    }

    /// Discard the session and confirm. Valid in any state.
    pub fn clear(&mut self) {
        tracing::info!(conn = %self.conn_id, "chat cleared");
        self.teardown();
        self.emit(ServerEvent::ChatCleared);
    }

    /// Same cleanup as clear, but the connection is gone so nothing is emitted.
    pub fn disconnect(&mut self) {
        tracing::info!(conn = %self.conn_id, "connection closed, dropping session");
        self.teardown();
    }

    fn teardown(&mut self) {
        if let Some(active) = self.active.take() {
            for pending in active.pending_replies {
                pending.abort();
            }
        }
    }
}
