//! WebSocket event contract
//!
//! JSON messages are internally tagged with `type`; tags are kebab-case
//! and fields camelCase to match the browser client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::personas::PersonaCard;

/// Event from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    /// Start (or restart) a session with a persona
    JoinPersona { persona_id: String },

    /// Send a user message in the active session
    SendMessage { content: String },

    /// Drop the session and its history
    ClearChat,
}

/// Event from server to client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// Session established; the greeting follows as a separate message
    PersonaJoined {
        persona: PersonaCard,
        session_id: String,
    },

    /// A chat message, from either side of the conversation
    Message(OutboundMessage),

    /// Typing indicator state change
    Typing {
        is_typing: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        persona: Option<String>,
    },

    /// Error surfaced to the client; `message` is always user-safe
    Error {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        details: Option<String>,
    },

    /// Confirmation that the session was discarded
    ChatCleared,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMessage {
    pub id: Uuid,
    pub content: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persona: Option<String>,
}

impl OutboundMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            sender: Sender::User,
            timestamp: Utc::now(),
            persona: None,
        }
    }

    pub fn ai(content: impl Into<String>, persona: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            sender: Sender::Ai,
            timestamp: Utc::now(),
            persona: Some(persona.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_client_events() {
        let event: ClientEvent =
            serde_json::from_str(r#"{"type":"join-persona","personaId":"einstein"}"#).unwrap();
        match event {
            ClientEvent::JoinPersona { persona_id } => assert_eq!(persona_id, "einstein"),
            other => panic!("wrong event: {:?}", other),
        }

        let event: ClientEvent =
            serde_json::from_str(r#"{"type":"send-message","content":"hello"}"#).unwrap();
        assert!(matches!(event, ClientEvent::SendMessage { .. }));

        let event: ClientEvent = serde_json::from_str(r#"{"type":"clear-chat"}"#).unwrap();
        assert!(matches!(event, ClientEvent::ClearChat));
    }

    #[test]
    fn test_unknown_client_event_is_rejected() {
        assert!(serde_json::from_str::<ClientEvent>(r#"{"type":"shutdown"}"#).is_err());
        assert!(serde_json::from_str::<ClientEvent>("not json").is_err());
    }

    #[test]
    fn test_serialize_message_event() {
        let event = ServerEvent::Message(OutboundMessage::ai("Well met!", "William Shakespeare"));
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"message"#));
        assert!(json.contains(r#""sender":"ai"#));
        assert!(json.contains(r#""persona":"William Shakespeare"#));
        assert!(json.contains(r#""timestamp""#));

        let event = ServerEvent::Message(OutboundMessage::user("hi"));
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""sender":"user"#));
        assert!(!json.contains(r#""persona""#));
    }

    #[test]
    fn test_serialize_typing_and_error() {
        let event = ServerEvent::Typing {
            is_typing: true,
            persona: Some("Albert Einstein".into()),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"typing"#));
        assert!(json.contains(r#""isTyping":true"#));

        let event = ServerEvent::Error {
            message: "Invalid persona".into(),
            details: None,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"error"#));
        assert!(!json.contains("details"));

        let json = serde_json::to_string(&ServerEvent::ChatCleared).unwrap();
        assert_eq!(json, r#"{"type":"chat-cleared"}"#);
    }
}
