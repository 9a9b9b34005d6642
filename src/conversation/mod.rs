//! Conversation types
//!
//! A conversation is an append-only sequence of turns. The persona's
//! greeting is presentation-only and never enters the turn history, so
//! the first turn a provider sees is always the user's.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Last user turn in a history, if any. The fallback responder and the
/// Gemini prompt flattening both key off this.
pub fn last_user_turn(turns: &[Turn]) -> Option<&Turn> {
    turns.iter().rev().find(|t| t.role == Role::User)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serialization() {
        let turn = Turn::user("hello");
        let json = serde_json::to_string(&turn).unwrap();
        assert!(json.contains(r#""role":"user"#));

        let turn = Turn::assistant("hi");
        let json = serde_json::to_string(&turn).unwrap();
        assert!(json.contains(r#""role":"assistant"#));
    }

    #[test]
    fn test_last_user_turn() {
        let turns = vec![
            Turn::user("first"),
            Turn::assistant("reply"),
            Turn::user("second"),
        ];
        assert_eq!(last_user_turn(&turns).unwrap().content, "second");
        assert!(last_user_turn(&[]).is_none());
    }
}
