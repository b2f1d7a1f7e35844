//! Chat session types.
//!
//! A [`ChatSession`] is owned exclusively by the user who created it;
//! every read, update, and delete is scoped by that owner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::turn::DurableTurn;

/// A persisted multi-turn conversation.
///
/// The `id` is exposed externally; `owner` is the opaque user identifier
/// supplied by the identity layer. History holds only text-bearing turns
/// (media is stripped before persistence).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: Uuid,
    pub owner: String,
    /// Optional appliance label chosen at session creation (e.g. "refrigerator").
    pub appliance_context: Option<String>,
    pub created_at: DateTime<Utc>,
    pub history: Vec<DurableTurn>,
}

/// A one-line listing entry for a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub appliance_context: Option<String>,
    /// First text of the first model turn, or a placeholder.
    pub preview: String,
}

/// Result of one successful exchange: the model's reply plus the history
/// exactly as it was just persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeOutcome {
    pub generated_text: String,
    pub history: Vec<DurableTurn>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::turn::Author;

    #[test]
    fn test_chat_session_serialize() {
        let session = ChatSession {
            id: Uuid::now_v7(),
            owner: "u1".to_string(),
            appliance_context: Some("refrigerator".to_string()),
            created_at: Utc::now(),
            history: vec![DurableTurn::new(
                Author::User,
                vec!["it's not cooling".to_string()],
            )],
        };
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["owner"], "u1");
        assert_eq!(json["appliance_context"], "refrigerator");
        assert_eq!(json["history"][0]["role"], "user");
    }

    #[test]
    fn test_exchange_outcome_serialize() {
        let outcome = ExchangeOutcome {
            generated_text: "try cleaning the coils".to_string(),
            history: Vec::new(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["generated_text"], "try cleaning the coils");
        assert!(json["history"].as_array().unwrap().is_empty());
    }
}
