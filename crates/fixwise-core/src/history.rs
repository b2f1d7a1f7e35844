//! History codec between in-memory turns and the durable representation.
//!
//! Durable history is text-only: inline media parts are dropped, and any
//! turn left without a non-empty text part is dropped with it. Order is
//! preserved. The mapping is lossy in one direction only -- a durable
//! history round-trips exactly (`to_durable(from_durable(x)) == x`), while
//! a turn list containing media does not.

use fixwise_types::turn::{DurableTurn, Part, Turn};

/// Placeholder preview for sessions without a model reply yet.
pub const NO_PREVIEW: &str = "No preview available.";

/// Canonicalize turns into the storable text-only representation.
pub fn to_durable(turns: &[Turn]) -> Vec<DurableTurn> {
    turns
        .iter()
        .filter_map(|turn| {
            let texts: Vec<String> = turn
                .parts
                .iter()
                .filter_map(|part| match part {
                    Part::Text(text) if !text.is_empty() => Some(text.clone()),
                    _ => None,
                })
                .collect();

            if texts.is_empty() {
                None
            } else {
                Some(DurableTurn::new(turn.role, texts))
            }
        })
        .collect()
}

/// Rebuild in-memory turns from the durable representation.
pub fn from_durable(history: &[DurableTurn]) -> Vec<Turn> {
    history
        .iter()
        .map(|turn| Turn {
            role: turn.role,
            parts: turn
                .parts
                .iter()
                .map(|part| Part::Text(part.text.clone()))
                .collect(),
        })
        .collect()
}

/// One-line preview for session listings: the first model turn's first
/// text part, or [`NO_PREVIEW`] when the session has no model reply.
pub fn preview(history: &[DurableTurn]) -> String {
    history
        .iter()
        .find(|turn| turn.role == fixwise_types::turn::Author::Model)
        .and_then(|turn| turn.parts.first())
        .map(|part| part.text.clone())
        .unwrap_or_else(|| NO_PREVIEW.to_string())
}
