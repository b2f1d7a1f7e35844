//! OfflineBackend -- degraded-mode fallback when no API key is available.
//!
//! Selected once at startup by [`super::build_backend`]. Every reply is
//! prefixed with `[offline]` so callers and users can tell placeholder
//! output from real model output. Session lifecycle and history persistence
//! behave exactly as with the real backend.

use fixwise_core::gateway::{GeneratedReply, GenerationBackend};
use fixwise_types::error::GatewayError;
use fixwise_types::turn::Turn;

pub struct OfflineBackend;

impl OfflineBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for OfflineBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationBackend for OfflineBackend {
    fn name(&self) -> &str {
        "offline"
    }

    async fn generate(&self, turns: &[Turn]) -> Result<GeneratedReply, GatewayError> {
        let last = turns
            .last()
            .and_then(|t| t.parts.iter().find_map(|p| p.as_text()))
            .unwrap_or("(no text)");
        Ok(GeneratedReply {
            text: format!(
                "[offline] The diagnosis service is not configured; no model \
                 was consulted. Your message was recorded: {last}"
            ),
        })
    }

    /// Whitespace word count as a rough stand-in for real tokenization.
    async fn count_tokens(&self, content: &str) -> Result<u32, GatewayError> {
        Ok(content.split_whitespace().count() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixwise_types::turn::Author;

    #[tokio::test]
    async fn test_reply_is_labeled() {
        let backend = OfflineBackend::new();
        let turns = vec![Turn::text(Author::User, "the ice maker is jammed")];
        let reply = backend.generate(&turns).await.unwrap();
        assert!(reply.text.starts_with("[offline]"));
        assert!(reply.text.contains("the ice maker is jammed"));
    }

    #[tokio::test]
    async fn test_count_tokens_is_word_count() {
        let backend = OfflineBackend::new();
        assert_eq!(backend.count_tokens("three word phrase").await.unwrap(), 3);
        assert_eq!(backend.count_tokens("").await.unwrap(), 0);
    }
}
