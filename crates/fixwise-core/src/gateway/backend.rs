//! GenerationBackend trait definition.
//!
//! This is the abstraction all generation backends implement: the real
//! Gemini HTTP backend and the offline fallback. Uses native async fn in
//! traits (RPITIT, Rust 2024 edition); the object-safe wrapper lives in
//! [`super::box_backend`].

use fixwise_types::error::GatewayError;
use fixwise_types::turn::Turn;

/// The model's reply to one generation call.
#[derive(Debug, Clone)]
pub struct GeneratedReply {
    pub text: String,
}

/// Trait for text-generation backends.
///
/// A backend receives the full accumulated conversation (prior turns plus
/// the new user turn) and returns one model reply. It holds no
/// conversation state of its own.
///
/// Implementations live in fixwise-infra (`GeminiBackend`, `OfflineBackend`).
pub trait GenerationBackend: Send + Sync {
    /// Human-readable backend name (e.g., "gemini", "offline").
    fn name(&self) -> &str;

    /// Generate one model reply for the given conversation.
    fn generate(
        &self,
        turns: &[Turn],
    ) -> impl std::future::Future<Output = Result<GeneratedReply, GatewayError>> + Send;

    /// Stateless token-count estimate for a piece of content,
    /// independent of any conversation.
    fn count_tokens(
        &self,
        content: &str,
    ) -> impl std::future::Future<Output = Result<u32, GatewayError>> + Send;
}
