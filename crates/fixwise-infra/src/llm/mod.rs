//! Generation backends: the real Gemini HTTP client and the offline
//! fallback, plus the factory that picks between them at startup.

pub mod gemini;
pub mod offline;

pub use gemini::GeminiBackend;
pub use offline::OfflineBackend;

use fixwise_core::gateway::BoxBackend;
use fixwise_types::error::ConfigError;
use secrecy::SecretString;
use tracing::{info, warn};

/// Environment variables checked for the Gemini API key, in order.
const API_KEY_VARS: &[&str] = &["FIXWISE_API_KEY", "GEMINI_API_KEY", "GOOGLE_API_KEY"];

/// Resolve the Gemini API key from the environment.
///
/// Checks `FIXWISE_API_KEY`, then `GEMINI_API_KEY`, then `GOOGLE_API_KEY`.
/// Empty values are treated as absent.
pub fn resolve_api_key() -> Option<SecretString> {
    API_KEY_VARS.iter().find_map(|var| {
        std::env::var(var)
            .ok()
            .filter(|v| !v.is_empty())
            .map(SecretString::from)
    })
}

/// Construct the Gemini backend from an explicit key, falling back to the
/// environment. Fails with [`ConfigError::MissingCredential`] when neither
/// yields a key.
pub fn gemini_from_env(
    api_key: Option<SecretString>,
    model: &str,
) -> Result<GeminiBackend, ConfigError> {
    let api_key = api_key
        .or_else(resolve_api_key)
        .ok_or(ConfigError::MissingCredential)?;
    GeminiBackend::new(api_key, model.to_string())
}

/// Select the generation backend once at startup.
///
/// With a usable credential this returns the Gemini client; otherwise the
/// offline fallback, so the service stays up (sessions, history, CRUD) with
/// clearly labeled placeholder replies.
pub fn build_backend(model: &str) -> BoxBackend {
    match gemini_from_env(None, model) {
        Ok(backend) => {
            info!(model, "using Gemini generation backend");
            BoxBackend::new(backend)
        }
        Err(err) => {
            warn!("{err}; using offline backend, replies will be placeholders");
            BoxBackend::new(OfflineBackend::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_key_builds_gemini() {
        let backend = gemini_from_env(Some(SecretString::from("test-key")), "gemini-2.0-flash");
        assert_eq!(backend.unwrap().model(), "gemini-2.0-flash");
    }
}
