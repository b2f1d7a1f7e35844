//! Global configuration types for Fixwise.
//!
//! `GlobalConfig` represents the top-level `config.toml` that controls
//! the bind address and the model used for generation.

use serde::{Deserialize, Serialize};

/// Top-level configuration for the Fixwise service.
///
/// Loaded from `~/.fixwise/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Host the HTTP server binds to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port the HTTP server binds to.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Gemini model identifier used for generation and token counting.
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            model: default_model(),
        }
    }
}
