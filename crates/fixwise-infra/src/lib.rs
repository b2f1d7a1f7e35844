//! Infrastructure layer for Fixwise.
//!
//! Contains implementations of the ports defined in `fixwise-core`:
//! SQLite storage for sessions and API keys, the Gemini HTTP backend,
//! the offline fallback backend, and configuration loading.

pub mod config;
pub mod llm;
pub mod sqlite;
