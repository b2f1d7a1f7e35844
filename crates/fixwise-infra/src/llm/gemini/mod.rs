//! Gemini generateContent backend.

pub mod client;
pub mod types;

pub use client::GeminiBackend;
