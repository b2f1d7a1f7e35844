//! Shared domain types for Fixwise.
//!
//! This crate has no IO dependencies; it defines the conversation, session,
//! and error types used across `fixwise-core`, `fixwise-infra`, and
//! `fixwise-api`.

pub mod config;
pub mod error;
pub mod session;
pub mod turn;
