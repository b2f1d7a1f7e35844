//! Business logic and port definitions for Fixwise.
//!
//! This crate defines the gateway and repository traits that the
//! infrastructure layer implements. It depends only on `fixwise-types` --
//! never on `fixwise-infra` or any database/HTTP crate.

pub mod gateway;
pub mod history;
pub mod session;
