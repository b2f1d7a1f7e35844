//! HTTP layer: router, handlers, envelope responses, and auth.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod router;
