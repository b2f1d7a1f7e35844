//! Session persistence port and the exchange orchestrator.

pub mod repository;
pub mod service;

pub use repository::SessionRepository;
pub use service::SessionService;
