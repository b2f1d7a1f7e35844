//! SQLite persistence with split reader/writer pools.

pub mod pool;
pub mod session;

pub use pool::DatabasePool;
pub use session::SqliteSessionRepository;
