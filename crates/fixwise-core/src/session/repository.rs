//! SessionRepository trait definition.
//!
//! CRUD over session records keyed by `(id, owner)`. Every operation is
//! scoped by the owning user; a session that exists but belongs to someone
//! else behaves exactly like one that does not exist.
//! Uses native async fn in traits (RPITIT, Rust 2024 edition).

use fixwise_types::error::RepositoryError;
use fixwise_types::session::ChatSession;
use fixwise_types::turn::DurableTurn;
use uuid::Uuid;

/// Repository trait for chat session persistence.
///
/// Implementations live in fixwise-infra (e.g., `SqliteSessionRepository`).
pub trait SessionRepository: Send + Sync {
    /// Persist a new session.
    fn create(
        &self,
        session: &ChatSession,
    ) -> impl std::future::Future<Output = Result<ChatSession, RepositoryError>> + Send;

    /// Fetch one session by id, scoped to its owner.
    ///
    /// Returns `None` both when the id is absent and when it belongs to a
    /// different owner.
    fn get(
        &self,
        id: &Uuid,
        owner: &str,
    ) -> impl std::future::Future<Output = Result<Option<ChatSession>, RepositoryError>> + Send;

    /// List an owner's sessions, newest first.
    fn list_by_owner(
        &self,
        owner: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> impl std::future::Future<Output = Result<Vec<ChatSession>, RepositoryError>> + Send;

    /// Replace a session's history wholesale.
    ///
    /// Ownership is re-checked in the update predicate itself, not only at
    /// read time; fails `NotFound` when no row matches `(id, owner)`.
    fn update_history(
        &self,
        id: &Uuid,
        owner: &str,
        history: &[DurableTurn],
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Hard-delete a session. Fails `NotFound` when no row matches.
    fn delete(
        &self,
        id: &Uuid,
        owner: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
