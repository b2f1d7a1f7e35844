//! SQLite session repository implementation.
//!
//! Implements `SessionRepository` from `fixwise-core` using sqlx with split
//! read/write pools: raw queries, a private Row struct, owner scoping in
//! every WHERE clause. History is stored as a JSON array of durable turns
//! in a TEXT column.

use chrono::{DateTime, Utc};
use fixwise_core::session::SessionRepository;
use fixwise_types::error::RepositoryError;
use fixwise_types::session::ChatSession;
use fixwise_types::turn::DurableTurn;
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `SessionRepository`.
pub struct SqliteSessionRepository {
    pool: DatabasePool,
}

impl SqliteSessionRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row type for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

/// Internal row type for mapping SQLite rows to domain ChatSession.
struct ChatSessionRow {
    id: String,
    owner: String,
    appliance_context: Option<String>,
    created_at: String,
    history: String,
}

impl ChatSessionRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            owner: row.try_get("owner")?,
            appliance_context: row.try_get("appliance_context")?,
            created_at: row.try_get("created_at")?,
            history: row.try_get("history")?,
        })
    }

    fn into_session(self) -> Result<ChatSession, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid session id: {e}")))?;
        let created_at = parse_datetime(&self.created_at)?;
        let history: Vec<DurableTurn> = serde_json::from_str(&self.history)
            .map_err(|e| RepositoryError::Query(format!("invalid history: {e}")))?;

        Ok(ChatSession {
            id,
            owner: self.owner,
            appliance_context: self.appliance_context,
            created_at,
            history,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn serialize_history(history: &[DurableTurn]) -> Result<String, RepositoryError> {
    serde_json::to_string(history)
        .map_err(|e| RepositoryError::Query(format!("history serialization: {e}")))
}

// ---------------------------------------------------------------------------
// SessionRepository implementation
// ---------------------------------------------------------------------------

impl SessionRepository for SqliteSessionRepository {
    async fn create(&self, session: &ChatSession) -> Result<ChatSession, RepositoryError> {
        sqlx::query(
            r#"INSERT INTO chat_sessions (id, owner, appliance_context, created_at, history)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(session.id.to_string())
        .bind(&session.owner)
        .bind(&session.appliance_context)
        .bind(format_datetime(&session.created_at))
        .bind(serialize_history(&session.history)?)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(session.clone())
    }

    async fn get(&self, id: &Uuid, owner: &str) -> Result<Option<ChatSession>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM chat_sessions WHERE id = ? AND owner = ?")
            .bind(id.to_string())
            .bind(owner)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let session_row = ChatSessionRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(session_row.into_session()?))
            }
            None => Ok(None),
        }
    }

    async fn list_by_owner(
        &self,
        owner: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<ChatSession>, RepositoryError> {
        let mut sql =
            String::from("SELECT * FROM chat_sessions WHERE owner = ? ORDER BY created_at DESC");

        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }

        let rows = sqlx::query(&sql)
            .bind(owner)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut sessions = Vec::with_capacity(rows.len());
        for row in &rows {
            let session_row =
                ChatSessionRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            sessions.push(session_row.into_session()?);
        }

        Ok(sessions)
    }

    async fn update_history(
        &self,
        id: &Uuid,
        owner: &str,
        history: &[DurableTurn],
    ) -> Result<(), RepositoryError> {
        // Ownership is part of the update predicate itself.
        let result = sqlx::query("UPDATE chat_sessions SET history = ? WHERE id = ? AND owner = ?")
            .bind(serialize_history(history)?)
            .bind(id.to_string())
            .bind(owner)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn delete(&self, id: &Uuid, owner: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM chat_sessions WHERE id = ? AND owner = ?")
            .bind(id.to_string())
            .bind(owner)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
