//! Session service: lifecycle CRUD plus the exchange orchestrator.
//!
//! `handle_exchange` is the critical sequencing: validate, load, replay,
//! invoke, persist, respond. An exchange either fully commits the updated
//! history or leaves the prior history untouched -- a gateway failure
//! never writes to the store, and the response payload is always exactly
//! what was persisted.

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use fixwise_types::error::{ExchangeError, RepositoryError};
use fixwise_types::session::{ChatSession, ExchangeOutcome, SessionSummary};
use fixwise_types::turn::MediaAttachment;

use crate::gateway::{GenerationBackend, ModelGateway};
use crate::history;
use crate::session::repository::SessionRepository;

/// Orchestrates session lifecycle and exchanges against an injected
/// gateway.
///
/// Generic over the repository and backend traits so tests can substitute
/// in-memory fakes for both.
pub struct SessionService<R: SessionRepository, B: GenerationBackend> {
    repo: R,
    gateway: ModelGateway<B>,
}

impl<R: SessionRepository, B: GenerationBackend> SessionService<R, B> {
    pub fn new(repo: R, gateway: ModelGateway<B>) -> Self {
        Self { repo, gateway }
    }

    /// Access the gateway (e.g., for standalone token counting).
    pub fn gateway(&self) -> &ModelGateway<B> {
        &self.gateway
    }

    /// Create a new, empty session for an owner.
    pub async fn create_session(
        &self,
        owner: &str,
        appliance_context: Option<String>,
    ) -> Result<ChatSession, RepositoryError> {
        let session = ChatSession {
            id: Uuid::now_v7(),
            owner: owner.to_string(),
            appliance_context,
            created_at: Utc::now(),
            history: Vec::new(),
        };
        let created = self.repo.create(&session).await?;
        info!(session_id = %created.id, "session created");
        Ok(created)
    }

    /// List an owner's sessions as summaries, newest first.
    ///
    /// An owner with no sessions gets an empty list, not an error.
    pub async fn list_sessions(
        &self,
        owner: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<SessionSummary>, RepositoryError> {
        let sessions = self.repo.list_by_owner(owner, limit, offset).await?;
        Ok(sessions
            .into_iter()
            .map(|s| SessionSummary {
                id: s.id,
                created_at: s.created_at,
                appliance_context: s.appliance_context,
                preview: history::preview(&s.history),
            })
            .collect())
    }

    /// Fetch one session with its full history.
    pub async fn get_session(&self, id: &Uuid, owner: &str) -> Result<ChatSession, ExchangeError> {
        self.repo
            .get(id, owner)
            .await?
            .ok_or(ExchangeError::NotFound)
    }

    /// Hard-delete a session.
    pub async fn delete_session(&self, id: &Uuid, owner: &str) -> Result<(), ExchangeError> {
        match self.repo.delete(id, owner).await {
            Ok(()) => {
                info!(session_id = %id, "session deleted");
                Ok(())
            }
            Err(RepositoryError::NotFound) => Err(ExchangeError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    /// Run one exchange: append the user's prompt (and optional media) to
    /// the session's conversation, obtain the model's reply, and persist
    /// the updated history.
    pub async fn handle_exchange(
        &self,
        id: &Uuid,
        owner: &str,
        prompt: &str,
        media: Option<MediaAttachment>,
    ) -> Result<ExchangeOutcome, ExchangeError> {
        // Validation happens before the store is touched.
        if prompt.is_empty() && media.is_none() {
            return Err(ExchangeError::EmptyMessage);
        }

        let session = self.get_session(id, owner).await?;
        let prior = history::from_durable(&session.history);

        let mut handle = self.gateway.begin_conversation(prior);
        let generated_text = self.gateway.append_turn(&mut handle, prompt, media).await?;

        let durable = history::to_durable(handle.turns());
        // The session can be deleted concurrently between the load above
        // and this write; surface that as a missing session, same as
        // delete_session does.
        match self.repo.update_history(id, owner, &durable).await {
            Ok(()) => {}
            Err(RepositoryError::NotFound) => return Err(ExchangeError::NotFound),
            Err(e) => return Err(e.into()),
        }
        debug!(session_id = %id, turns = durable.len(), "history persisted");

        Ok(ExchangeOutcome {
            generated_text,
            history: durable,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::backend::GeneratedReply;
    use fixwise_types::error::GatewayError;
    use fixwise_types::turn::{Author, Turn};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// In-memory repository that counts every call, so tests can assert
    /// the store was never touched.
    #[derive(Default)]
    struct MemoryRepo {
        rows: Mutex<HashMap<Uuid, ChatSession>>,
        calls: AtomicUsize,
        // Simulates a concurrent delete landing right before the write.
        vanish_on_update: AtomicBool,
    }

    impl SessionRepository for MemoryRepo {
        async fn create(&self, session: &ChatSession) -> Result<ChatSession, RepositoryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.rows
                .lock()
                .unwrap()
                .insert(session.id, session.clone());
            Ok(session.clone())
        }

        async fn get(
            &self,
            id: &Uuid,
            owner: &str,
        ) -> Result<Option<ChatSession>, RepositoryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .rows
                .lock()
                .unwrap()
                .get(id)
                .filter(|s| s.owner == owner)
                .cloned())
        }

        async fn list_by_owner(
            &self,
            owner: &str,
            _limit: Option<i64>,
            _offset: Option<i64>,
        ) -> Result<Vec<ChatSession>, RepositoryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut sessions: Vec<ChatSession> = self
                .rows
                .lock()
                .unwrap()
                .values()
                .filter(|s| s.owner == owner)
                .cloned()
                .collect();
            sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(sessions)
        }

        async fn update_history(
            &self,
            id: &Uuid,
            owner: &str,
            history: &[fixwise_types::turn::DurableTurn],
        ) -> Result<(), RepositoryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut rows = self.rows.lock().unwrap();
            if self.vanish_on_update.load(Ordering::SeqCst) {
                rows.remove(id);
            }
            match rows.get_mut(id).filter(|s| s.owner == owner) {
                Some(session) => {
                    session.history = history.to_vec();
                    Ok(())
                }
                None => Err(RepositoryError::NotFound),
            }
        }

        async fn delete(&self, id: &Uuid, owner: &str) -> Result<(), RepositoryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut rows = self.rows.lock().unwrap();
            if rows.get(id).is_some_and(|s| s.owner == owner) {
                rows.remove(id);
                Ok(())
            } else {
                Err(RepositoryError::NotFound)
            }
        }
    }

    /// Backend whose failure mode is toggled through a shared flag the
    /// test keeps a handle to.
    struct ScriptedBackend {
        fail: Arc<AtomicBool>,
    }

    impl ScriptedBackend {
        fn new() -> (Self, Arc<AtomicBool>) {
            let fail = Arc::new(AtomicBool::new(false));
            (Self { fail: fail.clone() }, fail)
        }
    }

    impl GenerationBackend for ScriptedBackend {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, turns: &[Turn]) -> Result<GeneratedReply, GatewayError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(GatewayError::Invocation("upstream boom".to_string()));
            }
            let last = turns
                .last()
                .and_then(|t| t.parts.iter().find_map(|p| p.as_text()))
                .unwrap_or("[media]");
            Ok(GeneratedReply {
                text: format!("diagnosis for: {last}"),
            })
        }

        async fn count_tokens(&self, content: &str) -> Result<u32, GatewayError> {
            Ok(content.split_whitespace().count() as u32)
        }
    }

    fn service() -> (SessionService<MemoryRepo, ScriptedBackend>, Arc<AtomicBool>) {
        let (backend, fail) = ScriptedBackend::new();
        (
            SessionService::new(MemoryRepo::default(), ModelGateway::new(backend)),
            fail,
        )
    }

    #[tokio::test]
    async fn test_single_exchange_produces_two_turns() {
        let (svc, _fail) = service();
        let session = svc
            .create_session("u1", Some("refrigerator".to_string()))
            .await
            .unwrap();

        let outcome = svc
            .handle_exchange(&session.id, "u1", "it's not cooling", None)
            .await
            .unwrap();

        assert!(!outcome.generated_text.is_empty());
        assert_eq!(outcome.history.len(), 2);
        assert_eq!(outcome.history[0].role, Author::User);
        assert_eq!(outcome.history[1].role, Author::Model);

        // Returned history matches what was persisted.
        let stored = svc.get_session(&session.id, "u1").await.unwrap();
        assert_eq!(stored.history, outcome.history);
    }

    #[tokio::test]
    async fn test_two_exchanges_produce_four_ordered_turns() {
        let (svc, _fail) = service();
        let session = svc.create_session("u1", None).await.unwrap();

        svc.handle_exchange(&session.id, "u1", "dryer won't spin", None)
            .await
            .unwrap();
        let outcome = svc
            .handle_exchange(&session.id, "u1", "belt looks fine", None)
            .await
            .unwrap();

        let roles: Vec<Author> = outcome.history.iter().map(|t| t.role).collect();
        assert_eq!(
            roles,
            vec![Author::User, Author::Model, Author::User, Author::Model]
        );
    }

    #[tokio::test]
    async fn test_empty_prompt_rejected_before_store() {
        let (svc, _fail) = service();
        let id = Uuid::now_v7();
        let err = svc
            .handle_exchange(&id, "u1", "", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::EmptyMessage));
        assert_eq!(svc.repo.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_gateway_failure_persists_nothing() {
        let (svc, fail) = service();
        let session = svc.create_session("u1", None).await.unwrap();
        svc.handle_exchange(&session.id, "u1", "first", None)
            .await
            .unwrap();
        let before = svc.get_session(&session.id, "u1").await.unwrap().history;

        fail.store(true, Ordering::SeqCst);
        let err = svc
            .handle_exchange(&session.id, "u1", "second", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::Gateway(_)));

        let after = svc.get_session(&session.id, "u1").await.unwrap().history;
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_session_deleted_mid_exchange_is_not_found() {
        let (svc, _fail) = service();
        let session = svc.create_session("u1", None).await.unwrap();

        svc.repo.vanish_on_update.store(true, Ordering::SeqCst);
        let err = svc
            .handle_exchange(&session.id, "u1", "fridge is warm", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::NotFound));
    }

    #[tokio::test]
    async fn test_cross_owner_get_is_not_found() {
        let (svc, _fail) = service();
        let session = svc.create_session("u1", None).await.unwrap();
        let err = svc.get_session(&session.id, "u2").await.unwrap_err();
        assert!(matches!(err, ExchangeError::NotFound));
    }

    #[tokio::test]
    async fn test_cross_owner_exchange_is_not_found() {
        let (svc, _fail) = service();
        let session = svc.create_session("u1", None).await.unwrap();
        let err = svc
            .handle_exchange(&session.id, "u2", "hello", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::NotFound));
    }

    #[tokio::test]
    async fn test_unsupported_media_records_text_only() {
        let (svc, _fail) = service();
        let session = svc.create_session("u1", None).await.unwrap();
        let pdf = MediaAttachment {
            mime_type: "application/pdf".to_string(),
            data: vec![0x25, 0x50, 0x44, 0x46],
        };
        let outcome = svc
            .handle_exchange(&session.id, "u1", "see attached manual", Some(pdf))
            .await
            .unwrap();
        assert_eq!(outcome.history.len(), 2);
        assert_eq!(outcome.history[0].parts.len(), 1);
        assert_eq!(outcome.history[0].parts[0].text, "see attached manual");
    }

    #[tokio::test]
    async fn test_image_media_succeeds_and_history_stays_text_only() {
        let (svc, _fail) = service();
        let session = svc.create_session("u1", None).await.unwrap();
        let jpeg = MediaAttachment {
            mime_type: "image/jpeg".to_string(),
            data: vec![0xff, 0xd8, 0xff],
        };
        let outcome = svc
            .handle_exchange(&session.id, "u1", "what's this part?", Some(jpeg))
            .await
            .unwrap();
        // Media reached the model but never the durable history.
        assert_eq!(outcome.history.len(), 2);
        assert_eq!(outcome.history[0].parts.len(), 1);
        assert_eq!(outcome.history[0].parts[0].text, "what's this part?");
    }

    #[tokio::test]
    async fn test_list_sessions_empty_owner() {
        let (svc, _fail) = service();
        let sessions = svc.list_sessions("nobody", None, None).await.unwrap();
        assert!(sessions.is_empty());
    }

    #[tokio::test]
    async fn test_list_sessions_previews() {
        let (svc, _fail) = service();
        let with_reply = svc.create_session("u1", None).await.unwrap();
        svc.handle_exchange(&with_reply.id, "u1", "oven won't heat", None)
            .await
            .unwrap();
        let fresh = svc.create_session("u1", None).await.unwrap();

        let summaries = svc.list_sessions("u1", None, None).await.unwrap();
        assert_eq!(summaries.len(), 2);
        let fresh_summary = summaries.iter().find(|s| s.id == fresh.id).unwrap();
        assert_eq!(fresh_summary.preview, crate::history::NO_PREVIEW);
        let replied = summaries.iter().find(|s| s.id == with_reply.id).unwrap();
        assert!(replied.preview.contains("diagnosis"));
    }

    #[tokio::test]
    async fn test_delete_session() {
        let (svc, _fail) = service();
        let session = svc.create_session("u1", None).await.unwrap();
        svc.delete_session(&session.id, "u1").await.unwrap();
        let err = svc.get_session(&session.id, "u1").await.unwrap_err();
        assert!(matches!(err, ExchangeError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_cross_owner_is_not_found() {
        let (svc, _fail) = service();
        let session = svc.create_session("u1", None).await.unwrap();
        let err = svc.delete_session(&session.id, "u2").await.unwrap_err();
        assert!(matches!(err, ExchangeError::NotFound));
        // Still present for the real owner.
        assert!(svc.get_session(&session.id, "u1").await.is_ok());
    }
}
