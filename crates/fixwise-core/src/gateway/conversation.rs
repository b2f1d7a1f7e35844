//! ModelGateway -- per-request conversation assembly over a backend.
//!
//! A [`ConversationHandle`] is reconstructed from persisted history on
//! every request and discarded afterwards; no chat object survives a
//! request. Statefulness lives only in the session store.

use tracing::warn;

use fixwise_types::error::GatewayError;
use fixwise_types::turn::{Author, MediaAttachment, Part, Turn};

use super::backend::GenerationBackend;

/// The ordered turns of one in-flight conversation.
///
/// Created by [`ModelGateway::begin_conversation`]; mutated only by
/// [`ModelGateway::append_turn`]. After a successful append the handle
/// ends with the new user turn followed by the model's reply turn.
#[derive(Debug, Clone)]
pub struct ConversationHandle {
    turns: Vec<Turn>,
}

impl ConversationHandle {
    /// The accumulated turns, oldest first.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }
}

/// Gateway over a remote text-generation backend.
///
/// Constructed once at startup and injected wherever exchanges run; the
/// backend behind it is chosen at construction time (real or offline).
pub struct ModelGateway<B: GenerationBackend> {
    backend: B,
}

impl<B: GenerationBackend> ModelGateway<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// The name of the backend in use.
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Start a conversation seeded from prior turns.
    ///
    /// Does not contact the remote service.
    pub fn begin_conversation(&self, prior_turns: Vec<Turn>) -> ConversationHandle {
        ConversationHandle { turns: prior_turns }
    }

    /// Append one user turn (text and/or one inline media blob), invoke the
    /// model, and record its reply on the handle.
    ///
    /// Media with a mime type outside `image/*` and `video/*` is dropped
    /// with a warning; the text still goes through. An accepted media part
    /// precedes the text part. On backend failure the handle is left
    /// exactly as it was before the call.
    pub async fn append_turn(
        &self,
        handle: &mut ConversationHandle,
        text: &str,
        media: Option<MediaAttachment>,
    ) -> Result<String, GatewayError> {
        if text.is_empty() && media.is_none() {
            return Err(GatewayError::EmptyMessage);
        }

        let mut parts = Vec::with_capacity(2);
        if let Some(attachment) = media {
            if attachment.is_supported() {
                parts.push(Part::InlineMedia {
                    mime_type: attachment.mime_type,
                    data: attachment.data,
                });
            } else {
                warn!(
                    mime_type = %attachment.mime_type,
                    "unsupported media type, sending text only"
                );
            }
        }
        if !text.is_empty() {
            parts.push(Part::Text(text.to_string()));
        }
        if parts.is_empty() {
            // Media was dropped and there was no text.
            return Err(GatewayError::EmptyMessage);
        }

        handle.turns.push(Turn {
            role: Author::User,
            parts,
        });

        match self.backend.generate(&handle.turns).await {
            Ok(reply) => {
                handle.turns.push(Turn::text(Author::Model, reply.text.clone()));
                Ok(reply.text)
            }
            Err(e) => {
                // Roll back the user turn so the handle matches what the
                // caller last saw.
                handle.turns.pop();
                Err(e)
            }
        }
    }

    /// Blocking variant of [`Self::append_turn`] for callers outside an
    /// async context.
    ///
    /// Must be called from a blocking section of a multi-thread tokio
    /// runtime; panics on a current-thread runtime.
    pub fn append_turn_blocking(
        &self,
        handle: &mut ConversationHandle,
        text: &str,
        media: Option<MediaAttachment>,
    ) -> Result<String, GatewayError> {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(self.append_turn(handle, text, media))
        })
    }

    /// Stateless token-count estimate, independent of any conversation.
    pub async fn count_tokens(&self, content: &str) -> Result<u32, GatewayError> {
        self.backend.count_tokens(content).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::backend::GeneratedReply;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Backend that records what it received and replies deterministically,
    /// or fails when `fail` is set.
    struct ScriptedBackend {
        fail: AtomicBool,
    }

    impl ScriptedBackend {
        fn new() -> Self {
            Self {
                fail: AtomicBool::new(false),
            }
        }
    }

    impl GenerationBackend for ScriptedBackend {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, turns: &[Turn]) -> Result<GeneratedReply, GatewayError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(GatewayError::Invocation("quota exceeded".to_string()));
            }
            Ok(GeneratedReply {
                text: format!("reply #{}", turns.len()),
            })
        }

        async fn count_tokens(&self, content: &str) -> Result<u32, GatewayError> {
            Ok(content.split_whitespace().count() as u32)
        }
    }

    fn jpeg() -> MediaAttachment {
        MediaAttachment {
            mime_type: "image/jpeg".to_string(),
            data: vec![0xff, 0xd8, 0xff],
        }
    }

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let gateway = ModelGateway::new(ScriptedBackend::new());
        let mut handle = gateway.begin_conversation(Vec::new());
        let err = gateway.append_turn(&mut handle, "", None).await.unwrap_err();
        assert!(matches!(err, GatewayError::EmptyMessage));
        assert!(handle.turns().is_empty());
    }

    #[tokio::test]
    async fn test_append_records_user_and_model_turns() {
        let gateway = ModelGateway::new(ScriptedBackend::new());
        let mut handle = gateway.begin_conversation(Vec::new());
        let text = gateway
            .append_turn(&mut handle, "washer is leaking", None)
            .await
            .unwrap();
        assert_eq!(text, "reply #1");
        assert_eq!(handle.turns().len(), 2);
        assert_eq!(handle.turns()[0].role, Author::User);
        assert_eq!(handle.turns()[1].role, Author::Model);
    }

    #[tokio::test]
    async fn test_prior_turns_are_replayed() {
        let gateway = ModelGateway::new(ScriptedBackend::new());
        let prior = vec![
            Turn::text(Author::User, "hi"),
            Turn::text(Author::Model, "hello"),
        ];
        let mut handle = gateway.begin_conversation(prior);
        // Backend sees 3 turns: the two prior plus the new user turn.
        let text = gateway.append_turn(&mut handle, "next", None).await.unwrap();
        assert_eq!(text, "reply #3");
        assert_eq!(handle.turns().len(), 4);
    }

    #[tokio::test]
    async fn test_accepted_media_precedes_text() {
        let gateway = ModelGateway::new(ScriptedBackend::new());
        let mut handle = gateway.begin_conversation(Vec::new());
        gateway
            .append_turn(&mut handle, "what part is this?", Some(jpeg()))
            .await
            .unwrap();
        let user_turn = &handle.turns()[0];
        assert_eq!(user_turn.parts.len(), 2);
        assert!(matches!(user_turn.parts[0], Part::InlineMedia { .. }));
        assert!(matches!(user_turn.parts[1], Part::Text(_)));
    }

    #[tokio::test]
    async fn test_unsupported_media_degrades_to_text() {
        let gateway = ModelGateway::new(ScriptedBackend::new());
        let mut handle = gateway.begin_conversation(Vec::new());
        let pdf = MediaAttachment {
            mime_type: "application/pdf".to_string(),
            data: vec![0x25, 0x50],
        };
        gateway
            .append_turn(&mut handle, "see the manual", Some(pdf))
            .await
            .unwrap();
        let user_turn = &handle.turns()[0];
        assert_eq!(user_turn.parts.len(), 1);
        assert!(matches!(user_turn.parts[0], Part::Text(_)));
    }

    #[tokio::test]
    async fn test_unsupported_media_without_text_is_empty() {
        let gateway = ModelGateway::new(ScriptedBackend::new());
        let mut handle = gateway.begin_conversation(Vec::new());
        let pdf = MediaAttachment {
            mime_type: "application/pdf".to_string(),
            data: vec![0x25],
        };
        let err = gateway
            .append_turn(&mut handle, "", Some(pdf))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::EmptyMessage));
    }

    #[tokio::test]
    async fn test_backend_failure_rolls_back_handle() {
        let backend = ScriptedBackend::new();
        backend.fail.store(true, Ordering::SeqCst);
        let gateway = ModelGateway::new(backend);

        let prior = vec![
            Turn::text(Author::User, "hi"),
            Turn::text(Author::Model, "hello"),
        ];
        let mut handle = gateway.begin_conversation(prior.clone());
        let err = gateway
            .append_turn(&mut handle, "again", None)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Invocation(_)));
        assert_eq!(handle.turns(), prior.as_slice());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_blocking_convention() {
        let gateway = ModelGateway::new(ScriptedBackend::new());
        let mut handle = gateway.begin_conversation(Vec::new());
        let text = gateway
            .append_turn_blocking(&mut handle, "hello", None)
            .unwrap();
        assert_eq!(text, "reply #1");
    }

    #[tokio::test]
    async fn test_count_tokens_delegates() {
        let gateway = ModelGateway::new(ScriptedBackend::new());
        let count = gateway.count_tokens("is the unit plugged in").await.unwrap();
        assert_eq!(count, 5);
    }
}
