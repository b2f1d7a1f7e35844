//! BoxBackend -- object-safe dynamic dispatch wrapper for GenerationBackend.
//!
//! The pattern:
//! 1. Define an object-safe `GenerationBackendDyn` trait with boxed futures
//! 2. Blanket-impl `GenerationBackendDyn` for all `T: GenerationBackend`
//! 3. `BoxBackend` wraps `Box<dyn GenerationBackendDyn>` and delegates
//!
//! `BoxBackend` also implements `GenerationBackend` itself, so services
//! generic over the trait can be pinned to a runtime-selected backend.

use std::future::Future;
use std::pin::Pin;

use fixwise_types::error::GatewayError;
use fixwise_types::turn::Turn;

use super::backend::{GeneratedReply, GenerationBackend};

/// Object-safe version of [`GenerationBackend`] with boxed futures.
///
/// Exists solely to enable dynamic dispatch; a blanket implementation is
/// provided for every `GenerationBackend`.
pub trait GenerationBackendDyn: Send + Sync {
    fn name(&self) -> &str;

    fn generate_boxed<'a>(
        &'a self,
        turns: &'a [Turn],
    ) -> Pin<Box<dyn Future<Output = Result<GeneratedReply, GatewayError>> + Send + 'a>>;

    fn count_tokens_boxed<'a>(
        &'a self,
        content: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<u32, GatewayError>> + Send + 'a>>;
}

impl<T: GenerationBackend> GenerationBackendDyn for T {
    fn name(&self) -> &str {
        GenerationBackend::name(self)
    }

    fn generate_boxed<'a>(
        &'a self,
        turns: &'a [Turn],
    ) -> Pin<Box<dyn Future<Output = Result<GeneratedReply, GatewayError>> + Send + 'a>> {
        Box::pin(self.generate(turns))
    }

    fn count_tokens_boxed<'a>(
        &'a self,
        content: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<u32, GatewayError>> + Send + 'a>> {
        Box::pin(self.count_tokens(content))
    }
}

/// Type-erased generation backend for runtime selection
/// (real Gemini client vs offline fallback).
pub struct BoxBackend {
    inner: Box<dyn GenerationBackendDyn + Send + Sync>,
}

impl BoxBackend {
    /// Wrap a concrete backend in a type-erased box.
    pub fn new<T: GenerationBackend + 'static>(backend: T) -> Self {
        Self {
            inner: Box::new(backend),
        }
    }
}

impl GenerationBackend for BoxBackend {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn generate(&self, turns: &[Turn]) -> Result<GeneratedReply, GatewayError> {
        self.inner.generate_boxed(turns).await
    }

    async fn count_tokens(&self, content: &str) -> Result<u32, GatewayError> {
        self.inner.count_tokens_boxed(content).await
    }
}
