use thiserror::Error;

/// Errors from the generation gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Rejected before any remote call: neither text nor media present.
    #[error("cannot send an empty message (no text and no media)")]
    EmptyMessage,

    /// The remote model call failed; carries the upstream message.
    /// No retry happens at this layer.
    #[error("model invocation failed: {0}")]
    Invocation(String),

    #[error("failed to parse model response: {0}")]
    Deserialization(String),

    #[error("authentication with the model service failed")]
    AuthenticationFailed,

    #[error("rate limited by the model service")]
    RateLimited,
}

/// Errors constructing a gateway backend. Fatal at startup, never per-request.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "no usable API key: pass one explicitly or set FIXWISE_API_KEY, \
         GEMINI_API_KEY, or GOOGLE_API_KEY"
    )]
    MissingCredential,

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),
}

/// Errors from session repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    /// Session absent OR owned by someone else; callers cannot tell which.
    #[error("session not found")]
    NotFound,
}

/// Errors surfaced by the exchange orchestrator.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// Session absent or not owned by the caller (indistinguishable).
    #[error("session not found")]
    NotFound,

    #[error("cannot send an empty message (no text and no media)")]
    EmptyMessage,

    #[error(transparent)]
    Gateway(GatewayError),

    #[error("storage error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<GatewayError> for ExchangeError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::EmptyMessage => ExchangeError::EmptyMessage,
            other => ExchangeError::Gateway(other),
        }
    }
}
