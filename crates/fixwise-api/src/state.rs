//! Application state wiring all services together.
//!
//! AppState holds the concrete service instance used by both CLI and REST
//! API. The service is generic over the repository and backend traits, but
//! AppState pins it to the concrete infra implementations; the backend
//! (Gemini or offline) is chosen once here at startup.

use std::path::PathBuf;
use std::sync::Arc;

use fixwise_core::gateway::{BoxBackend, ModelGateway};
use fixwise_core::session::SessionService;
use fixwise_infra::config::load_global_config;
use fixwise_infra::llm::build_backend;
use fixwise_infra::sqlite::pool::{DatabasePool, default_data_dir};
use fixwise_infra::sqlite::session::SqliteSessionRepository;
use fixwise_types::config::GlobalConfig;

/// Concrete type alias for the service generics pinned to infra implementations.
pub type ConcreteSessionService = SessionService<SqliteSessionRepository, BoxBackend>;

/// Shared application state.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub session_service: Arc<ConcreteSessionService>,
    pub config: GlobalConfig,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: load config, connect to DB,
    /// select the generation backend, wire the session service.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = PathBuf::from(default_data_dir());

        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_global_config(&data_dir).await;

        // Initialize database
        let db_url = format!(
            "sqlite://{}?mode=rwc",
            data_dir.join("fixwise.db").display()
        );
        let db_pool = DatabasePool::new(&db_url).await?;

        let session_repo = SqliteSessionRepository::new(db_pool.clone());
        let backend = build_backend(&config.model);
        let gateway = ModelGateway::new(backend);
        let session_service = SessionService::new(session_repo, gateway);

        Ok(Self {
            session_service: Arc::new(session_service),
            config,
            data_dir,
            db_pool,
        })
    }
}
