use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::session::autosave::AutoSaver;
use crate::session::store::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Durable session storage. Redis in production, `MemoryStore` in tests.
    pub store: Arc<dyn SessionStore>,
    /// Persistence coordinator owning the auto-save timer and active slot.
    pub autosaver: Arc<AutoSaver>,
    pub llm: LlmClient,
    pub config: Config,
}
