use std::sync::Arc;

use crate::db::DbPool;
use crate::presence::PresenceRegistry;
use crate::ws::ConnectionRegistry;

/// Shared application state passed to all handlers via axum State extractor.
#[derive(Clone)]
pub struct AppState {
    /// SQLite connection wrapped in Arc<Mutex>
    pub db: DbPool,
    /// Every open WebSocket connection, keyed by connection id
    pub connections: ConnectionRegistry,
    /// In-memory live-user tracking; membership is a subset of connections
    pub presence: Arc<PresenceRegistry>,
}

impl AppState {
    pub fn new(db: DbPool) -> Self {
        Self {
            db,
            connections: crate::ws::new_connection_registry(),
            presence: Arc::new(PresenceRegistry::new()),
        }
    }
}
