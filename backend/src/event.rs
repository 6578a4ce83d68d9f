use encore_core::clock::Clock;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Shared by every connection task.
pub struct BackendContext {
    pub db: DatabaseConnection,
    pub clock: Arc<dyn Clock>,
    /// Row bound of the list-recent views.
    pub recent_limit: u64,
}
