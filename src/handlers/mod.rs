//! HTTP handlers and the state they share.

pub mod file_metadata_handlers;
pub mod health_handlers;

use crate::services::resolver::MetadataResolver;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub resolver: MetadataResolver,

    /// Pools behind the two adapters, kept for readiness probes.
    pub legacy_db: Arc<SqlitePool>,
    pub resource_db: Arc<SqlitePool>,
}
