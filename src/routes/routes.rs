//! Defines routes for the read-only metadata query surface.
//!
//! ## Structure
//! - `GET  /healthz`, `GET /readyz` — probes
//! - `GET  /files/{id}` — single lookup (`?scheme=legacy|resource&shape=`)
//! - `POST /files` — batch lookup, body `{ "ids": [...], "shape": ... }`
//! - `GET  /alternate-ids/{*alt_id}` — lookup by alternate identifier
//! - `GET  /file-sets/{id}/files` — members by use tag (`?use=&shape=`)
//!
//! The wildcard `*alt_id` allows identifiers such as `ark:/99999/fk4abc`.

use crate::handlers::{
    AppState,
    file_metadata_handlers::{
        find_many_files, get_file, get_file_by_alternate_id, list_file_set_files,
    },
    health_handlers::{healthz, readyz},
};
use axum::{
    Router,
    routing::{get, post},
};

/// Build the router for every query route, carrying `AppState`.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/files", post(find_many_files))
        .route("/files/{id}", get(get_file))
        .route("/alternate-ids/{*alt_id}", get(get_file_by_alternate_id))
        .route("/file-sets/{id}/files", get(list_file_set_files))
}
