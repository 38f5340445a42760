//! HTTP handlers exposing the resolver's four lookups.
//! All routes are read-only; errors map through `AppError`.

use crate::{
    errors::AppError,
    handlers::AppState,
    models::{
        file_use::FileUse,
        identifier::{AlternateId, Identifier, ResourceId},
        record::{FileRecord, RecordShape},
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

/// Query params for single-id lookups.
#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    /// `legacy` or `resource`; defaults to `resource`.
    pub scheme: Option<String>,
    #[serde(default)]
    pub shape: RecordShape,
}

/// Query params for alternate-id lookups.
#[derive(Debug, Deserialize)]
pub struct ShapeQuery {
    #[serde(default)]
    pub shape: RecordShape,
}

/// Query params for `GET /file-sets/{id}/files`.
#[derive(Debug, Deserialize)]
pub struct UseQuery {
    #[serde(rename = "use")]
    pub file_use: String,
    #[serde(default)]
    pub shape: RecordShape,
}

/// Body of `POST /files`.
#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub ids: Vec<Identifier>,
    #[serde(default)]
    pub shape: RecordShape,
}

/// GET `/files/{id}` — single lookup by primary id.
pub async fn get_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<LookupQuery>,
) -> Result<Json<FileRecord>, AppError> {
    let scheme = q.scheme.as_deref().unwrap_or("resource");
    let id = Identifier::parse(scheme, id)
        .ok_or_else(|| AppError::bad_request(format!("unknown id scheme `{}`", scheme)))?;

    let record = state.resolver.find_by(&id, q.shape).await?;
    Ok(Json(record))
}

/// GET `/alternate-ids/{*alt_id}` — single lookup by alternate identifier.
pub async fn get_file_by_alternate_id(
    State(state): State<AppState>,
    Path(alt_id): Path<String>,
    Query(q): Query<ShapeQuery>,
) -> Result<Json<FileRecord>, AppError> {
    let record = state
        .resolver
        .find_by_alternate_identifier(&AlternateId::new(alt_id), q.shape)
        .await?;
    Ok(Json(record))
}

/// POST `/files` — batch lookup; unresolved ids are omitted.
pub async fn find_many_files(
    State(state): State<AppState>,
    Json(req): Json<BatchRequest>,
) -> Result<Json<Vec<FileRecord>>, AppError> {
    let records = state.resolver.find_many_by_ids(&req.ids, req.shape).await?;
    Ok(Json(records))
}

/// GET `/file-sets/{id}/files?use=` — members of a file set carrying a use tag.
pub async fn list_file_set_files(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<UseQuery>,
) -> Result<Json<Vec<FileRecord>>, AppError> {
    if q.file_use.trim().is_empty() {
        return Err(AppError::bad_request("`use` must not be empty"));
    }
    let parent = state.resolver.find_file_set(&ResourceId::new(id)).await?;
    let records = state
        .resolver
        .find_many_by_use(&parent, &FileUse::new(q.file_use), q.shape)
        .await?;
    Ok(Json(records))
}
