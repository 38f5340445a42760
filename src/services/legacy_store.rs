//! src/services/legacy_store.rs
//!
//! Read adapter for the legacy object store. Records are flat rows keyed by
//! plain string ids; their RDF types (which carry the use tags) sit in a
//! side table.

use crate::{
    models::{
        file_use::FileUse,
        identifier::{Backend, LegacyId},
        legacy_file::LegacyFile,
    },
    services::{StoreResult, unavailable},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, QueryBuilder, SqlitePool, sqlite::Sqlite};
use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};
use tracing::debug;

/// Upper bound on bound parameters per `IN (...)` query.
const MAX_IDS_PER_QUERY: usize = 500;

/// Read interface of the legacy backend.
#[async_trait]
pub trait LegacyStore: Send + Sync {
    /// Fetch one record. `Ok(None)` when nothing is stored under `id`.
    async fn fetch_by_id(&self, id: &LegacyId) -> StoreResult<Option<LegacyFile>>;

    /// Fetch every record whose id is in `ids`, silently omitting misses.
    ///
    /// Result order is unspecified and duplicate input ids are not repeated.
    async fn fetch_many_by_ids(&self, ids: &[LegacyId]) -> StoreResult<Vec<LegacyFile>>;
}

#[derive(FromRow)]
struct LegacyFileRow {
    id: String,
    content_uri: String,
    original_name: Option<String>,
    mime_type: Option<String>,
    size_bytes: i64,
    date_modified: DateTime<Utc>,
}

impl LegacyFileRow {
    fn into_file(self, types: Vec<FileUse>) -> LegacyFile {
        LegacyFile {
            id: LegacyId::new(self.id),
            content_uri: self.content_uri,
            original_name: self.original_name,
            mime_type: self.mime_type,
            size_bytes: self.size_bytes,
            types,
            date_modified: self.date_modified,
        }
    }
}

#[derive(FromRow)]
struct TypeRow {
    file_id: String,
    type_uri: String,
}

/// Legacy store backed by SQLite.
#[derive(Clone)]
pub struct SqliteLegacyStore {
    /// Shared connection pool for the legacy database.
    pub db: Arc<SqlitePool>,
}

impl SqliteLegacyStore {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Load the type rows for a set of file ids, grouped per file.
    async fn fetch_types(
        &self,
        file_ids: &[String],
    ) -> StoreResult<HashMap<String, Vec<FileUse>>> {
        let mut grouped: HashMap<String, Vec<FileUse>> = HashMap::new();
        for chunk in file_ids.chunks(MAX_IDS_PER_QUERY) {
            let mut builder = QueryBuilder::<Sqlite>::new(
                "SELECT file_id, type_uri FROM legacy_file_types WHERE file_id IN (",
            );
            let mut separated = builder.separated(", ");
            for id in chunk {
                separated.push_bind(id.clone());
            }
            separated.push_unseparated(") ORDER BY file_id, type_uri");

            let rows: Vec<TypeRow> = builder
                .build_query_as()
                .fetch_all(&*self.db)
                .await
                .map_err(unavailable(Backend::Legacy))?;
            for row in rows {
                grouped
                    .entry(row.file_id)
                    .or_default()
                    .push(FileUse::new(row.type_uri));
            }
        }
        Ok(grouped)
    }
}

#[async_trait]
impl LegacyStore for SqliteLegacyStore {
    async fn fetch_by_id(&self, id: &LegacyId) -> StoreResult<Option<LegacyFile>> {
        let row = sqlx::query_as::<_, LegacyFileRow>(
            "SELECT id, content_uri, original_name, mime_type, size_bytes, date_modified
             FROM legacy_files WHERE id = ?",
        )
        .bind(id.as_str())
        .fetch_optional(&*self.db)
        .await
        .map_err(unavailable(Backend::Legacy))?;

        let Some(row) = row else {
            debug!("legacy file {} not found", id);
            return Ok(None);
        };

        let mut types = self.fetch_types(std::slice::from_ref(&row.id)).await?;
        let file_types = types.remove(&row.id).unwrap_or_default();
        Ok(Some(row.into_file(file_types)))
    }

    async fn fetch_many_by_ids(&self, ids: &[LegacyId]) -> StoreResult<Vec<LegacyFile>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let unique: Vec<&str> = ids
            .iter()
            .map(LegacyId::as_str)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut rows: Vec<LegacyFileRow> = Vec::with_capacity(unique.len());
        for chunk in unique.chunks(MAX_IDS_PER_QUERY) {
            let mut builder = QueryBuilder::<Sqlite>::new(
                "SELECT id, content_uri, original_name, mime_type, size_bytes, date_modified \
                 FROM legacy_files WHERE id IN (",
            );
            let mut separated = builder.separated(", ");
            for id in chunk {
                separated.push_bind(id.to_string());
            }
            separated.push_unseparated(")");

            let mut found: Vec<LegacyFileRow> = builder
                .build_query_as()
                .fetch_all(&*self.db)
                .await
                .map_err(unavailable(Backend::Legacy))?;
            rows.append(&mut found);
        }
        debug!("legacy batch: {} requested, {} found", ids.len(), rows.len());

        let found_ids: Vec<String> = rows.iter().map(|row| row.id.clone()).collect();
        let mut types = self.fetch_types(&found_ids).await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let file_types = types.remove(&row.id).unwrap_or_default();
                row.into_file(file_types)
            })
            .collect())
    }
}
