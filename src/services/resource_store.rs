//! src/services/resource_store.rs
//!
//! Read adapter for the resource store. File metadata resources carry
//! multi-valued use tags and alternate identifiers in side tables; file
//! sets list their members in stored order.

use crate::{
    models::{
        file_metadata::FileMetadata,
        file_set::FileSet,
        file_use::FileUse,
        identifier::{AlternateId, Backend, ResourceId},
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

const FILE_METADATA_COLUMNS: &str = "fm.id, fm.file_set_id, fm.file_identifier, \
     fm.original_filename, fm.mime_type, fm.size_bytes, fm.created_at, fm.updated_at";

/// Read interface of the resource backend.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Fetch one resource by primary id. `Ok(None)` when absent.
    async fn fetch_by_id(&self, id: &ResourceId) -> StoreResult<Option<FileMetadata>>;

    /// Fetch one resource through the alternate-identifier index only.
    async fn fetch_by_alternate_identifier(
        &self,
        alt_id: &AlternateId,
    ) -> StoreResult<Option<FileMetadata>>;

    /// Fetch every resource whose id is in `ids`, silently omitting misses.
    async fn fetch_many_by_ids(&self, ids: &[ResourceId]) -> StoreResult<Vec<FileMetadata>>;

    /// Members of `parent` whose use set contains `tag`, in member order.
    ///
    /// Each matching member appears once, however often the parent lists it.
    async fn fetch_members_with_use(
        &self,
        parent: &FileSet,
        tag: &FileUse,
    ) -> StoreResult<Vec<FileMetadata>>;

    /// Load a file set by id. `Ok(None)` when absent.
    async fn fetch_file_set(&self, id: &ResourceId) -> StoreResult<Option<FileSet>>;
}

#[derive(FromRow)]
struct FileMetadataRow {
    id: String,
    file_set_id: Option<String>,
    file_identifier: String,
    original_filename: Option<String>,
    mime_type: Option<String>,
    size_bytes: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct FileSetRow {
    id: String,
    title: Option<String>,
    updated_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct PairRow {
    owner: String,
    value: String,
}

/// Resource store backed by SQLite.
#[derive(Clone)]
pub struct SqliteResourceStore {
    /// Shared connection pool for the resource database.
    pub db: Arc<SqlitePool>,
}

impl SqliteResourceStore {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Load `(owner, value)` pairs from a side table for the given owners.
    ///
    /// `select` must alias its columns as `owner` and `value` and end in an
    /// open `IN (` clause.
    async fn fetch_pairs(
        &self,
        select: &str,
        owners: &[String],
    ) -> StoreResult<HashMap<String, Vec<String>>> {
        let mut grouped: HashMap<String, Vec<String>> = HashMap::new();
        for chunk in owners.chunks(MAX_IDS_PER_QUERY) {
            let mut builder = QueryBuilder::<Sqlite>::new(select);
            let mut separated = builder.separated(", ");
            for owner in chunk {
                separated.push_bind(owner.clone());
            }
            separated.push_unseparated(") ORDER BY owner, value");

            let rows: Vec<PairRow> = builder
                .build_query_as()
                .fetch_all(&*self.db)
                .await
                .map_err(unavailable(Backend::Resource))?;
            for row in rows {
                grouped.entry(row.owner).or_default().push(row.value);
            }
        }
        Ok(grouped)
    }

    /// Attach use tags and alternate ids to raw rows.
    async fn hydrate(&self, rows: Vec<FileMetadataRow>) -> StoreResult<Vec<FileMetadata>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<String> = rows.iter().map(|row| row.id.clone()).collect();
        let mut uses = self
            .fetch_pairs(
                "SELECT file_metadata_id AS owner, use_uri AS value \
                 FROM file_metadata_uses WHERE file_metadata_id IN (",
                &ids,
            )
            .await?;
        let mut alternates = self
            .fetch_pairs(
                "SELECT file_metadata_id AS owner, alternate_id AS value \
                 FROM file_metadata_alternate_ids WHERE file_metadata_id IN (",
                &ids,
            )
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| FileMetadata {
                uses: uses
                    .remove(&row.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(FileUse::new)
                    .collect(),
                alternate_ids: alternates
                    .remove(&row.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(AlternateId::new)
                    .collect(),
                id: ResourceId::new(row.id),
                file_set_id: row.file_set_id.map(ResourceId::new),
                file_identifier: row.file_identifier,
                original_filename: row.original_filename,
                mime_type: row.mime_type,
                size_bytes: row.size_bytes,
                created_at: row.created_at,
                updated_at: row.updated_at,
            })
            .collect())
    }

    /// Fetch raw rows for `ids`, optionally restricted to members carrying `tag`.
    async fn fetch_rows(
        &self,
        ids: &[&str],
        tag: Option<&FileUse>,
    ) -> StoreResult<Vec<FileMetadataRow>> {
        let mut rows = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(MAX_IDS_PER_QUERY) {
            let mut builder = QueryBuilder::<Sqlite>::new("SELECT ");
            builder.push(FILE_METADATA_COLUMNS);
            builder.push(" FROM file_metadata fm");
            if let Some(tag) = tag {
                builder.push(
                    " JOIN file_metadata_uses u ON u.file_metadata_id = fm.id AND u.use_uri = ",
                );
                builder.push_bind(tag.as_str().to_string());
            }
            builder.push(" WHERE fm.id IN (");
            let mut separated = builder.separated(", ");
            for id in chunk {
                separated.push_bind(id.to_string());
            }
            separated.push_unseparated(")");

            let mut found: Vec<FileMetadataRow> = builder
                .build_query_as()
                .fetch_all(&*self.db)
                .await
                .map_err(unavailable(Backend::Resource))?;
            rows.append(&mut found);
        }
        Ok(rows)
    }
}

#[async_trait]
impl ResourceStore for SqliteResourceStore {
    async fn fetch_by_id(&self, id: &ResourceId) -> StoreResult<Option<FileMetadata>> {
        let rows = self.fetch_rows(&[id.as_str()], None).await?;
        if rows.is_empty() {
            debug!("resource {} not found", id);
        }
        Ok(self.hydrate(rows).await?.into_iter().next())
    }

    async fn fetch_by_alternate_identifier(
        &self,
        alt_id: &AlternateId,
    ) -> StoreResult<Option<FileMetadata>> {
        let target = sqlx::query_scalar::<_, String>(
            "SELECT file_metadata_id FROM file_metadata_alternate_ids WHERE alternate_id = ?",
        )
        .bind(alt_id.as_str())
        .fetch_optional(&*self.db)
        .await
        .map_err(unavailable(Backend::Resource))?;

        match target {
            Some(id) => self.fetch_by_id(&ResourceId::new(id)).await,
            None => {
                debug!("alternate identifier {} not indexed", alt_id);
                Ok(None)
            }
        }
    }

    async fn fetch_many_by_ids(&self, ids: &[ResourceId]) -> StoreResult<Vec<FileMetadata>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let unique: Vec<&str> = ids
            .iter()
            .map(ResourceId::as_str)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let rows = self.fetch_rows(&unique, None).await?;
        debug!("resource batch: {} requested, {} found", ids.len(), rows.len());
        self.hydrate(rows).await
    }

    async fn fetch_members_with_use(
        &self,
        parent: &FileSet,
        tag: &FileUse,
    ) -> StoreResult<Vec<FileMetadata>> {
        if parent.file_ids.is_empty() {
            return Ok(Vec::new());
        }
        let members: Vec<&str> = parent
            .file_ids
            .iter()
            .map(ResourceId::as_str)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let rows = self.fetch_rows(&members, Some(tag)).await?;
        debug!(
            "file set {}: {} of {} members tagged {}",
            parent.id,
            rows.len(),
            parent.file_ids.len(),
            tag
        );

        let mut matched = self.hydrate(rows).await?;
        let position: HashMap<&str, usize> = parent
            .file_ids
            .iter()
            .enumerate()
            .rev()
            .map(|(idx, id)| (id.as_str(), idx))
            .collect();
        matched.sort_by_key(|file| position.get(file.id.as_str()).copied().unwrap_or(usize::MAX));
        Ok(matched)
    }

    async fn fetch_file_set(&self, id: &ResourceId) -> StoreResult<Option<FileSet>> {
        let row = sqlx::query_as::<_, FileSetRow>(
            "SELECT id, title, updated_at FROM file_sets WHERE id = ?",
        )
        .bind(id.as_str())
        .fetch_optional(&*self.db)
        .await
        .map_err(unavailable(Backend::Resource))?;

        let Some(row) = row else {
            debug!("file set {} not found", id);
            return Ok(None);
        };

        let file_ids = sqlx::query_scalar::<_, String>(
            "SELECT file_metadata_id FROM file_set_members
             WHERE file_set_id = ? ORDER BY position ASC",
        )
        .bind(&row.id)
        .fetch_all(&*self.db)
        .await
        .map_err(unavailable(Backend::Resource))?;

        Ok(Some(FileSet {
            id: ResourceId::new(row.id),
            title: row.title,
            file_ids: file_ids.into_iter().map(ResourceId::new).collect(),
            updated_at: row.updated_at,
        }))
    }
}
