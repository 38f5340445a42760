#![allow(dead_code)]
//! Shared fixtures: in-memory SQLite backends, seeding helpers and a
//! probing adapter wrapper that counts calls and can simulate outages.

use async_trait::async_trait;
use chrono::Utc;
use file_metadata_resolver::{
    db::{self, Schema},
    models::{
        file_metadata::FileMetadata,
        file_set::FileSet,
        file_use::FileUse,
        identifier::{AlternateId, Backend, LegacyId, ResourceId},
        legacy_file::LegacyFile,
    },
    services::{
        StoreError, StoreResult,
        legacy_store::{LegacyStore, SqliteLegacyStore},
        resolver::MetadataResolver,
        resource_store::{ResourceStore, SqliteResourceStore},
    },
};
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

pub const ORIGINAL: &str = FileUse::ORIGINAL_FILE;
pub const EXTRACTED: &str = FileUse::EXTRACTED_TEXT;
pub const THUMBNAIL: &str = FileUse::THUMBNAIL_IMAGE;

/// Wraps a store, counting calls and optionally failing every call.
pub struct CountingStore<S> {
    inner: S,
    backend: Backend,
    calls: AtomicUsize,
    down: AtomicBool,
}

impl<S> CountingStore<S> {
    pub fn new(inner: S, backend: Backend) -> Self {
        Self {
            inner,
            backend,
            calls: AtomicUsize::new(0),
            down: AtomicBool::new(false),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn take_down(&self) {
        self.down.store(true, Ordering::SeqCst);
    }

    fn enter(&self) -> StoreResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.down.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                backend: self.backend,
                source: sqlx::Error::PoolTimedOut,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl<S: LegacyStore> LegacyStore for CountingStore<S> {
    async fn fetch_by_id(&self, id: &LegacyId) -> StoreResult<Option<LegacyFile>> {
        self.enter()?;
        self.inner.fetch_by_id(id).await
    }

    async fn fetch_many_by_ids(&self, ids: &[LegacyId]) -> StoreResult<Vec<LegacyFile>> {
        self.enter()?;
        self.inner.fetch_many_by_ids(ids).await
    }
}

#[async_trait]
impl<S: ResourceStore> ResourceStore for CountingStore<S> {
    async fn fetch_by_id(&self, id: &ResourceId) -> StoreResult<Option<FileMetadata>> {
        self.enter()?;
        self.inner.fetch_by_id(id).await
    }

    async fn fetch_by_alternate_identifier(
        &self,
        alt_id: &AlternateId,
    ) -> StoreResult<Option<FileMetadata>> {
        self.enter()?;
        self.inner.fetch_by_alternate_identifier(alt_id).await
    }

    async fn fetch_many_by_ids(&self, ids: &[ResourceId]) -> StoreResult<Vec<FileMetadata>> {
        self.enter()?;
        self.inner.fetch_many_by_ids(ids).await
    }

    async fn fetch_members_with_use(
        &self,
        parent: &FileSet,
        tag: &FileUse,
    ) -> StoreResult<Vec<FileMetadata>> {
        self.enter()?;
        self.inner.fetch_members_with_use(parent, tag).await
    }

    async fn fetch_file_set(&self, id: &ResourceId) -> StoreResult<Option<FileSet>> {
        self.enter()?;
        self.inner.fetch_file_set(id).await
    }
}

pub struct Fixture {
    pub legacy_db: Arc<SqlitePool>,
    pub resource_db: Arc<SqlitePool>,
    pub legacy: Arc<CountingStore<SqliteLegacyStore>>,
    pub resource: Arc<CountingStore<SqliteResourceStore>>,
    pub resolver: MetadataResolver,
}

impl Fixture {
    pub async fn new() -> Self {
        let legacy_db = Arc::new(memory_pool().await);
        let resource_db = Arc::new(memory_pool().await);
        db::run_migrations(&legacy_db, Schema::Legacy)
            .await
            .expect("legacy schema");
        db::run_migrations(&resource_db, Schema::Resource)
            .await
            .expect("resource schema");

        let legacy = Arc::new(CountingStore::new(
            SqliteLegacyStore::new(legacy_db.clone()),
            Backend::Legacy,
        ));
        let resource = Arc::new(CountingStore::new(
            SqliteResourceStore::new(resource_db.clone()),
            Backend::Resource,
        ));
        let resolver = MetadataResolver::new(legacy.clone(), resource.clone());

        Self {
            legacy_db,
            resource_db,
            legacy,
            resource,
            resolver,
        }
    }

    pub fn adapter_calls(&self) -> usize {
        self.legacy.calls() + self.resource.calls()
    }

    pub async fn legacy_file(&self, id: &str, name: &str, mime: &str, types: &[&str]) {
        sqlx::query(
            "INSERT INTO legacy_files (id, content_uri, original_name, mime_type, size_bytes, date_modified)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(format!("fedora:/binaries/{}", id))
        .bind(name)
        .bind(mime)
        .bind(name.len() as i64)
        .bind(Utc::now())
        .execute(&*self.legacy_db)
        .await
        .expect("insert legacy file");

        for type_uri in types {
            sqlx::query("INSERT INTO legacy_file_types (file_id, type_uri) VALUES (?, ?)")
                .bind(id)
                .bind(*type_uri)
                .execute(&*self.legacy_db)
                .await
                .expect("insert legacy type");
        }
    }

    pub async fn file_metadata(
        &self,
        id: &str,
        file_set_id: Option<&str>,
        name: &str,
        mime: &str,
        uses: &[&str],
        alternate_ids: &[&str],
    ) {
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO file_metadata (id, file_set_id, file_identifier, original_filename,
                                        mime_type, size_bytes, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(file_set_id)
        .bind(format!("disk:///binaries/{}", id))
        .bind(name)
        .bind(mime)
        .bind(name.len() as i64)
        .bind(now)
        .bind(now)
        .execute(&*self.resource_db)
        .await
        .expect("insert file metadata");

        for use_uri in uses {
            sqlx::query("INSERT INTO file_metadata_uses (file_metadata_id, use_uri) VALUES (?, ?)")
                .bind(id)
                .bind(*use_uri)
                .execute(&*self.resource_db)
                .await
                .expect("insert use");
        }
        for alt in alternate_ids {
            sqlx::query(
                "INSERT INTO file_metadata_alternate_ids (alternate_id, file_metadata_id) VALUES (?, ?)",
            )
            .bind(*alt)
            .bind(id)
            .execute(&*self.resource_db)
            .await
            .expect("insert alternate id");
        }
    }

    /// Insert a file set; members are listed by id and need not exist.
    pub async fn file_set(&self, id: &str, members: &[&str]) -> FileSet {
        sqlx::query("INSERT INTO file_sets (id, title, updated_at) VALUES (?, ?, ?)")
            .bind(id)
            .bind(format!("File set {}", id))
            .bind(Utc::now())
            .execute(&*self.resource_db)
            .await
            .expect("insert file set");

        for (position, member) in members.iter().enumerate() {
            sqlx::query(
                "INSERT INTO file_set_members (file_set_id, file_metadata_id, position) VALUES (?, ?, ?)",
            )
            .bind(id)
            .bind(*member)
            .bind(position as i64)
            .execute(&*self.resource_db)
            .await
            .expect("insert member");
        }

        self.resource
            .fetch_file_set(&ResourceId::new(id))
            .await
            .expect("load file set")
            .expect("file set exists")
    }

    /// Three files of one file set, each carrying a different use tag, stored
    /// in both backends.
    pub async fn three_file_set(&self) -> FileSet {
        let files = [
            ("pdf1", "sample-file.pdf", "application/pdf", ORIGINAL),
            ("txt1", "updated-file.txt", "text/plain", EXTRACTED),
            ("png1", "world.png", "image/png", THUMBNAIL),
        ];
        let parent = self.file_set("fileset_id", &["pdf1", "txt1", "png1"]).await;
        for (id, name, mime, tag) in files {
            self.file_metadata(id, Some("fileset_id"), name, mime, &[tag], &[])
                .await;
            self.legacy_file(id, name, mime, &[tag]).await;
        }
        parent
    }
}

/// Single-connection in-memory pool; the database lives as long as the
/// connection does.
pub async fn memory_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite")
}
