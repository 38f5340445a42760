//! src/services/resolver.rs
//!
//! MetadataResolver answers file-metadata queries across the legacy store
//! and the resource store. Callers hand it identifiers from either scheme
//! (or a parent file set plus a use tag) and the record shape they want
//! back; the resolver works out which backend holds the entity.
//!
//! Failure policy:
//! - `find_by` and `find_by_alternate_identifier` return `NotFound` when
//!   nothing resolves.
//! - `find_many_by_ids` and `find_many_by_use` never report absence; ids
//!   that do not resolve are left out of the result.
//! - A `StoreError` from either adapter aborts the call, batch included.

use crate::{
    models::{
        file_set::FileSet,
        file_use::FileUse,
        identifier::{AlternateId, Backend, Identifier, LegacyId, ResourceId},
        record::{FileRecord, RecordShape},
    },
    services::{StoreError, legacy_store::LegacyStore, resource_store::ResourceStore},
};
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("no file metadata found for `{id}`")]
    NotFound { id: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type ResolverResult<T> = Result<T, ResolverError>;

/// Records fetched from one backend, keyed by their id string.
type FoundRecords = HashMap<String, FileRecord>;

/// Stateless query front-end over both backends.
#[derive(Clone)]
pub struct MetadataResolver {
    legacy: Arc<dyn LegacyStore>,
    resource: Arc<dyn ResourceStore>,
}

impl MetadataResolver {
    pub fn new(legacy: Arc<dyn LegacyStore>, resource: Arc<dyn ResourceStore>) -> Self {
        Self { legacy, resource }
    }

    /// Resolve a single identifier.
    ///
    /// The backend named by the id's scheme is tried first, then the other
    /// one with the translated id.
    pub async fn find_by(
        &self,
        id: &Identifier,
        shape: RecordShape,
    ) -> ResolverResult<FileRecord> {
        let scheme = id.scheme();
        let (found, via_fallback) = match self.fetch_one_from(scheme, id).await? {
            Some(record) => (Some(record), false),
            None => (self.fetch_one_from(scheme.opposite(), id).await?, true),
        };

        match found {
            // The scheme backend already missed; it has no copy to offer.
            Some(native) if via_fallback && shape.backend() == scheme => {
                Ok(native.convert_to(shape))
            }
            Some(native) => Ok(self.reshape(native, shape).await?),
            None => {
                debug!("find_by: {} did not resolve in either backend", id);
                Err(ResolverError::NotFound {
                    id: id.as_str().to_string(),
                })
            }
        }
    }

    /// Resolve through the resource store's alternate-identifier index.
    pub async fn find_by_alternate_identifier(
        &self,
        alt_id: &AlternateId,
        shape: RecordShape,
    ) -> ResolverResult<FileRecord> {
        match self.resource.fetch_by_alternate_identifier(alt_id).await? {
            Some(resource) => Ok(self.reshape(FileRecord::Resource(resource), shape).await?),
            None => Err(ResolverError::NotFound {
                id: alt_id.as_str().to_string(),
            }),
        }
    }

    /// Resolve a batch of identifiers, which may mix schemes.
    ///
    /// Every input position that resolves contributes one record, so
    /// repeated ids come back repeated. Unresolved ids are dropped without
    /// trace. Empty input performs no lookups.
    pub async fn find_many_by_ids(
        &self,
        ids: &[Identifier],
        shape: RecordShape,
    ) -> ResolverResult<Vec<FileRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let natives = self.resolve_natives(ids).await?;
        debug!(
            "find_many_by_ids: {} requested, {} resolved",
            ids.len(),
            natives.len()
        );

        Ok(self.reshape_many(natives, shape).await?)
    }

    /// Every member of `parent` whose use set contains `tag`.
    ///
    /// Members the resource store reports as tagged are taken as they are.
    /// The rest are resolved like `find_many_by_ids` and kept when their
    /// uses carry `tag`, so a member still held only by the legacy store is
    /// matched on its types. A resource copy wins over a legacy one.
    ///
    /// Output follows the parent's member order; a member listed twice
    /// comes back twice.
    pub async fn find_many_by_use(
        &self,
        parent: &FileSet,
        tag: &FileUse,
        shape: RecordShape,
    ) -> ResolverResult<Vec<FileRecord>> {
        if parent.file_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut matched: FoundRecords = self
            .resource
            .fetch_members_with_use(parent, tag)
            .await?
            .into_iter()
            .map(|file| (file.id.as_str().to_string(), FileRecord::Resource(file)))
            .collect();

        let rest: Vec<Identifier> = parent
            .file_ids
            .iter()
            .filter(|id| !matched.contains_key(id.as_str()))
            .cloned()
            .map(Identifier::Resource)
            .collect();
        if !rest.is_empty() {
            let others = self.resolve_natives(&rest).await?;
            matched.extend(
                others
                    .into_iter()
                    .filter(|record| record.uses().contains(tag))
                    .map(|record| (record.id_str().to_string(), record)),
            );
        }

        let natives: Vec<FileRecord> = parent
            .file_ids
            .iter()
            .filter_map(|id| matched.get(id.as_str()).cloned())
            .collect();
        debug!(
            "find_many_by_use: file set {} has {} members tagged {}",
            parent.id,
            natives.len(),
            tag
        );
        Ok(self.reshape_many(natives, shape).await?)
    }

    /// Load a parent file set from the resource store.
    pub async fn find_file_set(&self, id: &ResourceId) -> ResolverResult<FileSet> {
        self.resource
            .fetch_file_set(id)
            .await?
            .ok_or_else(|| ResolverError::NotFound {
                id: id.as_str().to_string(),
            })
    }

    /// Resolve `ids` in their native shapes, one entry per input position
    /// that resolves.
    ///
    /// Ids are fetched in one batch per scheme; misses are retried against
    /// the other backend with the translated id.
    async fn resolve_natives(&self, ids: &[Identifier]) -> Result<Vec<FileRecord>, StoreError> {
        let (legacy_ids, resource_ids): (Vec<Identifier>, Vec<Identifier>) = ids
            .iter()
            .cloned()
            .partition(|id| id.scheme() == Backend::Legacy);

        let (mut legacy_found, mut resource_found) = futures::try_join!(
            self.fetch_many_from(Backend::Legacy, &legacy_ids),
            self.fetch_many_from(Backend::Resource, &resource_ids),
        )?;

        let resolved = |id: &Identifier| {
            legacy_found.contains_key(id.as_str()) || resource_found.contains_key(id.as_str())
        };
        let legacy_misses: Vec<Identifier> =
            legacy_ids.into_iter().filter(|id| !resolved(id)).collect();
        let resource_misses: Vec<Identifier> =
            resource_ids.into_iter().filter(|id| !resolved(id)).collect();

        let (from_resource, from_legacy) = futures::try_join!(
            self.fetch_many_from(Backend::Resource, &legacy_misses),
            self.fetch_many_from(Backend::Legacy, &resource_misses),
        )?;
        resource_found.extend(from_resource);
        legacy_found.extend(from_legacy);

        Ok(ids
            .iter()
            .filter_map(|id| {
                let (primary, secondary) = match id.scheme() {
                    Backend::Legacy => (&legacy_found, &resource_found),
                    Backend::Resource => (&resource_found, &legacy_found),
                };
                primary
                    .get(id.as_str())
                    .or_else(|| secondary.get(id.as_str()))
                    .cloned()
            })
            .collect())
    }

    async fn fetch_one_from(
        &self,
        backend: Backend,
        id: &Identifier,
    ) -> Result<Option<FileRecord>, StoreError> {
        Ok(match backend {
            Backend::Legacy => self
                .legacy
                .fetch_by_id(&id.to_legacy())
                .await?
                .map(FileRecord::Legacy),
            Backend::Resource => self
                .resource
                .fetch_by_id(&id.to_resource())
                .await?
                .map(FileRecord::Resource),
        })
    }

    async fn fetch_many_from(
        &self,
        backend: Backend,
        ids: &[Identifier],
    ) -> Result<FoundRecords, StoreError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let records: Vec<FileRecord> = match backend {
            Backend::Legacy => {
                let legacy_ids: Vec<LegacyId> = ids.iter().map(Identifier::to_legacy).collect();
                self.legacy
                    .fetch_many_by_ids(&legacy_ids)
                    .await?
                    .into_iter()
                    .map(FileRecord::Legacy)
                    .collect()
            }
            Backend::Resource => {
                let resource_ids: Vec<ResourceId> =
                    ids.iter().map(Identifier::to_resource).collect();
                self.resource
                    .fetch_many_by_ids(&resource_ids)
                    .await?
                    .into_iter()
                    .map(FileRecord::Resource)
                    .collect()
            }
        };
        Ok(records
            .into_iter()
            .map(|record| (record.id_str().to_string(), record))
            .collect())
    }

    /// Present `native` in `shape`, preferring the copy held by the backend
    /// that owns that shape.
    async fn reshape(
        &self,
        native: FileRecord,
        shape: RecordShape,
    ) -> Result<FileRecord, StoreError> {
        if native.shape() == shape {
            return Ok(native);
        }
        let id = native.identifier();
        match self.fetch_one_from(shape.backend(), &id).await? {
            Some(copy) => Ok(copy),
            None => {
                debug!("{} has no {} copy; converting", id, shape.backend());
                Ok(native.convert_to(shape))
            }
        }
    }

    async fn reshape_many(
        &self,
        natives: Vec<FileRecord>,
        shape: RecordShape,
    ) -> Result<Vec<FileRecord>, StoreError> {
        let pending: Vec<Identifier> = natives
            .iter()
            .filter(|record| record.shape() != shape)
            .map(FileRecord::identifier)
            .collect();
        if pending.is_empty() {
            return Ok(natives);
        }

        let copies = self.fetch_many_from(shape.backend(), &pending).await?;
        Ok(natives
            .into_iter()
            .map(|native| {
                if native.shape() == shape {
                    return native;
                }
                match copies.get(native.id_str()) {
                    Some(copy) => copy.clone(),
                    None => native.convert_to(shape),
                }
            })
            .collect())
    }
}
