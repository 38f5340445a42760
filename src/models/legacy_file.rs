//! Represents a file record as stored by the legacy object store.

use crate::models::{
    file_metadata::FileMetadata,
    file_use::FileUse,
    identifier::{LegacyId, to_legacy_id},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A flat, ungrouped file record keyed by a plain string id.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LegacyFile {
    /// Legacy identifier (plain string, scheme-free).
    pub id: LegacyId,

    /// Where the binary content lives.
    pub content_uri: String,

    /// Filename as originally uploaded.
    pub original_name: Option<String>,

    /// MIME type.
    pub mime_type: Option<String>,

    /// Size in bytes.
    pub size_bytes: i64,

    /// RDF types attached to the record; the use tags live here.
    pub types: Vec<FileUse>,

    /// Last modification time recorded by the legacy store.
    pub date_modified: DateTime<Utc>,
}

impl LegacyFile {
    /// Build the legacy shape of a resource that has no legacy copy.
    pub fn from_resource(resource: &FileMetadata) -> Self {
        Self {
            id: to_legacy_id(&resource.id),
            content_uri: resource.file_identifier.clone(),
            original_name: resource.original_filename.clone(),
            mime_type: resource.mime_type.clone(),
            size_bytes: resource.size_bytes,
            types: resource.uses.clone(),
            date_modified: resource.updated_at,
        }
    }
}
