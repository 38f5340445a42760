//! Represents file-level metadata held by the resource store.

use crate::models::{
    file_use::FileUse,
    identifier::{AlternateId, ResourceId, to_resource_id},
    legacy_file::LegacyFile,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata for one file attached to a file set.
///
/// The resource does not hold the bytes themselves; `file_identifier`
/// references the stored binary.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FileMetadata {
    /// Primary resource identifier.
    pub id: ResourceId,

    /// Independently minted identifiers indexed alongside the primary id.
    pub alternate_ids: Vec<AlternateId>,

    /// Owning file set, when the store records it.
    pub file_set_id: Option<ResourceId>,

    /// Reference to the binary content.
    pub file_identifier: String,

    /// Filename as originally uploaded.
    pub original_filename: Option<String>,

    /// MIME type.
    pub mime_type: Option<String>,

    /// Size in bytes.
    pub size_bytes: i64,

    /// Roles this file plays within its file set.
    pub uses: Vec<FileUse>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FileMetadata {
    /// Build the resource shape of a legacy record that has no resource copy.
    ///
    /// The legacy store keeps neither alternate ids nor the parent link, so
    /// both come back empty.
    pub fn from_legacy(legacy: &LegacyFile) -> Self {
        Self {
            id: to_resource_id(&legacy.id),
            alternate_ids: Vec::new(),
            file_set_id: None,
            file_identifier: legacy.content_uri.clone(),
            original_filename: legacy.original_name.clone(),
            mime_type: legacy.mime_type.clone(),
            size_bytes: legacy.size_bytes,
            uses: legacy.types.clone(),
            created_at: legacy.date_modified,
            updated_at: legacy.date_modified,
        }
    }

    pub fn has_use(&self, tag: &FileUse) -> bool {
        self.uses.iter().any(|u| u == tag)
    }
}
