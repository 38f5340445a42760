//! The uniform return contract of the resolver.

use crate::models::{
    file_metadata::FileMetadata,
    file_use::FileUse,
    identifier::{Backend, Identifier},
    legacy_file::LegacyFile,
};
use serde::{Deserialize, Serialize};

/// Which backend's native shape a caller wants back.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecordShape {
    Legacy,
    #[default]
    Resource,
}

impl RecordShape {
    pub fn backend(self) -> Backend {
        match self {
            RecordShape::Legacy => Backend::Legacy,
            RecordShape::Resource => Backend::Resource,
        }
    }
}

/// A resolved file record in the shape the caller asked for.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum FileRecord {
    Legacy(LegacyFile),
    Resource(FileMetadata),
}

impl FileRecord {
    pub fn shape(&self) -> RecordShape {
        match self {
            FileRecord::Legacy(_) => RecordShape::Legacy,
            FileRecord::Resource(_) => RecordShape::Resource,
        }
    }

    /// Underlying id string; identical in both schemes.
    pub fn id_str(&self) -> &str {
        match self {
            FileRecord::Legacy(file) => file.id.as_str(),
            FileRecord::Resource(file) => file.id.as_str(),
        }
    }

    /// The record's id, tagged with the scheme of the backend it came from.
    pub fn identifier(&self) -> Identifier {
        match self {
            FileRecord::Legacy(file) => Identifier::Legacy(file.id.clone()),
            FileRecord::Resource(file) => Identifier::Resource(file.id.clone()),
        }
    }

    /// Rebuild the record in `shape` from its own fields alone.
    ///
    /// Only used when the backend owning `shape` holds no copy of the entity.
    pub fn convert_to(self, shape: RecordShape) -> FileRecord {
        match (self, shape) {
            (FileRecord::Legacy(file), RecordShape::Resource) => {
                FileRecord::Resource(FileMetadata::from_legacy(&file))
            }
            (FileRecord::Resource(file), RecordShape::Legacy) => {
                FileRecord::Legacy(LegacyFile::from_resource(&file))
            }
            (same, _) => same,
        }
    }

    /// Use tags of the record; legacy types double as uses.
    pub fn uses(&self) -> &[FileUse] {
        match self {
            FileRecord::Legacy(file) => &file.types,
            FileRecord::Resource(file) => &file.uses,
        }
    }

    pub fn into_legacy(self) -> Option<LegacyFile> {
        match self {
            FileRecord::Legacy(file) => Some(file),
            FileRecord::Resource(_) => None,
        }
    }

    pub fn into_resource(self) -> Option<FileMetadata> {
        match self {
            FileRecord::Resource(file) => Some(file),
            FileRecord::Legacy(_) => None,
        }
    }
}
