//! Data models for both sides of the migration.
//!
//! `LegacyFile` mirrors the flat records held by the legacy object store;
//! `FileMetadata` and `FileSet` mirror the typed resources of the newer
//! store. `FileRecord` is the single shape handed back to callers.

pub mod file_metadata;
pub mod file_set;
pub mod file_use;
pub mod identifier;
pub mod legacy_file;
pub mod record;
