//! Represents the parent aggregate that owns file metadata records.

use crate::models::identifier::ResourceId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A file set groups the files of one deposited object.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FileSet {
    pub id: ResourceId,

    pub title: Option<String>,

    /// Member file ids in stored order.
    pub file_ids: Vec<ResourceId>,

    pub updated_at: DateTime<Utc>,
}
