//! Semantic role labels attached to files within a file set.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A use tag such as "original file" or "thumbnail image".
///
/// Tags are URIs. The well-known PCDM roles have constants; any other URI
/// is carried verbatim.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct FileUse(String);

impl FileUse {
    pub const ORIGINAL_FILE: &'static str = "http://pcdm.org/use#OriginalFile";
    pub const EXTRACTED_TEXT: &'static str = "http://pcdm.org/use#ExtractedText";
    pub const THUMBNAIL_IMAGE: &'static str = "http://pcdm.org/use#ThumbnailImage";

    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn original_file() -> Self {
        Self::new(Self::ORIGINAL_FILE)
    }

    pub fn extracted_text() -> Self {
        Self::new(Self::EXTRACTED_TEXT)
    }

    pub fn thumbnail_image() -> Self {
        Self::new(Self::THUMBNAIL_IMAGE)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileUse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FileUse {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
