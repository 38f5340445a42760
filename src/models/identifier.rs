//! Identifier schemes used by the two backends.
//!
//! The legacy store names files with plain strings; the resource store wraps
//! the same string in a typed `ResourceId`. Both name the same entity, so
//! translation is a string-preserving mapping with no lookups involved.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which backend an identifier (or a record) belongs to.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Legacy,
    Resource,
}

impl Backend {
    /// The backend on the other side of the migration.
    pub fn opposite(self) -> Self {
        match self {
            Backend::Legacy => Backend::Resource,
            Backend::Resource => Backend::Legacy,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Backend::Legacy => "legacy",
            Backend::Resource => "resource",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Plain string identifier used by the legacy object store.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct LegacyId(String);

impl LegacyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Typed identifier used by the resource store.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Secondary identifier minted independently of the primary resource id.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct AlternateId(String);

impl AlternateId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! string_id_impls {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl From<&str> for $ty {
                fn from(value: &str) -> Self {
                    Self::new(value)
                }
            }

            impl From<String> for $ty {
                fn from(value: String) -> Self {
                    Self::new(value)
                }
            }
        )*
    };
}

string_id_impls!(LegacyId, ResourceId, AlternateId);

/// Convert a legacy id into the resource scheme.
pub fn to_resource_id(id: &LegacyId) -> ResourceId {
    ResourceId(id.0.clone())
}

/// Convert a resource id into the legacy scheme.
pub fn to_legacy_id(id: &ResourceId) -> LegacyId {
    LegacyId(id.0.clone())
}

/// An identifier tagged with the scheme it was issued under.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(tag = "scheme", content = "id", rename_all = "lowercase")]
pub enum Identifier {
    Legacy(LegacyId),
    Resource(ResourceId),
}

impl Identifier {
    /// Build an identifier from an external scheme label.
    ///
    /// Returns `None` for labels other than `legacy` and `resource`.
    pub fn parse(scheme: &str, raw: impl Into<String>) -> Option<Self> {
        match scheme.to_ascii_lowercase().as_str() {
            "legacy" => Some(Identifier::Legacy(LegacyId::new(raw))),
            "resource" => Some(Identifier::Resource(ResourceId::new(raw))),
            _ => None,
        }
    }

    pub fn scheme(&self) -> Backend {
        match self {
            Identifier::Legacy(_) => Backend::Legacy,
            Identifier::Resource(_) => Backend::Resource,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Identifier::Legacy(id) => id.as_str(),
            Identifier::Resource(id) => id.as_str(),
        }
    }

    pub fn to_legacy(&self) -> LegacyId {
        match self {
            Identifier::Legacy(id) => id.clone(),
            Identifier::Resource(id) => to_legacy_id(id),
        }
    }

    pub fn to_resource(&self) -> ResourceId {
        match self {
            Identifier::Legacy(id) => to_resource_id(id),
            Identifier::Resource(id) => id.clone(),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.scheme(), self.as_str())
    }
}

impl From<LegacyId> for Identifier {
    fn from(value: LegacyId) -> Self {
        Identifier::Legacy(value)
    }
}

impl From<ResourceId> for Identifier {
    fn from(value: ResourceId) -> Self {
        Identifier::Resource(value)
    }
}
