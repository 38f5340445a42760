//! Read-side services: one adapter per backend plus the resolver that
//! stitches them together.

pub mod legacy_store;
pub mod resolver;
pub mod resource_store;

use crate::models::identifier::Backend;
use thiserror::Error;

/// Transport-level failure raised by a store adapter.
///
/// A missing record is never a `StoreError`; adapters report absence as
/// `None` or by omission.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{backend} backend unavailable: {source}")]
    Unavailable {
        backend: Backend,
        #[source]
        source: sqlx::Error,
    },
}

impl StoreError {
    pub fn backend(&self) -> Backend {
        match self {
            StoreError::Unavailable { backend, .. } => *backend,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Map a sqlx error onto the store error kind for `backend`.
pub(crate) fn unavailable(backend: Backend) -> impl Fn(sqlx::Error) -> StoreError {
    move |source| StoreError::Unavailable { backend, source }
}
