//! Dual-backend file metadata resolver.
//!
//! Reads file-level metadata during a migration from a legacy,
//! string-keyed object store to a typed resource store. See
//! [`services::resolver::MetadataResolver`] for the query surface.

pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
