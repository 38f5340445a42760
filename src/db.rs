//! SQLite pool setup and schema migrations for both backends.

use anyhow::{Context, Result};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::{path::Path, str::FromStr};

const LEGACY_SCHEMA: &str = include_str!("../migrations/legacy/0001_init.sql");
const RESOURCE_SCHEMA: &str = include_str!("../migrations/resource/0001_init.sql");

/// Which database a migration targets.
#[derive(Clone, Copy, Debug)]
pub enum Schema {
    Legacy,
    Resource,
}

impl Schema {
    fn sql(self) -> &'static str {
        match self {
            Schema::Legacy => LEGACY_SCHEMA,
            Schema::Resource => RESOURCE_SCHEMA,
        }
    }
}

/// Open a pool for `url`, creating the database file and its parent
/// directory when missing.
pub async fn connect(url: &str, max_connections: u32) -> Result<SqlitePool> {
    let db_path = url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .trim_start_matches("file:");
    if !db_path.starts_with(":memory:") {
        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating directory {}", parent.display()))?;
                tracing::info!("Created missing directory {:?}", parent);
            }
        }
    }

    let options = SqliteConnectOptions::from_str(url)
        .with_context(|| format!("parsing database URL `{}`", url))?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .with_context(|| format!("connecting to {}", url))
}

/// Apply the embedded schema for `schema` statement by statement.
pub async fn run_migrations(db: &SqlitePool, schema: Schema) -> Result<()> {
    let statements = schema
        .sql()
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>();

    tracing::info!(
        "Running {} {:?} migration statements...",
        statements.len(),
        schema
    );

    for stmt in statements {
        tracing::debug!("Executing migration SQL: {}", stmt);
        sqlx::query(stmt)
            .execute(db)
            .await
            .with_context(|| format!("running {:?} migration", schema))?;
    }

    Ok(())
}
