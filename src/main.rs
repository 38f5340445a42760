use anyhow::Result;
use axum::Router;
use file_metadata_resolver::{
    config::AppConfig,
    db::{self, Schema},
    handlers::AppState,
    routes::routes,
    services::{
        legacy_store::SqliteLegacyStore, resolver::MetadataResolver,
        resource_store::SqliteResourceStore,
    },
};
use std::{io::ErrorKind, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config + migrate flag ---
    let (cfg, migrate) = AppConfig::from_env_and_args()?;

    tracing::info!("Starting file-metadata-resolver with config: {:?}", cfg);

    // --- Open both backends ---
    let legacy_db = Arc::new(db::connect(&cfg.legacy_database_url, 5).await?);
    let resource_db = Arc::new(db::connect(&cfg.resource_database_url, 5).await?);

    // --- Handle migration mode ---
    if migrate {
        db::run_migrations(&legacy_db, Schema::Legacy).await?;
        db::run_migrations(&resource_db, Schema::Resource).await?;
        tracing::info!("Database migration complete.");
        return Ok(()); // exit after migration
    }

    // --- Initialize resolver ---
    let resolver = MetadataResolver::new(
        Arc::new(SqliteLegacyStore::new(legacy_db.clone())),
        Arc::new(SqliteResourceStore::new(resource_db.clone())),
    );
    let state = AppState {
        resolver,
        legacy_db,
        resource_db,
    };

    // --- Build router ---
    let app: Router = routes::routes().with_state(state);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
