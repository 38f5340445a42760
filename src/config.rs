use anyhow::{Context, Result};
use clap::Parser;
use std::env;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub legacy_database_url: String,
    pub resource_database_url: String,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Read-only file metadata resolver")]
pub struct Args {
    /// Host to bind to (overrides RESOLVER_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides RESOLVER_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Legacy store database URL (overrides RESOLVER_LEGACY_DATABASE_URL)
    #[arg(long)]
    pub legacy_database_url: Option<String>,

    /// Resource store database URL (overrides RESOLVER_RESOURCE_DATABASE_URL)
    #[arg(long)]
    pub resource_database_url: Option<String>,

    /// Apply both schemas and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        Self::from_args(Args::parse())
    }

    /// Merge already-parsed CLI args over the environment.
    pub fn from_args(args: Args) -> Result<(Self, bool)> {
        // --- Environment fallback ---
        let env_host = env::var("RESOLVER_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("RESOLVER_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing RESOLVER_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3000,
            Err(err) => return Err(err).context("reading RESOLVER_PORT"),
        };
        let env_legacy = env::var("RESOLVER_LEGACY_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/legacy.db".into());
        let env_resource = env::var("RESOLVER_RESOURCE_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/resource.db".into());

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            legacy_database_url: args.legacy_database_url.unwrap_or(env_legacy),
            resource_database_url: args.resource_database_url.unwrap_or(env_resource),
        };

        Ok((cfg, args.migrate))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
