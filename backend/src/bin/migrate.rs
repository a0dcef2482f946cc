//! Apply pending schema migrations to the configured PostgreSQL database.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, eyre};
use content_backend::config::BackendSettings;
use content_backend::outbound::persistence::run_pending_migrations;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

/// `migrate` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "migrate",
    about = "Apply pending content backend schema migrations",
    version
)]
struct CliArgs {
    /// Database connection URL. Falls back to `CONTENT_BACKEND_DATABASE_URL`.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::parse();
    let database_url = match args.database_url {
        Some(url) => url,
        None => BackendSettings::load_from_iter([OsString::from("migrate")])
            .map_err(|err| eyre!("load backend settings: {err}"))?
            .database_url
            .ok_or_else(|| {
                eyre!("no database URL: pass --database-url or set CONTENT_BACKEND_DATABASE_URL")
            })?,
    };

    let applied = run_pending_migrations(&database_url)
        .await
        .wrap_err("run migrations")?;
    info!(count = applied.len(), "schema up to date");
    Ok(())
}
