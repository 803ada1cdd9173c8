//! # Database Connection Pool Module
//!
//! Provides the Postgres connection pool and the migration runner.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_library::db::{create_pool, run_migrations};
//!
//! let pool = create_pool(&config.database, &root_span).await?;
//! run_migrations(&pool, &config.database.migrations_path, &root_span).await?;
//! ```

use std::path::Path;

use core_runtime::config::{DatabaseSettings, SslMode};
use core_runtime::logging::{component_span, redact_if_sensitive};
use sqlx::migrate::Migrator;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgSslMode};
use tracing::{info, warn, Instrument, Span};

use crate::error::{LibraryError, Result};

fn pg_ssl_mode(mode: SslMode) -> PgSslMode {
    match mode {
        SslMode::Disable => PgSslMode::Disable,
        SslMode::Allow => PgSslMode::Allow,
        SslMode::Prefer => PgSslMode::Prefer,
        SslMode::Require => PgSslMode::Require,
        SslMode::VerifyCa => PgSslMode::VerifyCa,
        SslMode::VerifyFull => PgSslMode::VerifyFull,
    }
}

/// Translate settings into driver connect options
pub fn connect_options(settings: &DatabaseSettings) -> PgConnectOptions {
    let options = PgConnectOptions::new()
        .host(&settings.host)
        .port(settings.port)
        .username(&settings.username)
        .database(&settings.database)
        .ssl_mode(pg_ssl_mode(settings.ssl_mode));

    if settings.password.is_empty() {
        options
    } else {
        options.password(&settings.password)
    }
}

/// Create a configured Postgres connection pool
///
/// This function:
/// 1. Builds connect options from the settings
/// 2. Creates a connection pool
/// 3. Performs a health check
///
/// Migrations are run separately with [`run_migrations`].
///
/// # Errors
///
/// Returns an error if the server is unreachable, credentials are rejected
/// or the health check fails.
pub async fn create_pool(settings: &DatabaseSettings, parent: &Span) -> Result<PgPool> {
    let span = component_span(parent, "storage/postgres");

    async move {
        info!(
            host = %settings.host,
            port = settings.port,
            database = %settings.database,
            username = %settings.username,
            password = %redact_if_sensitive("password", &settings.password),
            ssl_mode = settings.ssl_mode.as_str(),
            max_connections = settings.max_connections,
            "Creating database connection pool"
        );

        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.acquire_timeout)
            .connect_with(connect_options(settings))
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to create connection pool");
                LibraryError::Database(e)
            })?;

        health_check(&pool).await?;

        info!(connections = pool.size(), "Database connection pool created successfully");
        Ok(pool)
    }
    .instrument(span)
    .await
}

/// Run the SQL migrations found in `path`
///
/// Applied migrations are tracked by sqlx in `_sqlx_migrations`; rerunning is
/// a no-op.
pub async fn run_migrations(pool: &PgPool, path: &Path, parent: &Span) -> Result<()> {
    let span = component_span(parent, "storage/migrations");

    async move {
        info!(path = %path.display(), "Running database migrations");

        let migrator = Migrator::new(path.to_path_buf()).await.map_err(|e| {
            warn!(error = %e, "Failed to load migrations");
            LibraryError::Migration(e.to_string())
        })?;

        migrator.run(pool).await.map_err(|e| {
            warn!(error = %e, "Migration failed");
            LibraryError::Migration(e.to_string())
        })?;

        info!(
            count = migrator.iter().count(),
            "Database migrations completed successfully"
        );
        Ok(())
    }
    .instrument(span)
    .await
}

/// Check that the pool can serve a trivial query
pub async fn health_check(pool: &PgPool) -> Result<()> {
    sqlx::query("SELECT 1").fetch_one(pool).await.map_err(|e| {
        warn!(error = %e, "Database health check failed");
        LibraryError::Database(e)
    })?;
    Ok(())
}
