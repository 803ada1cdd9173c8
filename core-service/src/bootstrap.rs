//! Startup wiring from an [`AppConfig`].
//!
//! Order matters: the pool is created and health-checked, migrations run,
//! then the HTTP client, details provider, service and handlers are built.
//! Any failure is reported as `ServiceError::Initialization`.

use std::sync::Arc;

use bridge_desktop::ReqwestHttpClient;
use core_library::db::{create_pool, run_migrations};
use core_library::repositories::PostgresSongRepository;
use core_metadata::HttpSongDetailProvider;
use core_runtime::config::AppConfig;
use sqlx::PgPool;
use tracing::{info, Instrument, Span};

use crate::error::{Result, ServiceError};
use crate::{CoreDependencies, CoreService};

/// A running core plus the resources it owns
pub struct Application {
    pub core: CoreService,
    pool: PgPool,
}

impl Application {
    /// Close every pooled database connection
    pub async fn shutdown(self) {
        self.pool.close().await;
    }
}

fn init_error(stage: &str, err: impl std::fmt::Display) -> ServiceError {
    ServiceError::Initialization(format!("{}: {}", stage, err))
}

/// Build the application from configuration.
pub async fn bootstrap(config: &AppConfig, parent: &Span) -> Result<Application> {
    let span = tracing::info_span!(parent: parent, "bootstrap", environment = %config.environment);

    async move {
        config.validate().map_err(|e| init_error("config", e))?;

        let pool = create_pool(&config.database, parent)
            .await
            .map_err(|e| init_error("database", e))?;
        run_migrations(&pool, &config.database.migrations_path, parent)
            .await
            .map_err(|e| init_error("migrations", e))?;

        let http_client = ReqwestHttpClient::new(parent).map_err(|e| init_error("http client", e))?;
        let song_details = HttpSongDetailProvider::new(
            Arc::new(http_client),
            config.song_details_api_url.clone(),
            parent,
        );
        let repository = PostgresSongRepository::from_pool(pool.clone(), parent);

        let core = CoreService::new(
            CoreDependencies::new(Arc::new(repository), Arc::new(song_details)),
            config.request_timeout,
            parent,
        );

        info!("Song library ready");
        Ok(Application { core, pool })
    }
    .instrument(span)
    .await
}
