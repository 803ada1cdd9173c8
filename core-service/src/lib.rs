//! Core service façade and bootstrap helpers.
//!
//! This crate wires the song store and the song-details lookup into the
//! [`SongService`] use cases and exposes them through the framework-agnostic
//! [`SongHandler`]. Hosts either call [`bootstrap`] with an `AppConfig`
//! (requires the default `desktop-shims` feature for the reqwest client) or
//! assemble [`CoreDependencies`] themselves, e.g. with in-memory fakes.

pub mod api;
#[cfg(feature = "desktop-shims")]
pub mod bootstrap;
pub mod error;
pub mod song_service;

pub use api::{ApiResponse, SongHandler};
#[cfg(feature = "desktop-shims")]
pub use bootstrap::bootstrap;
pub use error::{Result, ServiceError};
pub use song_service::SongService;

use std::sync::Arc;
use std::time::Duration;

use core_library::repositories::SongRepository;
use core_metadata::SongDetailProvider;
use tracing::Span;

/// Aggregated handle to the collaborators the core requires.
pub struct CoreDependencies {
    pub repository: Arc<dyn SongRepository>,
    pub song_details: Arc<dyn SongDetailProvider>,
}

impl CoreDependencies {
    /// Construct a dependency bundle from explicit handles.
    pub fn new(
        repository: Arc<dyn SongRepository>,
        song_details: Arc<dyn SongDetailProvider>,
    ) -> Self {
        Self {
            repository,
            song_details,
        }
    }
}

/// Primary façade exposed to hosts.
#[derive(Clone)]
pub struct CoreService {
    service: Arc<SongService>,
    handler: Arc<SongHandler>,
}

impl CoreService {
    /// Create a new service from the provided dependencies.
    pub fn new(deps: CoreDependencies, request_timeout: Option<Duration>, parent: &Span) -> Self {
        let service = Arc::new(SongService::new(
            deps.repository,
            deps.song_details,
            parent,
        ));
        let handler = Arc::new(SongHandler::new(
            Arc::clone(&service),
            request_timeout,
            parent,
        ));

        Self { service, handler }
    }

    /// Use cases, for hosts that do their own request decoding.
    pub fn service(&self) -> Arc<SongService> {
        Arc::clone(&self.service)
    }

    /// Request handlers for the song endpoints.
    pub fn handler(&self) -> Arc<SongHandler> {
        Arc::clone(&self.handler)
    }
}
