//! # Song Details Provider
//!
//! Looks up lyrics, link and release date for a (title, group) pair.
//!
//! The lookup is attempted exactly once. A non-2xx status fails with
//! `EnrichmentUnavailable`; a body that is not `{text, link, releaseDate}`
//! (with the date as `DD.MM.YYYY`) fails with `EnrichmentDecode`. Timeouts
//! and cancellation come from the caller.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_metadata::enrichment::{HttpSongDetailProvider, SongDetailProvider};
//!
//! let provider = HttpSongDetailProvider::new(http_client, "http://details.local", &root_span);
//! let detail = provider.fetch("Supermassive Black Hole", "Muse").await?;
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest};
use core_library::models::SongDetail;
use core_runtime::logging::component_span;
use tracing::{debug, warn, Instrument, Span};

use crate::error::{MetadataError, Result};

/// Source of enrichment details for new songs
#[async_trait]
pub trait SongDetailProvider: Send + Sync {
    /// Fetch details for a song
    ///
    /// # Errors
    ///
    /// - `EnrichmentUnavailable` when the lookup answers with a non-success status
    /// - `EnrichmentDecode` when the body cannot be decoded
    /// - `Bridge` when the request could not be sent
    async fn fetch(&self, title: &str, group: &str) -> Result<SongDetail>;
}

/// HTTP-backed details provider
pub struct HttpSongDetailProvider {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    span: Span,
}

impl HttpSongDetailProvider {
    pub fn new(http_client: Arc<dyn HttpClient>, base_url: impl Into<String>, parent: &Span) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            http_client,
            base_url,
            span: component_span(parent, "client/song-details"),
        }
    }

    /// Lookup URL with both values percent-encoded
    pub fn info_url(&self, title: &str, group: &str) -> String {
        format!(
            "{}/info?song={}&group={}",
            self.base_url,
            urlencoding::encode(title),
            urlencoding::encode(group)
        )
    }
}

#[async_trait]
impl SongDetailProvider for HttpSongDetailProvider {
    async fn fetch(&self, title: &str, group: &str) -> Result<SongDetail> {
        let url = self.info_url(title, group);
        let span = tracing::debug_span!(parent: &self.span, "fetch", url = %url);

        async move {
            debug!("Requesting song details");

            let request = HttpRequest::new(HttpMethod::Get, &url).header("Accept", "application/json");
            let response = self.http_client.execute(request).await.map_err(|e| {
                warn!(error = %e, "Song details request failed");
                MetadataError::Bridge(e)
            })?;

            if !response.is_success() {
                warn!(status = response.status, "Song details lookup returned an error status");
                return Err(MetadataError::EnrichmentUnavailable {
                    status: response.status,
                });
            }

            let detail: SongDetail = response.json().map_err(|e| {
                warn!(error = %e, "Song details body could not be decoded");
                MetadataError::EnrichmentDecode(e.to_string())
            })?;

            debug!(release_date = %detail.release_date, "Song details received");
            Ok(detail)
        }
        .instrument(span)
        .await
    }
}
