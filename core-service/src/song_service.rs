//! Song use cases: list, read a verse, create, update, delete.
//!
//! Stateless orchestration over a [`SongRepository`] and a
//! [`SongDetailProvider`]. Input is validated before any collaborator is
//! called and collaborator failures are passed up without retries.

use std::sync::Arc;

use core_library::criteria::{SongCriteria, SongPatch};
use core_library::models::{NewSong, Song};
use core_library::repositories::{PageRequest, SongRepository};
use core_library::verse;
use core_metadata::SongDetailProvider;
use core_runtime::logging::component_span;
use tracing::{debug, info, Instrument, Span};

use crate::error::{Result, ServiceError};

pub struct SongService {
    repository: Arc<dyn SongRepository>,
    details: Arc<dyn SongDetailProvider>,
    span: Span,
}

impl SongService {
    pub fn new(
        repository: Arc<dyn SongRepository>,
        details: Arc<dyn SongDetailProvider>,
        parent: &Span,
    ) -> Self {
        Self {
            repository,
            details,
            span: component_span(parent, "services/song"),
        }
    }

    /// List one page of songs matching `criteria`.
    ///
    /// `page` and `limit` must both lie in `1..=2^31-1`; otherwise the store
    /// is not called.
    pub async fn list(&self, criteria: SongCriteria, page: i64, limit: i64) -> Result<Vec<Song>> {
        let span = tracing::debug_span!(parent: &self.span, "list", page, limit);

        async move {
            let page = PageRequest::new(page, limit)?;
            let songs = self.repository.list(&criteria, page).await?;
            debug!(count = songs.len(), "Listed songs");
            Ok(songs)
        }
        .instrument(span)
        .await
    }

    /// Return verse `page` (1-indexed) of a song's lyrics.
    pub async fn read_text(&self, id: i64, page: i64) -> Result<String> {
        let span = tracing::debug_span!(parent: &self.span, "read_text", id, page);

        async move {
            let text = self.repository.get_text(id).await?;
            let verse = verse::verse_at(&text, page)?;
            Ok(verse.to_string())
        }
        .instrument(span)
        .await
    }

    /// Enrich and store a new song, returning its id.
    ///
    /// If the details lookup fails nothing is written.
    pub async fn create(&self, title: String, group: String) -> Result<i64> {
        let span = tracing::debug_span!(parent: &self.span, "create", song = %title, group = %group);

        async move {
            if title.trim().is_empty() || group.trim().is_empty() {
                return Err(ServiceError::Validation(
                    "song and group must not be empty".to_string(),
                ));
            }

            let detail = self.details.fetch(&title, &group).await?;
            let song = NewSong::from_detail(title, group, detail);
            let id = self.repository.create(&song).await?;

            info!(id, "Song created");
            Ok(id)
        }
        .instrument(span)
        .await
    }

    /// Apply a partial update.
    ///
    /// An empty patch is rejected before the store is called; an update that
    /// matches no row is reported as `NotFound`.
    pub async fn update(&self, id: i64, patch: SongPatch) -> Result<()> {
        let span = tracing::debug_span!(parent: &self.span, "update", id);

        async move {
            if patch.is_empty() {
                return Err(ServiceError::Validation("no fields to update".to_string()));
            }

            let affected = self.repository.update(id, &patch).await?;
            if affected == 0 {
                return Err(ServiceError::NotFound(format!("song {}", id)));
            }

            info!(id, "Song updated");
            Ok(())
        }
        .instrument(span)
        .await
    }

    /// Delete a song. Deleting a missing song succeeds.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let span = tracing::debug_span!(parent: &self.span, "delete", id);

        async move {
            let affected = self.repository.delete(id).await?;
            info!(id, affected, "Song deleted");
            Ok(())
        }
        .instrument(span)
        .await
    }
}
