//! Song repository trait and implementation

use std::sync::Arc;

use async_trait::async_trait;
use bridge_traits::database::{DatabaseAdapter, QueryRow, QueryValue};
use bridge_traits::error::BridgeError;
use core_runtime::logging::component_span;
use sqlx::PgPool;
use tracing::{debug, Instrument, Span};

use crate::criteria::{SongColumn, SongCriteria, SongPatch};
use crate::date::ReleaseDate;
use crate::error::{LibraryError, Result};
use crate::models::{NewSong, Song};
use crate::query::{
    build_delete_statement, build_insert_statement, build_list_statement, build_text_statement,
    build_update_statement,
};
use crate::repositories::PageRequest;

/// Song repository interface for data access operations
///
/// The narrow capability surface the service needs. Implementations must be
/// safe to share across concurrent requests.
#[async_trait]
pub trait SongRepository: Send + Sync {
    /// List songs matching every present criterion, ordered by id
    ///
    /// # Returns
    /// The requested page, possibly empty
    async fn list(&self, criteria: &SongCriteria, page: PageRequest) -> Result<Vec<Song>>;

    /// Fetch the full lyrics of one song
    ///
    /// # Errors
    /// `NotFound` if no song has this id
    async fn get_text(&self, id: i64) -> Result<String>;

    /// Insert a new song
    ///
    /// # Returns
    /// The store-assigned identifier
    async fn create(&self, song: &NewSong) -> Result<i64>;

    /// Apply the present fields of `patch`
    ///
    /// # Returns
    /// Number of rows affected; zero is not an error at this layer
    ///
    /// # Errors
    /// `NoFieldsToUpdate` if the patch is empty
    async fn update(&self, id: i64, patch: &SongPatch) -> Result<u64>;

    /// Delete a song
    ///
    /// # Returns
    /// Number of rows affected; zero is not an error
    async fn delete(&self, id: i64) -> Result<u64>;
}

/// Postgres implementation of SongRepository
pub struct PostgresSongRepository {
    adapter: Arc<dyn DatabaseAdapter>,
    span: Span,
}

impl PostgresSongRepository {
    /// Create a new song repository with the given database adapter
    pub fn new(adapter: Arc<dyn DatabaseAdapter>, parent: &Span) -> Self {
        Self {
            adapter,
            span: component_span(parent, "storage/song"),
        }
    }

    /// Create a new song repository from a Postgres connection pool
    pub fn from_pool(pool: PgPool, parent: &Span) -> Self {
        use crate::adapters::PostgresAdapter;
        Self::new(Arc::new(PostgresAdapter::from_pool(pool, parent)), parent)
    }

    // Helper functions for extracting values from QueryRow
    fn get_string(row: &QueryRow, column: SongColumn) -> Result<String> {
        row.get(column.name())
            .and_then(QueryValue::as_string)
            .ok_or_else(|| Self::missing_column(column))
    }

    fn get_i64(row: &QueryRow, column: SongColumn) -> Result<i64> {
        row.get(column.name())
            .and_then(QueryValue::as_i64)
            .ok_or_else(|| Self::missing_column(column))
    }

    fn get_date(row: &QueryRow, column: SongColumn) -> Result<ReleaseDate> {
        match row.get(column.name()) {
            Some(QueryValue::Date(date)) => Ok(ReleaseDate::new(*date)),
            Some(QueryValue::Text(text)) => ReleaseDate::parse(text),
            _ => Err(Self::missing_column(column)),
        }
    }

    fn missing_column(column: SongColumn) -> LibraryError {
        LibraryError::Bridge(BridgeError::DatabaseError(format!(
            "Missing or invalid column: {}",
            column.name()
        )))
    }
}

/// Map a `song` row to a [`Song`]
pub fn row_to_song(row: &QueryRow) -> Result<Song> {
    type Repo = PostgresSongRepository;

    Ok(Song {
        id: Repo::get_i64(row, SongColumn::Id)?,
        title: Repo::get_string(row, SongColumn::Title)?,
        group: Repo::get_string(row, SongColumn::Group)?,
        text: Repo::get_string(row, SongColumn::Text)?,
        link: Repo::get_string(row, SongColumn::Link)?,
        release_date: Repo::get_date(row, SongColumn::ReleaseDate)?,
    })
}

#[async_trait]
impl SongRepository for PostgresSongRepository {
    async fn list(&self, criteria: &SongCriteria, page: PageRequest) -> Result<Vec<Song>> {
        let statement = build_list_statement(criteria, page);
        let span = tracing::debug_span!(parent: &self.span, "list", offset = page.offset(), limit = page.limit());

        async move {
            debug!(sql = %statement.sql, "Listing songs");
            let rows = self.adapter.query(&statement.sql, &statement.params).await?;
            let songs = rows.iter().map(row_to_song).collect::<Result<Vec<_>>>()?;
            debug!(count = songs.len(), "Songs listed");
            Ok(songs)
        }
        .instrument(span)
        .await
    }

    async fn get_text(&self, id: i64) -> Result<String> {
        let statement = build_text_statement(id);
        let span = tracing::debug_span!(parent: &self.span, "get_text", id);

        async move {
            let row = self
                .adapter
                .query_one_optional(&statement.sql, &statement.params)
                .await?
                .ok_or_else(|| LibraryError::song_not_found(id))?;

            Self::get_string(&row, SongColumn::Text)
        }
        .instrument(span)
        .await
    }

    async fn create(&self, song: &NewSong) -> Result<i64> {
        song.validate()
            .map_err(|message| LibraryError::invalid_input("song", message))?;

        let statement = build_insert_statement(song);
        let span = tracing::debug_span!(parent: &self.span, "create");

        async move {
            let row = self
                .adapter
                .query_one(&statement.sql, &statement.params)
                .await?;
            let id = Self::get_i64(&row, SongColumn::Id)?;
            debug!(id, "Song inserted");
            Ok(id)
        }
        .instrument(span)
        .await
    }

    async fn update(&self, id: i64, patch: &SongPatch) -> Result<u64> {
        let statement = build_update_statement(id, patch)?;
        let span = tracing::debug_span!(parent: &self.span, "update", id);

        async move {
            debug!(sql = %statement.sql, "Updating song");
            let affected = self
                .adapter
                .execute(&statement.sql, &statement.params)
                .await?;
            debug!(affected, "Song updated");
            Ok(affected)
        }
        .instrument(span)
        .await
    }

    async fn delete(&self, id: i64) -> Result<u64> {
        let statement = build_delete_statement(id);
        let span = tracing::debug_span!(parent: &self.span, "delete", id);

        async move {
            let affected = self
                .adapter
                .execute(&statement.sql, &statement.params)
                .await?;
            debug!(affected, "Song deleted");
            Ok(affected)
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use mockall::mock;
    use std::collections::HashMap;

    mock! {
        Adapter {}

        #[async_trait]
        impl DatabaseAdapter for Adapter {
            async fn health_check(&self) -> bridge_traits::error::Result<()>;
            async fn query(&self, query: &str, params: &[QueryValue]) -> bridge_traits::error::Result<Vec<QueryRow>>;
            async fn execute(&self, statement: &str, params: &[QueryValue]) -> bridge_traits::error::Result<u64>;
            async fn query_one_optional(&self, query: &str, params: &[QueryValue]) -> bridge_traits::error::Result<Option<QueryRow>>;
            async fn query_one(&self, query: &str, params: &[QueryValue]) -> bridge_traits::error::Result<QueryRow>;
        }
    }

    fn repository(adapter: MockAdapter) -> PostgresSongRepository {
        PostgresSongRepository::new(Arc::new(adapter), &Span::none())
    }

    fn song_row(id: i64) -> QueryRow {
        HashMap::from([
            ("id".to_string(), QueryValue::Integer(id)),
            ("name".to_string(), QueryValue::Text("X".to_string())),
            ("group".to_string(), QueryValue::Text("Y".to_string())),
            ("text".to_string(), QueryValue::Text("V1\n\nV2".to_string())),
            ("link".to_string(), QueryValue::Text("http://x".to_string())),
            (
                "release_date".to_string(),
                QueryValue::Date(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()),
            ),
        ])
    }

    fn new_song() -> NewSong {
        NewSong {
            title: "X".to_string(),
            group: "Y".to_string(),
            text: "V1\n\nV2".to_string(),
            link: "http://x".to_string(),
            release_date: ReleaseDate::from_ymd(2020, 1, 1).unwrap(),
        }
    }

    #[test]
    fn test_row_to_song_decodes_date_exactly() {
        let song = row_to_song(&song_row(3)).unwrap();
        assert_eq!(song.id, 3);
        assert_eq!(song.title, "X");
        assert_eq!(song.release_date.to_string(), "01.01.2020");

        let mut row = song_row(3);
        row.insert(
            "release_date".to_string(),
            QueryValue::Text("17.03.2021".to_string()),
        );
        assert_eq!(
            row_to_song(&row).unwrap().release_date,
            ReleaseDate::from_ymd(2021, 3, 17).unwrap()
        );
    }

    #[test]
    fn test_row_to_song_missing_column() {
        let mut row = song_row(1);
        row.remove("link");
        assert!(matches!(row_to_song(&row), Err(LibraryError::Bridge(_))));
    }

    #[tokio::test]
    async fn test_list_binds_filters_then_window() {
        let mut adapter = MockAdapter::new();
        adapter
            .expect_query()
            .withf(|sql: &str, params: &[QueryValue]| {
                sql.contains(r#"WHERE "group" = $1 ORDER BY "id" OFFSET $2 LIMIT $3"#)
                    && params
                        == [
                            QueryValue::Text("Y".to_string()),
                            QueryValue::Integer(20),
                            QueryValue::Integer(10),
                        ]
            })
            .times(1)
            .returning(|_, _| Ok(vec![song_row(21), song_row(22)]));

        let criteria = SongCriteria {
            group: Some("Y".to_string()),
            ..Default::default()
        };
        let songs = repository(adapter)
            .list(&criteria, PageRequest::new(3, 10).unwrap())
            .await
            .unwrap();

        assert_eq!(songs.iter().map(|s| s.id).collect::<Vec<_>>(), vec![21, 22]);
    }

    #[tokio::test]
    async fn test_list_empty_result_is_empty_vec() {
        let mut adapter = MockAdapter::new();
        adapter.expect_query().returning(|_, _| Ok(Vec::new()));

        let songs = repository(adapter)
            .list(&SongCriteria::default(), PageRequest::default())
            .await
            .unwrap();
        assert!(songs.is_empty());
    }

    #[tokio::test]
    async fn test_get_text_not_found() {
        let mut adapter = MockAdapter::new();
        adapter
            .expect_query_one_optional()
            .withf(|_, params: &[QueryValue]| params == [QueryValue::Integer(42)])
            .returning(|_, _| Ok(None));

        let result = repository(adapter).get_text(42).await;
        assert!(matches!(result, Err(LibraryError::NotFound { ref id, .. }) if id == "42"));
    }

    #[tokio::test]
    async fn test_get_text_returns_lyrics() {
        let mut adapter = MockAdapter::new();
        adapter.expect_query_one_optional().returning(|_, _| {
            Ok(Some(HashMap::from([(
                "text".to_string(),
                QueryValue::Text("V1\n\nV2".to_string()),
            )])))
        });

        let text = repository(adapter).get_text(1).await.unwrap();
        assert_eq!(text, "V1\n\nV2");
    }

    #[tokio::test]
    async fn test_create_returns_assigned_id() {
        let mut adapter = MockAdapter::new();
        adapter
            .expect_query_one()
            .withf(|sql: &str, params: &[QueryValue]| {
                sql.starts_with("INSERT INTO song") && params.len() == 5
            })
            .times(1)
            .returning(|_, _| Ok(HashMap::from([("id".to_string(), QueryValue::Integer(5))])));

        let id = repository(adapter).create(&new_song()).await.unwrap();
        assert_eq!(id, 5);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_title_without_touching_store() {
        let mut adapter = MockAdapter::new();
        adapter.expect_query_one().times(0);

        let mut song = new_song();
        song.title = " ".to_string();
        let result = repository(adapter).create(&song).await;
        assert!(matches!(result, Err(LibraryError::InvalidInput { .. })));
    }

    #[tokio::test]
    async fn test_update_reports_rows_affected() {
        let mut adapter = MockAdapter::new();
        adapter
            .expect_execute()
            .withf(|sql: &str, params: &[QueryValue]| {
                sql == r#"UPDATE song SET "text" = $1 WHERE "id" = $2"#
                    && params
                        == [
                            QueryValue::Text("new lyrics".to_string()),
                            QueryValue::Integer(7),
                        ]
            })
            .times(1)
            .returning(|_, _| Ok(0));

        let patch = SongPatch {
            text: Some("new lyrics".to_string()),
            ..Default::default()
        };
        let affected = repository(adapter).update(7, &patch).await.unwrap();
        assert_eq!(affected, 0);
    }

    #[tokio::test]
    async fn test_empty_update_never_reaches_adapter() {
        let mut adapter = MockAdapter::new();
        adapter.expect_execute().times(0);

        let result = repository(adapter).update(7, &SongPatch::default()).await;
        assert!(matches!(result, Err(LibraryError::NoFieldsToUpdate)));
    }

    #[tokio::test]
    async fn test_delete_zero_rows_is_ok() {
        let mut adapter = MockAdapter::new();
        adapter
            .expect_execute()
            .withf(|sql: &str, _| sql == r#"DELETE FROM song WHERE "id" = $1"#)
            .returning(|_, _| Ok(0));

        assert_eq!(repository(adapter).delete(99).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_adapter_failure_propagates() {
        let mut adapter = MockAdapter::new();
        adapter
            .expect_execute()
            .returning(|_, _| Err(BridgeError::DatabaseError("connection reset".to_string())));

        let result = repository(adapter).delete(1).await;
        assert!(matches!(result, Err(LibraryError::Bridge(_))));
    }
}
