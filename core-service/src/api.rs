//! # Boundary Layer
//!
//! Framework-agnostic request handlers for the song endpoints. A transport
//! (HTTP server, test harness) hands in raw path segments, query pairs and
//! body bytes and gets back an [`ApiResponse`].
//!
//! | Operation   | Route                      | Success             |
//! |-------------|----------------------------|---------------------|
//! | list        | `GET /songs`               | 200, JSON array     |
//! | read text   | `GET /songs/{id}/text`     | 200, `{id, page, verse}` |
//! | create      | `POST /songs`              | 201, `{id}`         |
//! | update      | `PATCH /songs/{id}`        | 204                 |
//! | delete      | `DELETE /songs/{id}`       | 204                 |
//!
//! Errors always carry the body `{}`. The reason is logged, never returned.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use core_library::criteria::{SongCriteria, SongPatch};
use core_library::date::ReleaseDate;
use core_runtime::logging::component_span;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn, Span};

use crate::error::{Result, ServiceError};
use crate::song_service::SongService;

const LIST_PARAMS: &[&str] = &[
    "id",
    "song",
    "group",
    "text",
    "link",
    "release_date",
    "page",
    "limit",
];
const TEXT_PARAMS: &[&str] = &["page"];

/// Status code and optional JSON body
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Option<Value>,
}

impl ApiResponse {
    fn json<T: Serialize>(status: u16, value: &T) -> Result<Self> {
        let body = serde_json::to_value(value)
            .map_err(|e| ServiceError::Internal(format!("Response encoding failed: {}", e)))?;
        Ok(Self {
            status,
            body: Some(body),
        })
    }

    fn no_content() -> Self {
        Self {
            status: 204,
            body: None,
        }
    }

    fn error(status: u16) -> Self {
        Self {
            status,
            body: Some(Value::Object(serde_json::Map::new())),
        }
    }
}

/// Map a service failure to its external status code
pub fn status_for(error: &ServiceError) -> u16 {
    match error {
        ServiceError::Validation(_) | ServiceError::PageOutOfRange { .. } => 400,
        ServiceError::NotFound(_) => 404,
        ServiceError::EnrichmentUnavailable(_) | ServiceError::EnrichmentDecode(_) => 502,
        ServiceError::Storage(_)
        | ServiceError::Cancelled
        | ServiceError::Initialization(_)
        | ServiceError::Internal(_) => 500,
    }
}

#[derive(Debug, Deserialize)]
struct CreateSongRequest {
    song: String,
    group: String,
}

#[derive(Debug, Serialize)]
struct CreatedSong {
    id: i64,
}

#[derive(Debug, Serialize)]
struct VersePage<'a> {
    id: i64,
    page: i64,
    verse: &'a str,
}

/// Query pairs collected into a map, rejecting unknown and repeated keys
struct QueryParams<'a> {
    values: HashMap<&'a str, &'a str>,
}

impl<'a> QueryParams<'a> {
    fn parse(pairs: &'a [(String, String)], allowed: &[&str]) -> Result<Self> {
        let mut values = HashMap::with_capacity(pairs.len());

        for (key, value) in pairs {
            if !allowed.contains(&key.as_str()) {
                return Err(ServiceError::Validation(format!(
                    "unsupported query parameter '{}'",
                    key
                )));
            }
            if values.insert(key.as_str(), value.as_str()).is_some() {
                return Err(ServiceError::Validation(format!(
                    "query parameter '{}' given more than once",
                    key
                )));
            }
        }

        Ok(Self { values })
    }

    fn text(&self, key: &str) -> Option<String> {
        self.values.get(key).map(|value| value.to_string())
    }

    fn integer(&self, key: &str) -> Result<Option<i64>> {
        self.values
            .get(key)
            .map(|value| parse_integer(key, value))
            .transpose()
    }

    fn required_integer(&self, key: &str) -> Result<i64> {
        self.integer(key)?.ok_or_else(|| {
            ServiceError::Validation(format!("query parameter '{}' is required", key))
        })
    }

    fn date(&self, key: &str) -> Result<Option<ReleaseDate>> {
        self.values
            .get(key)
            .map(|value| ReleaseDate::parse(value).map_err(ServiceError::from))
            .transpose()
    }
}

fn parse_integer(field: &str, value: &str) -> Result<i64> {
    value
        .parse::<i64>()
        .map_err(|_| ServiceError::Validation(format!("{} must be an integer, got '{}'", field, value)))
}

fn parse_json<'a, T: Deserialize<'a>>(body: &'a [u8]) -> Result<T> {
    serde_json::from_slice(body)
        .map_err(|e| ServiceError::Validation(format!("malformed request body: {}", e)))
}

/// Handlers for the song endpoints
pub struct SongHandler {
    service: Arc<SongService>,
    request_timeout: Option<Duration>,
    span: Span,
}

impl SongHandler {
    pub fn new(service: Arc<SongService>, request_timeout: Option<Duration>, parent: &Span) -> Self {
        Self {
            service,
            request_timeout,
            span: component_span(parent, "http/songs"),
        }
    }

    /// `GET /songs?page=..&limit=..[&id=..&song=..&group=..&text=..&link=..&release_date=..]`
    pub async fn list_songs(
        &self,
        query: &[(String, String)],
        cancel: &CancellationToken,
    ) -> ApiResponse {
        let started = Instant::now();
        let result = self.handle_list(query, cancel).await;
        self.finish("GET", "/songs", started, result)
    }

    /// `GET /songs/{id}/text?page=..`
    pub async fn read_text(
        &self,
        id: &str,
        query: &[(String, String)],
        cancel: &CancellationToken,
    ) -> ApiResponse {
        let started = Instant::now();
        let result = self.handle_read_text(id, query, cancel).await;
        self.finish("GET", &format!("/songs/{}/text", id), started, result)
    }

    /// `POST /songs` with body `{song, group}`
    pub async fn create_song(&self, body: &[u8], cancel: &CancellationToken) -> ApiResponse {
        let started = Instant::now();
        let result = self.handle_create(body, cancel).await;
        self.finish("POST", "/songs", started, result)
    }

    /// `PATCH /songs/{id}` with any subset of `{song, group, text, link, releaseDate}`
    pub async fn update_song(
        &self,
        id: &str,
        body: &[u8],
        cancel: &CancellationToken,
    ) -> ApiResponse {
        let started = Instant::now();
        let result = self.handle_update(id, body, cancel).await;
        self.finish("PATCH", &format!("/songs/{}", id), started, result)
    }

    /// `DELETE /songs/{id}`
    pub async fn delete_song(&self, id: &str, cancel: &CancellationToken) -> ApiResponse {
        let started = Instant::now();
        let result = self.handle_delete(id, cancel).await;
        self.finish("DELETE", &format!("/songs/{}", id), started, result)
    }

    async fn handle_list(
        &self,
        query: &[(String, String)],
        cancel: &CancellationToken,
    ) -> Result<ApiResponse> {
        let params = QueryParams::parse(query, LIST_PARAMS)?;
        let criteria = SongCriteria {
            id: params.integer("id")?,
            title: params.text("song"),
            group: params.text("group"),
            text: params.text("text"),
            link: params.text("link"),
            release_date: params.date("release_date")?,
        };
        let page = params.required_integer("page")?;
        let limit = params.required_integer("limit")?;

        let songs = self
            .guard(cancel, self.service.list(criteria, page, limit))
            .await?;
        ApiResponse::json(200, &songs)
    }

    async fn handle_read_text(
        &self,
        id: &str,
        query: &[(String, String)],
        cancel: &CancellationToken,
    ) -> Result<ApiResponse> {
        let id = parse_integer("id", id)?;
        let params = QueryParams::parse(query, TEXT_PARAMS)?;
        let page = params.required_integer("page")?;

        let verse = self
            .guard(cancel, self.service.read_text(id, page))
            .await?;
        ApiResponse::json(
            200,
            &VersePage {
                id,
                page,
                verse: &verse,
            },
        )
    }

    async fn handle_create(&self, body: &[u8], cancel: &CancellationToken) -> Result<ApiResponse> {
        let request: CreateSongRequest = parse_json(body)?;
        let id = self
            .guard(cancel, self.service.create(request.song, request.group))
            .await?;
        ApiResponse::json(201, &CreatedSong { id })
    }

    async fn handle_update(
        &self,
        id: &str,
        body: &[u8],
        cancel: &CancellationToken,
    ) -> Result<ApiResponse> {
        let id = parse_integer("id", id)?;
        let patch: SongPatch = parse_json(body)?;
        self.guard(cancel, self.service.update(id, patch)).await?;
        Ok(ApiResponse::no_content())
    }

    async fn handle_delete(&self, id: &str, cancel: &CancellationToken) -> Result<ApiResponse> {
        let id = parse_integer("id", id)?;
        self.guard(cancel, self.service.delete(id)).await?;
        Ok(ApiResponse::no_content())
    }

    /// Race `operation` against cancellation and the request timeout.
    ///
    /// Losing the race drops the operation, aborting any in-flight store or
    /// HTTP call.
    async fn guard<T>(
        &self,
        cancel: &CancellationToken,
        operation: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let deadline = async {
            match self.request_timeout {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ServiceError::Cancelled),
            _ = deadline => Err(ServiceError::Cancelled),
            result = operation => result,
        }
    }

    fn finish(
        &self,
        method: &'static str,
        path: &str,
        started: Instant,
        result: Result<ApiResponse>,
    ) -> ApiResponse {
        let response = result.unwrap_or_else(|err| {
            let status = status_for(&err);
            if status >= 500 {
                warn!(parent: &self.span, method, path, error = %err, "Request failed");
            } else {
                info!(parent: &self.span, method, path, error = %err, "Request rejected");
            }
            ApiResponse::error(status)
        });

        info!(
            parent: &self.span,
            method,
            path,
            status = response.status,
            duration_ms = started.elapsed().as_millis() as u64,
            "Request handled"
        );

        response
    }
}
