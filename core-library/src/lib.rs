//! # Song Library
//!
//! Owns the song store: the criteria model, statement builders, verse
//! pagination and the repositories that execute statements.
//!
//! ## Overview
//!
//! - [`criteria`]: optional per-field filters and partial updates
//! - [`query`]: parameterized statements built from criteria
//! - [`verse`]: splitting lyrics into 1-indexed verses
//! - [`repositories`]: the `SongRepository` capability with Postgres and
//!   in-memory implementations
//! - [`db`]: pool creation and migrations

pub mod adapters;
pub mod criteria;
pub mod date;
pub mod db;
pub mod error;
pub mod models;
pub mod query;
pub mod repositories;
pub mod verse;

pub use criteria::{SongColumn, SongCriteria, SongPatch};
pub use date::ReleaseDate;
pub use error::{LibraryError, Result};
pub use models::{NewSong, Song, SongDetail};
pub use repositories::{InMemorySongRepository, PageRequest, PostgresSongRepository, SongRepository};
