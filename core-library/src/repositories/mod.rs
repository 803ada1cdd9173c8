//! # Repository Pattern Implementation
//!
//! The song store is reached through the [`SongRepository`] capability trait:
//!
//! - `PostgresSongRepository` executes built statements through a
//!   `DatabaseAdapter`
//! - `InMemorySongRepository` keeps records in a map for tests
//!
//! All operations return `Result<T>`; pagination is described by
//! [`PageRequest`].

pub mod memory;
pub mod pagination;
pub mod song;

pub use memory::InMemorySongRepository;
pub use pagination::{PageRequest, MAX_PAGE_VALUE};
pub use song::{row_to_song, PostgresSongRepository, SongRepository};
