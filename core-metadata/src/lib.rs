//! # Song Details Module
//!
//! Enriches new songs with lyrics, link and release date from an external
//! lookup API.
//!
//! ## Overview
//!
//! - [`enrichment::SongDetailProvider`]: the lookup capability
//! - [`enrichment::HttpSongDetailProvider`]: single-attempt HTTP client for
//!   `GET {base}/info?song=..&group=..`

pub mod enrichment;
pub mod error;

pub use enrichment::{HttpSongDetailProvider, SongDetailProvider};
pub use error::{MetadataError, Result};
