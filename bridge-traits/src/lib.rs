//! # Host Bridge Traits
//!
//! Capability traits the song library core depends on without binding to a
//! concrete driver or HTTP stack.
//!
//! ## Traits
//!
//! - [`DatabaseAdapter`](database::DatabaseAdapter) - Positional-parameter SQL
//!   execution returning column maps
//! - [`HttpClient`](http::HttpClient) - Single-attempt async HTTP requests
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. Adapters
//! convert driver-specific failures into it and keep the original message so
//! callers can log it.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so a single adapter can be shared
//! by every concurrently handled request.

pub mod database;
pub mod error;
pub mod http;

pub use error::BridgeError;

pub use database::{DatabaseAdapter, QueryRow, QueryValue};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
