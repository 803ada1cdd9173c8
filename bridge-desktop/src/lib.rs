//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for native hosts.
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest`
//!
//! The database adapter lives next to the repositories in `core-library`
//! because it is bound to the migrations shipped there.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::ReqwestHttpClient;
//! use bridge_traits::HttpClient;
//! use std::sync::Arc;
//!
//! let http_client: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new(&parent_span)?);
//! ```

mod http;

pub use http::ReqwestHttpClient;
