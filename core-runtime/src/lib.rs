//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the song library:
//! - Logging and tracing infrastructure
//! - Configuration management
//!
//! ## Overview
//!
//! This crate contains the runtime utilities every other crate depends on.
//! It establishes the logging conventions (one injected span per component)
//! and the typed configuration consumed by the bootstrapper.

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
