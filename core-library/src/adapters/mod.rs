//! Database adapter implementations
//!
//! Concrete implementations of the `DatabaseAdapter` trait.

pub mod postgres_native;

pub use postgres_native::PostgresAdapter;
