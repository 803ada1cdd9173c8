//! Database Abstraction Layer
//!
//! Provides a driver-agnostic trait for executing parameterized SQL so the
//! song store can be exercised against Postgres in production and against
//! mocks in tests.
//!
//! ## Design Philosophy
//!
//! Statements are plain SQL strings with positional placeholders (`$1`, `$2`,
//! ...) and values travel separately as [`QueryValue`]s. Callers never
//! interpolate values into SQL text.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_traits::database::{DatabaseAdapter, QueryValue};
//!
//! let rows = adapter
//!     .query(r#"SELECT "text" FROM song WHERE "id" = $1"#, &[QueryValue::Integer(7)])
//!     .await?;
//! ```

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Result;

// =============================================================================
// Query Result Types
// =============================================================================

/// Represents a single row from a database query as a map of column names to values
pub type QueryRow = std::collections::HashMap<String, QueryValue>;

/// Represents a database value that can be null, integer, text, or a calendar date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryValue {
    Null,
    Integer(i64),
    Text(String),
    Date(NaiveDate),
}

impl QueryValue {
    /// Convert to i64 if possible
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            QueryValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Convert to String (owned) if possible
    pub fn as_string(&self) -> Option<String> {
        match self {
            QueryValue::Text(s) => Some(s.clone()),
            _ => None,
        }
    }
}

// =============================================================================
// Database Adapter Trait
// =============================================================================

/// Database adapter trait for parameterized statement execution
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync`; one adapter instance is shared by
/// every in-flight request.
///
/// ## Cancellation
///
/// Every method is an ordinary future. Dropping it before completion aborts
/// the round-trip, which is how caller-side cancellation propagates.
#[async_trait]
pub trait DatabaseAdapter: Send + Sync {
    /// Check if the database connection is healthy
    async fn health_check(&self) -> Result<()>;

    /// Execute a raw SQL query and return rows
    ///
    /// # Arguments
    ///
    /// * `query` - SQL query string
    /// * `params` - Query parameters (positional)
    ///
    /// # Safety
    ///
    /// This method must use parameterized queries to prevent SQL injection.
    /// Never concatenate user input directly into the query string.
    async fn query(&self, query: &str, params: &[QueryValue]) -> Result<Vec<QueryRow>>;

    /// Execute a SQL statement that doesn't return rows (INSERT, UPDATE, DELETE)
    ///
    /// # Returns
    ///
    /// Number of rows affected
    async fn execute(&self, statement: &str, params: &[QueryValue]) -> Result<u64>;

    /// Execute a query and return a single optional row
    async fn query_one_optional(
        &self,
        query: &str,
        params: &[QueryValue],
    ) -> Result<Option<QueryRow>>;

    /// Execute a query and return exactly one row
    ///
    /// Returns an error if no rows are returned.
    async fn query_one(&self, query: &str, params: &[QueryValue]) -> Result<QueryRow>;
}
