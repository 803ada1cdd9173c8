//! Native Postgres Database Adapter
//!
//! Implements the `DatabaseAdapter` trait using `sqlx` with the Postgres
//! driver. Parameters are bound positionally; rows come back as `QueryRow`
//! maps keyed by column name.

use std::collections::HashMap;

use async_trait::async_trait;
use bridge_traits::database::{DatabaseAdapter, QueryRow, QueryValue};
use bridge_traits::error::{BridgeError, Result};
use chrono::NaiveDate;
use core_runtime::logging::component_span;
use sqlx::postgres::{PgArguments, PgPool, PgRow};
use sqlx::query::Query;
use sqlx::{Column, Postgres, Row, TypeInfo};
use tracing::{debug, warn, Instrument, Span};

/// Native Postgres implementation of DatabaseAdapter
///
/// Wraps a `PgPool`. Dropping an in-flight call releases its connection and
/// abandons the round-trip.
pub struct PostgresAdapter {
    pool: PgPool,
    span: Span,
}

impl PostgresAdapter {
    /// Wrap an existing, already configured pool
    pub fn from_pool(pool: PgPool, parent: &Span) -> Self {
        Self {
            pool,
            span: component_span(parent, "storage/postgres"),
        }
    }

    /// Get a reference to the underlying connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Decode a Postgres row using the declared column types
    fn row_to_query_row(row: &PgRow) -> Result<QueryRow> {
        let mut result = HashMap::with_capacity(row.columns().len());

        for column in row.columns() {
            let ordinal = column.ordinal();

            let value = match column.type_info().name() {
                "INT8" => row
                    .try_get::<Option<i64>, _>(ordinal)
                    .map(|v| v.map(QueryValue::Integer)),
                "INT4" => row
                    .try_get::<Option<i32>, _>(ordinal)
                    .map(|v| v.map(|i| QueryValue::Integer(i64::from(i)))),
                "INT2" => row
                    .try_get::<Option<i16>, _>(ordinal)
                    .map(|v| v.map(|i| QueryValue::Integer(i64::from(i)))),
                "DATE" => row
                    .try_get::<Option<NaiveDate>, _>(ordinal)
                    .map(|v| v.map(QueryValue::Date)),
                _ => row
                    .try_get::<Option<String>, _>(ordinal)
                    .map(|v| v.map(QueryValue::Text)),
            }
            .map_err(|e| {
                BridgeError::DatabaseError(format!(
                    "Failed to decode column {}: {}",
                    column.name(),
                    e
                ))
            })?;

            result.insert(column.name().to_string(), value.unwrap_or(QueryValue::Null));
        }

        Ok(result)
    }

    /// Bind QueryValue parameters in order
    ///
    /// `Null` binds as a text-typed null.
    fn bind_params<'q>(
        query: Query<'q, Postgres, PgArguments>,
        params: &'q [QueryValue],
    ) -> Query<'q, Postgres, PgArguments> {
        let mut query = query;
        for param in params {
            query = match param {
                QueryValue::Null => query.bind(None::<String>),
                QueryValue::Integer(i) => query.bind(*i),
                QueryValue::Text(s) => query.bind(s.as_str()),
                QueryValue::Date(d) => query.bind(*d),
            };
        }
        query
    }
}

#[async_trait]
impl DatabaseAdapter for PostgresAdapter {
    async fn health_check(&self) -> Result<()> {
        async {
            debug!("Performing database health check");

            sqlx::query("SELECT 1")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    warn!(error = %e, "Database health check failed");
                    BridgeError::DatabaseError(format!("Health check failed: {}", e))
                })?;

            debug!("Database health check passed");
            Ok(())
        }
        .instrument(self.span.clone())
        .await
    }

    async fn query(&self, query: &str, params: &[QueryValue]) -> Result<Vec<QueryRow>> {
        async {
            debug!(query = %query, param_count = params.len(), "Executing query");

            let rows = Self::bind_params(sqlx::query(query), params)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| BridgeError::DatabaseError(format!("Query failed: {}", e)))?;

            let result = rows
                .iter()
                .map(Self::row_to_query_row)
                .collect::<Result<Vec<_>>>()?;

            debug!(row_count = result.len(), "Query executed successfully");
            Ok(result)
        }
        .instrument(self.span.clone())
        .await
    }

    async fn execute(&self, statement: &str, params: &[QueryValue]) -> Result<u64> {
        async {
            debug!(statement = %statement, param_count = params.len(), "Executing statement");

            let result = Self::bind_params(sqlx::query(statement), params)
                .execute(&self.pool)
                .await
                .map_err(|e| BridgeError::DatabaseError(format!("Execute failed: {}", e)))?;

            let rows_affected = result.rows_affected();
            debug!(rows_affected, "Statement executed successfully");
            Ok(rows_affected)
        }
        .instrument(self.span.clone())
        .await
    }

    async fn query_one_optional(
        &self,
        query: &str,
        params: &[QueryValue],
    ) -> Result<Option<QueryRow>> {
        async {
            debug!(query = %query, param_count = params.len(), "Executing query_one_optional");

            let row = Self::bind_params(sqlx::query(query), params)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    BridgeError::DatabaseError(format!("Query one optional failed: {}", e))
                })?;

            row.as_ref().map(Self::row_to_query_row).transpose()
        }
        .instrument(self.span.clone())
        .await
    }

    async fn query_one(&self, query: &str, params: &[QueryValue]) -> Result<QueryRow> {
        async {
            debug!(query = %query, param_count = params.len(), "Executing query_one");

            let row = Self::bind_params(sqlx::query(query), params)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| BridgeError::DatabaseError(format!("Query one failed: {}", e)))?;

            Self::row_to_query_row(&row)
        }
        .instrument(self.span.clone())
        .await
    }
}
