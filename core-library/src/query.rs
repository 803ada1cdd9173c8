//! Statement builders for the `song` table.
//!
//! Every value travels as a positional parameter (`$1`, `$2`, ...); only
//! column identifiers from [`SongColumn`] are ever written into SQL text.

use bridge_traits::database::QueryValue;

use crate::criteria::{SongColumn, SongCriteria, SongPatch};
use crate::error::{LibraryError, Result};
use crate::models::NewSong;
use crate::repositories::PageRequest;

/// A SQL string together with its positional parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<QueryValue>,
}

/// `WHERE` conditions built from listing criteria
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    /// One `column = $k` clause per present predicate
    pub conditions: Vec<String>,
    pub params: Vec<QueryValue>,
}

impl FilterSpec {
    /// ` WHERE a AND b`, or an empty string when nothing is filtered
    pub fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }
}

fn select_columns() -> String {
    SongColumn::ALL
        .iter()
        .map(SongColumn::quoted)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Build equality conditions for every present criterion, numbered from `$1`.
pub fn build_filter(criteria: &SongCriteria) -> FilterSpec {
    let mut spec = FilterSpec::default();

    for (column, value) in criteria.predicates() {
        if let Some(value) = value {
            spec.params.push(value);
            spec.conditions
                .push(format!("{} = ${}", column.quoted(), spec.params.len()));
        }
    }

    spec
}

/// Filtered, paginated listing ordered by id.
pub fn build_list_statement(criteria: &SongCriteria, page: PageRequest) -> Statement {
    let filter = build_filter(criteria);
    let offset_index = filter.params.len() + 1;

    let sql = format!(
        r#"SELECT {} FROM song{} ORDER BY "id" OFFSET ${} LIMIT ${}"#,
        select_columns(),
        filter.where_clause(),
        offset_index,
        offset_index + 1,
    );

    let mut params = filter.params;
    params.push(QueryValue::Integer(page.offset()));
    params.push(QueryValue::Integer(page.limit()));

    Statement { sql, params }
}

/// `UPDATE` touching only present fields; the id is always the last parameter.
///
/// # Errors
///
/// `NoFieldsToUpdate` when the patch is empty.
pub fn build_update_statement(id: i64, patch: &SongPatch) -> Result<Statement> {
    if patch.is_empty() {
        return Err(LibraryError::NoFieldsToUpdate);
    }

    let mut assignments = Vec::new();
    let mut params = Vec::new();

    for (column, value) in patch.assignments() {
        if let Some(value) = value {
            params.push(value);
            assignments.push(format!("{} = ${}", column.quoted(), params.len()));
        }
    }

    params.push(QueryValue::Integer(id));
    let sql = format!(
        r#"UPDATE song SET {} WHERE "id" = ${}"#,
        assignments.join(", "),
        params.len()
    );

    Ok(Statement { sql, params })
}

/// `INSERT ... RETURNING "id"`
pub fn build_insert_statement(song: &NewSong) -> Statement {
    let columns = &SongColumn::ALL[1..];
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${}", i)).collect();

    Statement {
        sql: format!(
            r#"INSERT INTO song ({}) VALUES ({}) RETURNING "id""#,
            columns
                .iter()
                .map(SongColumn::quoted)
                .collect::<Vec<_>>()
                .join(", "),
            placeholders.join(", ")
        ),
        params: vec![
            QueryValue::Text(song.title.clone()),
            QueryValue::Text(song.group.clone()),
            QueryValue::Text(song.text.clone()),
            QueryValue::Text(song.link.clone()),
            QueryValue::Date(song.release_date.as_naive_date()),
        ],
    }
}

pub fn build_text_statement(id: i64) -> Statement {
    Statement {
        sql: r#"SELECT "text" FROM song WHERE "id" = $1"#.to_string(),
        params: vec![QueryValue::Integer(id)],
    }
}

pub fn build_delete_statement(id: i64) -> Statement {
    Statement {
        sql: r#"DELETE FROM song WHERE "id" = $1"#.to_string(),
        params: vec![QueryValue::Integer(id)],
    }
}
