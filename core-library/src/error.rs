use bridge_traits::error::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Invalid input: {field} - {message}")]
    InvalidInput { field: String, message: String },

    #[error("Invalid date '{0}': expected DD.MM.YYYY")]
    InvalidDate(String),

    #[error("No fields to update")]
    NoFieldsToUpdate,

    #[error("Page {page} out of range: {verses} verse(s) available")]
    PageOutOfRange { page: i64, verses: usize },

    #[error("Migration failed: {0}")]
    Migration(String),
}

impl LibraryError {
    pub(crate) fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        LibraryError::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    pub(crate) fn song_not_found(id: i64) -> Self {
        LibraryError::NotFound {
            entity_type: "Song".to_string(),
            id: id.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LibraryError>;
