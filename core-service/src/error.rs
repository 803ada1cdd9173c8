use core_library::LibraryError;
use core_metadata::MetadataError;
use thiserror::Error;

/// Failures surfaced to the boundary layer
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Page {page} out of range: {verses} verse(s) available")]
    PageOutOfRange { page: i64, verses: usize },

    #[error("Song details lookup unavailable: {0}")]
    EnrichmentUnavailable(String),

    #[error("Failed to decode song details: {0}")]
    EnrichmentDecode(String),

    #[error("Storage error: {0}")]
    Storage(#[source] LibraryError),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Initialization failed: {0}")]
    Initialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<LibraryError> for ServiceError {
    fn from(err: LibraryError) -> Self {
        match err {
            LibraryError::InvalidInput { field, message } => {
                ServiceError::Validation(format!("{}: {}", field, message))
            }
            LibraryError::InvalidDate(_) | LibraryError::NoFieldsToUpdate => {
                ServiceError::Validation(err.to_string())
            }
            LibraryError::NotFound { .. } => ServiceError::NotFound(err.to_string()),
            LibraryError::PageOutOfRange { page, verses } => {
                ServiceError::PageOutOfRange { page, verses }
            }
            other => ServiceError::Storage(other),
        }
    }
}

impl From<MetadataError> for ServiceError {
    fn from(err: MetadataError) -> Self {
        match err {
            MetadataError::EnrichmentDecode(message) => ServiceError::EnrichmentDecode(message),
            other => ServiceError::EnrichmentUnavailable(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
