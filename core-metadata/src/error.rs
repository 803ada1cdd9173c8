use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Song details lookup unavailable: HTTP {status}")]
    EnrichmentUnavailable { status: u16 },

    #[error("Failed to decode song details: {0}")]
    EnrichmentDecode(String),

    #[error("Bridge error: {0}")]
    Bridge(#[from] bridge_traits::error::BridgeError),
}

pub type Result<T> = std::result::Result<T, MetadataError>;
