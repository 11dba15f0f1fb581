use helpbus_transit::TransitError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("empty query")]
    EmptyQuery,

    #[error("no place found for '{0}'")]
    PlaceNotFound(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Transit(#[from] TransitError),

    #[error("geocoding request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
