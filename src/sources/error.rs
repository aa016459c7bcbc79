use reqwest::StatusCode;

use crate::transit::GeoError;

/// Why a single poll cycle produced nothing. None of these are fatal; the
/// affected panel just keeps its previous contents.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { status: StatusCode, url: String },

    #[error("Unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("No position fix yet")]
    NoPosition,

    #[error(transparent)]
    Geo(#[from] GeoError),
}

pub type Result<T> = std::result::Result<T, FetchError>;
