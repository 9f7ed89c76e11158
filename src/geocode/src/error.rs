use std::path::PathBuf;

/// Errors from geocoding a place query
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    /// The service found nothing polygonal for the query
    #[error("{0}")]
    NotGeocoded(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status
    #[error("geocoding service error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cache error ({path}): {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GeocodeError {
    pub fn is_not_geocoded(&self) -> bool {
        matches!(self, GeocodeError::NotGeocoded(_))
    }
}

pub type Result<T, E = GeocodeError> = std::result::Result<T, E>;
