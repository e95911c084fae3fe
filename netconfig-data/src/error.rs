use thiserror::Error;

/// All errors generated in `netconfig-data`.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Error)]
pub enum DataError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("HTTP error status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("failed to parse provider response: {0}")]
    Parse(String),

    #[error("invalid provider endpoint: {0}")]
    Endpoint(String),

    #[error("no data available for: {0}")]
    NoData(String),
}

impl DataError {
    /// Determine if an error means the provider answered but had nothing for the entity, as
    /// opposed to a transport or decoding failure.
    #[allow(clippy::match_like_matches_macro)]
    pub fn is_empty_result(&self) -> bool {
        match self {
            DataError::NoData(_) => true,
            // Chart endpoints answer unknown symbols with 404
            DataError::Status { status: 404, .. } => true,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for DataError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::Parse(value.to_string())
        } else {
            Self::Http(value.to_string())
        }
    }
}

impl From<serde_json::Error> for DataError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value.to_string())
    }
}

impl From<url::ParseError> for DataError {
    fn from(value: url::ParseError) -> Self {
        Self::Endpoint(value.to_string())
    }
}
