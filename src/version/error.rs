use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid timestamp: {0:?}")]
    InvalidTimestamp(String),

    #[error("Cache record has no version line")]
    MissingVersion,
}

#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection failures and timeouts alike
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected HTTP status: {0}")]
    HttpStatus(u16),

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Response is missing field `{0}`")]
    MissingField(&'static str),
}

#[derive(Debug, Error)]
pub enum VersionError {
    #[error("Invalid version format {version:?}: {source}")]
    InvalidVersionFormat {
        version: String,
        #[source]
        source: semver::Error,
    },
}
