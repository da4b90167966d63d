//! Remote lookup of the latest published version

use std::time::Duration;

#[cfg(test)]
use mockall::automock;

use serde::Deserialize;
use tracing::debug;

use crate::config::{Config, user_agent};
use crate::version::error::FetchError;

/// Field of the response body holding the latest version
const LATEST_FIELD: &str = "latest";

/// Response from the version check endpoint
#[derive(Debug, Deserialize)]
struct CheckVersionResponse {
    latest: Option<serde_json::Value>,
}

/// Trait for looking up the latest published version
#[cfg_attr(test, automock)]
pub trait VersionFetcher {
    /// Returns the latest version, or `None` when it could not be determined.
    ///
    /// Implementations never fail loudly: every error is logged and turned
    /// into `None`.
    fn fetch_latest(&self) -> Option<String>;
}

/// Fetcher issuing one blocking GET to the version check endpoint
pub struct HttpFetcher {
    url: String,
    timeout: Duration,
    user_agent: String,
}

impl HttpFetcher {
    pub fn new(url: &str, timeout_secs: u64) -> Self {
        Self {
            url: url.to_string(),
            timeout: Duration::from_secs(timeout_secs),
            user_agent: user_agent(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.url, config.timeout_secs)
    }

    /// Overrides the `User-Agent` header value
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Performs the request, reporting exactly why it failed.
    pub fn try_fetch(&self) -> Result<String, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(&self.user_agent)
            .timeout(self.timeout)
            .build()?;

        let response = client.get(&self.url).send()?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let body = response.text()?;
        let parsed: CheckVersionResponse =
            serde_json::from_str(&body).map_err(|e| FetchError::InvalidJson(e.to_string()))?;

        match parsed.latest {
            Some(serde_json::Value::String(version)) => Ok(version),
            Some(serde_json::Value::Null) | None => Err(FetchError::MissingField(LATEST_FIELD)),
            // Numbers and other scalars are taken as their JSON text
            Some(other) => Ok(other.to_string()),
        }
    }
}

impl VersionFetcher for HttpFetcher {
    fn fetch_latest(&self) -> Option<String> {
        self.try_fetch()
            .inspect_err(|e| match e {
                FetchError::Network(err) if err.is_timeout() => {
                    debug!("Fetching latest version timed out: {}", err)
                }
                FetchError::Network(err) => {
                    debug!("Fetching latest version failed to connect: {}", err)
                }
                FetchError::HttpStatus(code) => {
                    debug!("Fetching latest version received HTTP error code: {}", code)
                }
                FetchError::InvalidJson(msg) => {
                    debug!("Fetching latest version received invalid JSON: {}", msg)
                }
                FetchError::MissingField(field) => {
                    debug!("Fetching latest version response has no `{}` field", field)
                }
            })
            .ok()
    }
}
