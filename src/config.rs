use std::path::PathBuf;

use tracing::warn;

// =============================================================================
// Tool identity
// =============================================================================

/// Name sent in the `User-Agent` header of version check requests
pub const TOOL_NAME: &str = "upcheck";

/// Version of the running build
pub const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Defaults
// =============================================================================

/// Endpoint answering with `{"latest": "<version>"}`
pub const DEFAULT_VERSION_CHECK_URL: &str = "https://upcheck.dev/api/check-version";

/// Request timeout in seconds. Kept short so startup is never blocked for long.
pub const DEFAULT_TIMEOUT_SECS: u64 = 2;

/// File name of the cache record inside the user cache directory
pub const CACHE_FILE_NAME: &str = "upcheck_version";

/// Maximum age of a cached latest version in seconds (24 hours)
pub const CACHE_TTL_SECS: i64 = 24 * 60 * 60;

// =============================================================================
// Environment overrides
// =============================================================================

pub const ENV_VERSION_CHECK_URL: &str = "UPCHECK_VERSION_CHECK_URL";
pub const ENV_VERSION_CHECK_TIMEOUT: &str = "UPCHECK_VERSION_CHECK_TIMEOUT";
pub const ENV_VERSION_CACHE_PATH: &str = "UPCHECK_VERSION_CACHE_PATH";

/// Returns the `User-Agent` value identifying this build, e.g. `upcheck/0.5.1`
pub fn user_agent() -> String {
    format!("{}/{}", TOOL_NAME, CURRENT_VERSION)
}

/// Freshness check configuration, built once at startup and passed down
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Version check endpoint
    pub url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Location of the cache record
    pub cache_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: DEFAULT_VERSION_CHECK_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            cache_path: default_cache_path(dirs::home_dir()),
        }
    }
}

impl Config {
    /// Builds the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok(), dirs::home_dir())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// Unset or empty variables keep their defaults. A timeout that is not a
    /// whole number of seconds is ignored with a warning.
    pub fn from_lookup<F>(lookup: F, home_dir: Option<PathBuf>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let url = lookup(ENV_VERSION_CHECK_URL)
            .unwrap_or_else(|| DEFAULT_VERSION_CHECK_URL.to_string());

        let timeout_secs = match lookup(ENV_VERSION_CHECK_TIMEOUT) {
            Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
                warn!(
                    "Ignoring {}={:?}: {}, using {}s",
                    ENV_VERSION_CHECK_TIMEOUT, raw, e, DEFAULT_TIMEOUT_SECS
                );
                DEFAULT_TIMEOUT_SECS
            }),
            None => DEFAULT_TIMEOUT_SECS,
        };

        let cache_path = lookup(ENV_VERSION_CACHE_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|| default_cache_path(home_dir));

        Self {
            url,
            timeout_secs,
            cache_path,
        }
    }
}

/// Returns ~/.cache/upcheck_version, or ./.cache/upcheck_version when no
/// home directory is available.
fn default_cache_path(home_dir: Option<PathBuf>) -> PathBuf {
    home_dir
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".cache")
        .join(CACHE_FILE_NAME)
}
