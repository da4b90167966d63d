//! Freshness verdict for the running build

use tracing::{debug, warn};

use crate::config::{CURRENT_VERSION, Config};
use crate::version::cache::VersionCache;
use crate::version::fetcher::{HttpFetcher, VersionFetcher};
use crate::version::semver::is_up_to_date;

/// Outcome of a freshness check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FreshnessStatus {
    /// Running version is the latest, or newer
    UpToDate { latest: String },
    /// A newer version has been published
    Outdated { latest: String },
    /// Latest version unavailable or not comparable
    Unknown,
}

impl FreshnessStatus {
    pub fn is_up_to_date(&self) -> bool {
        matches!(self, Self::UpToDate { .. })
    }
}

pub struct FreshnessChecker<F: VersionFetcher> {
    cache: VersionCache,
    fetcher: F,
    current_version: String,
}

impl FreshnessChecker<HttpFetcher> {
    /// Checker for this build, wired from the startup configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            VersionCache::new(&config.cache_path),
            HttpFetcher::from_config(config),
            CURRENT_VERSION,
        )
    }
}

impl<F: VersionFetcher> FreshnessChecker<F> {
    pub fn new(cache: VersionCache, fetcher: F, current_version: &str) -> Self {
        Self {
            cache,
            fetcher,
            current_version: current_version.to_string(),
        }
    }

    /// Resolve the latest version, preferring a fresh cache record.
    ///
    /// On a miss the fetcher is asked and a successful answer is written back
    /// to the cache. A failed cache write is logged and does not stop the check.
    pub fn latest_version(&self) -> Option<String> {
        if let Some(cached) = self.cache.read() {
            debug!("Using cached latest version {}", cached);
            return Some(cached);
        }

        let fetched = self.fetcher.fetch_latest()?;

        if let Err(e) = self.cache.write(&fetched) {
            warn!(
                "Failed to write version cache {:?}: {}",
                self.cache.path(),
                e
            );
        }

        Some(fetched)
    }

    /// Compare the running version against the latest known version
    pub fn check(&self) -> FreshnessStatus {
        let Some(latest) = self.latest_version() else {
            return FreshnessStatus::Unknown;
        };

        match is_up_to_date(&self.current_version, &latest) {
            Ok(true) => FreshnessStatus::UpToDate { latest },
            Ok(false) => FreshnessStatus::Outdated { latest },
            Err(e) => {
                debug!("Invalid version string: {}", e);
                FreshnessStatus::Unknown
            }
        }
    }

    /// Returns true only when the running version is confirmed to be at
    /// least the latest. Any uncertainty yields false.
    pub fn is_running_latest(&self) -> bool {
        self.check().is_up_to_date()
    }
}
