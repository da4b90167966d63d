//! File-backed cache of the latest known version
//!
//! The record is two newline-terminated lines: the integer second at which it
//! was written, then the version string. Records older than
//! [`CACHE_TTL_SECS`] are ignored. Nothing locks the file, so a reader racing
//! a writer may see a partial record; that is reported as a miss.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::CACHE_TTL_SECS;
use crate::version::error::CacheError;

/// Parsed contents of the cache file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRecord {
    /// Seconds since UNIX epoch at write time
    pub timestamp: i64,
    pub version: String,
}

impl CacheRecord {
    fn parse(contents: &str) -> Result<Self, CacheError> {
        let mut lines = contents.lines();

        let timestamp_str = lines.next().unwrap_or_default();
        let timestamp = timestamp_str
            .trim()
            .parse()
            .map_err(|_| CacheError::InvalidTimestamp(timestamp_str.to_string()))?;

        let version = lines
            .next()
            .filter(|line| !line.is_empty())
            .ok_or(CacheError::MissingVersion)?;

        Ok(Self {
            timestamp,
            version: version.to_string(),
        })
    }

    fn serialize(&self) -> String {
        format!("{}\n{}\n", self.timestamp, self.version)
    }

    /// A record is fresh while its age is below the TTL. An age that does not
    /// fit in an `i64` comes from a corrupt timestamp and is never fresh.
    fn is_fresh_at(&self, now: i64) -> bool {
        now.checked_sub(self.timestamp).is_some_and(|age| age < CACHE_TTL_SECS)
    }
}

pub struct VersionCache {
    path: PathBuf,
}

impl VersionCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get current timestamp in seconds since UNIX epoch
    fn current_timestamp() -> i64 {
        chrono::Utc::now().timestamp()
    }

    /// Returns the cached version if the record exists, is well formed and
    /// has not expired.
    pub fn read(&self) -> Option<String> {
        self.read_at(Self::current_timestamp())
    }

    /// Same as [`read`](Self::read) with an explicit clock value.
    pub fn read_at(&self, now: i64) -> Option<String> {
        let record = match self.load() {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!("Version cache does not exist: {:?}", self.path);
                return None;
            }
            Err(e) => {
                debug!("Version cache unreadable at {:?}: {}", self.path, e);
                return None;
            }
        };

        if !record.is_fresh_at(now) {
            debug!("Version cache expired: {}:{}", record.timestamp, now);
            return None;
        }

        Some(record.version)
    }

    /// Reads and parses the record regardless of its age.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    pub fn load(&self) -> Result<Option<CacheRecord>, CacheError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        CacheRecord::parse(&contents).map(Some)
    }

    /// Overwrites the record with `version` stamped with the current time,
    /// creating parent directories as needed.
    pub fn write(&self, version: &str) -> Result<(), CacheError> {
        self.write_at(version, Self::current_timestamp())
    }

    /// Same as [`write`](Self::write) with an explicit clock value.
    pub fn write_at(&self, version: &str, now: i64) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let record = CacheRecord {
            timestamp: now,
            version: version.to_string(),
        };
        fs::write(&self.path, record.serialize())?;

        debug!("Cached latest version {} at {:?}", version, self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    const NOW: i64 = 1_700_000_000;

    fn cache_in(temp_dir: &TempDir) -> VersionCache {
        VersionCache::new(temp_dir.path().join("upcheck_version"))
    }

    #[test]
    fn read_returns_none_when_file_does_not_exist() {
        let temp_dir = TempDir::new().unwrap();
        let cache = cache_in(&temp_dir);

        assert_eq!(cache.read_at(NOW), None);
    }

    #[test]
    fn write_then_read_returns_written_version() {
        let temp_dir = TempDir::new().unwrap();
        let cache = cache_in(&temp_dir);

        cache.write_at("1.2.0-rc.1+build.7", NOW).unwrap();

        assert_eq!(cache.read_at(NOW), Some("1.2.0-rc.1+build.7".to_string()));
    }

    #[test]
    fn write_produces_two_newline_terminated_lines() {
        let temp_dir = TempDir::new().unwrap();
        let cache = cache_in(&temp_dir);

        cache.write_at("1.2.0", NOW).unwrap();

        let contents = fs::read_to_string(cache.path()).unwrap();
        assert_eq!(contents, "1700000000\n1.2.0\n");
    }

    #[test]
    fn write_creates_missing_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let cache = VersionCache::new(temp_dir.path().join("a/b/c/upcheck_version"));

        cache.write_at("1.0.0", NOW).unwrap();
        // Existing directories are fine too
        cache.write_at("1.0.1", NOW).unwrap();

        assert_eq!(cache.read_at(NOW), Some("1.0.1".to_string()));
    }

    #[test]
    fn write_overwrites_previous_record() {
        let temp_dir = TempDir::new().unwrap();
        let cache = cache_in(&temp_dir);

        cache.write_at("1.0.0", NOW - 100).unwrap();
        cache.write_at("1.1.0", NOW).unwrap();

        assert_eq!(
            cache.load().unwrap(),
            Some(CacheRecord {
                timestamp: NOW,
                version: "1.1.0".to_string(),
            })
        );
    }

    #[test]
    fn read_twice_returns_same_result() {
        let temp_dir = TempDir::new().unwrap();
        let cache = cache_in(&temp_dir);
        cache.write_at("2.0.0", NOW).unwrap();

        let first = cache.read_at(NOW + 10);
        let second = cache.read_at(NOW + 10);

        assert_eq!(first, second);
        assert_eq!(first, Some("2.0.0".to_string()));
    }

    #[rstest]
    #[case(0, true)]
    #[case(CACHE_TTL_SECS - 1, true)]
    #[case(CACHE_TTL_SECS, false)] // exactly the TTL is expired
    #[case(90_000, false)]
    #[case(-60, true)] // written in the future
    fn read_honours_ttl_boundary(#[case] age: i64, #[case] fresh: bool) {
        let temp_dir = TempDir::new().unwrap();
        let cache = cache_in(&temp_dir);
        cache.write_at("1.0.0", NOW - age).unwrap();

        assert_eq!(cache.read_at(NOW).is_some(), fresh);
    }

    #[rstest]
    #[case("abc\n1.0.0\n")]
    #[case("1.5e9\n1.0.0\n")]
    #[case("")]
    #[case("1700000000\n")] // partially written
    #[case("1700000000\n\n")]
    #[case("-9223372036854775808\n1.0.0\n")] // age overflows i64
    fn read_treats_malformed_record_as_miss(#[case] contents: &str) {
        let temp_dir = TempDir::new().unwrap();
        let cache = cache_in(&temp_dir);
        fs::write(cache.path(), contents).unwrap();

        assert_eq!(cache.read_at(NOW), None);
    }

    #[test]
    fn read_accepts_crlf_line_endings() {
        let temp_dir = TempDir::new().unwrap();
        let cache = cache_in(&temp_dir);
        fs::write(cache.path(), format!("{}\r\n1.4.2\r\n", NOW)).unwrap();

        assert_eq!(cache.read_at(NOW), Some("1.4.2".to_string()));
    }

    #[test]
    fn read_does_not_validate_version_string() {
        let temp_dir = TempDir::new().unwrap();
        let cache = cache_in(&temp_dir);
        fs::write(cache.path(), format!("{}\nnot a version\n", NOW)).unwrap();

        assert_eq!(cache.read_at(NOW), Some("not a version".to_string()));
    }

    #[test]
    fn load_reports_invalid_timestamp() {
        let temp_dir = TempDir::new().unwrap();
        let cache = cache_in(&temp_dir);
        fs::write(cache.path(), "abc\n1.0.0\n").unwrap();

        assert!(matches!(
            cache.load(),
            Err(CacheError::InvalidTimestamp(ref s)) if s == "abc"
        ));
    }

    #[test]
    fn write_fails_when_parent_is_a_file() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let cache = VersionCache::new(blocker.join("upcheck_version"));

        assert!(matches!(cache.write_at("1.0.0", NOW), Err(CacheError::Io(_))));
    }
}
