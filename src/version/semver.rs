use std::cmp::Ordering;

use semver::Version;

use crate::version::error::VersionError;

/// Parse a version string into a semver::Version, normalizing partial versions.
///
/// Strips surrounding whitespace and a leading `v`, and pads numeric partial
/// versions with zeros. Everything else must be valid semver.
///
/// Examples:
/// - "1" -> Version(1, 0, 0)
/// - "v1.2" -> Version(1, 2, 0)
/// - "1.2.3-rc.1+build.5" -> Version(1, 2, 3, pre: rc.1, build: build.5)
pub fn parse_version(version: &str) -> Result<Version, VersionError> {
    let trimmed = version.trim();
    let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);

    let parts: Vec<&str> = trimmed.split('.').collect();
    let numeric = parts
        .iter()
        .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()));
    let normalized = match parts.len() {
        1 if numeric => format!("{}.0.0", parts[0]),
        2 if numeric => format!("{}.{}.0", parts[0], parts[1]),
        _ => trimmed.to_string(),
    };

    Version::parse(&normalized).map_err(|source| VersionError::InvalidVersionFormat {
        version: version.to_string(),
        source,
    })
}

/// Compare two version strings by semver precedence.
///
/// Build metadata does not take part in the ordering, and a pre-release sorts
/// before the release it precedes.
pub fn compare_versions(a: &str, b: &str) -> Result<Ordering, VersionError> {
    let a = parse_version(a)?;
    let b = parse_version(b)?;

    Ok((a.major, a.minor, a.patch, &a.pre).cmp(&(b.major, b.minor, b.patch, &b.pre)))
}

/// Returns true when `running` is the same as or newer than `latest`.
pub fn is_up_to_date(running: &str, latest: &str) -> Result<bool, VersionError> {
    Ok(compare_versions(running, latest)? != Ordering::Less)
}
