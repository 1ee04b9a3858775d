//! Release windows: which versions were "latest" while an anchor release was

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::version::types::Release;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnchorError {
    #[error("Anchor must be in format <package>==<version>, got '{0}'")]
    Malformed(String),

    #[error("Version '{version}' not found for '{package}'")]
    UnknownVersion { package: String, version: String },
}

/// A version together with the part of the window during which it was the newest release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowedVersion {
    pub version: String,
    pub overlap_start: DateTime<Utc>,
    pub overlap_end: DateTime<Utc>,
}

/// Splits `name==version` into its two trimmed parts
pub fn parse_anchor(spec: &str) -> Result<(String, String), AnchorError> {
    let malformed = || AnchorError::Malformed(spec.to_string());
    let (name, version) = spec.split_once("==").ok_or_else(malformed)?;

    let (name, version) = (name.trim(), version.trim());
    if name.is_empty() || version.is_empty() {
        return Err(malformed());
    }

    Ok((name.to_string(), version.to_string()))
}

/// Time span during which `version` was the newest release on `timeline`
///
/// Ends when the next release appears, or at `now` for the newest release.
/// `timeline` must be sorted oldest first.
pub fn anchor_window(
    package: &str,
    version: &str,
    timeline: &[Release],
    now: DateTime<Utc>,
) -> Result<(DateTime<Utc>, DateTime<Utc>), AnchorError> {
    let index = timeline
        .iter()
        .position(|release| release.version == version)
        .ok_or_else(|| AnchorError::UnknownVersion {
            package: package.to_string(),
            version: version.to_string(),
        })?;

    let start = timeline[index].published_at;
    let end = timeline
        .get(index + 1)
        .map(|release| release.published_at)
        .unwrap_or(now);

    Ok((start, end))
}

/// Every release of `timeline` that was the newest at some instant in `[start, end)`
///
/// `timeline` must be sorted oldest first.
pub fn versions_overlapping_window(
    timeline: &[Release],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Vec<WindowedVersion> {
    if timeline.is_empty() || window_start >= window_end {
        return Vec::new();
    }

    // Start from the release that was current when the window opened
    let first = timeline
        .iter()
        .rposition(|release| release.published_at <= window_start)
        .unwrap_or(0);

    timeline[first..]
        .iter()
        .enumerate()
        .take_while(|(_, release)| release.published_at < window_end)
        .filter_map(|(offset, release)| {
            let next = timeline
                .get(first + offset + 1)
                .map(|next| next.published_at)
                .unwrap_or(window_end);

            let overlap_start = release.published_at.max(window_start);
            let overlap_end = next.min(window_end);

            (overlap_start < overlap_end).then(|| WindowedVersion {
                version: release.version.clone(),
                overlap_start,
                overlap_end,
            })
        })
        .collect()
}
