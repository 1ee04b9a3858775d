//! Common types shared by registries, the selector and the resolver

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::ValueEnum;
use pep508_rs::PackageName;
use regex::Regex;

use crate::version::error::{CutoffError, PackageRefError};

/// Packagist's own naming rule for `vendor/package`
static COMPOSER_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([_.-]?[a-z0-9]+)*/[a-z0-9](([_.]?|-{0,2})[a-z0-9]+)*$")
        .expect("composer name pattern is valid")
});

/// Type of package registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum)]
pub enum RegistryType {
    /// PyPI (pip)
    Pip,
    /// npm registry
    Npm,
    /// crates.io (cargo)
    Cargo,
    /// RubyGems (gem)
    Gem,
    /// Packagist (composer)
    Composer,
}

impl RegistryType {
    pub const ALL: [RegistryType; 5] = [
        RegistryType::Pip,
        RegistryType::Npm,
        RegistryType::Cargo,
        RegistryType::Gem,
        RegistryType::Composer,
    ];

    /// Returns the string representation of the registry type
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistryType::Pip => "pip",
            RegistryType::Npm => "npm",
            RegistryType::Cargo => "cargo",
            RegistryType::Gem => "gem",
            RegistryType::Composer => "composer",
        }
    }

    /// Human-readable name of the registry service
    pub fn registry_name(&self) -> &'static str {
        match self {
            RegistryType::Pip => "PyPI",
            RegistryType::Npm => "npm",
            RegistryType::Cargo => "crates.io",
            RegistryType::Gem => "RubyGems",
            RegistryType::Composer => "Packagist",
        }
    }
}

impl fmt::Display for RegistryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A package to resolve, as requested on the command line
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageRef {
    registry_type: RegistryType,
    /// Name used against the registry
    name: String,
    /// Name exactly as the user typed it
    requested: String,
}

impl PackageRef {
    /// Validates and normalizes `name` according to the registry's conventions
    pub fn new(registry_type: RegistryType, name: &str) -> Result<Self, PackageRefError> {
        let requested = name.trim();
        if requested.is_empty() {
            return Err(PackageRefError::Empty);
        }

        let normalized = match registry_type {
            RegistryType::Pip => PackageName::new(requested.to_string())
                .map_err(|e| PackageRefError::Invalid {
                    name: requested.to_string(),
                    reason: e.to_string(),
                })?
                .to_string(),
            RegistryType::Composer => {
                let lowered = requested.to_lowercase();
                if !COMPOSER_NAME_RE.is_match(&lowered) {
                    return Err(PackageRefError::Invalid {
                        name: requested.to_string(),
                        reason: "expected 'vendor/package' format".to_string(),
                    });
                }
                lowered
            }
            RegistryType::Npm if requested.contains('%') => {
                return Err(PackageRefError::Invalid {
                    name: requested.to_string(),
                    reason: "give the name unescaped, e.g. @scope/name".to_string(),
                });
            }
            RegistryType::Npm | RegistryType::Cargo | RegistryType::Gem => requested.to_string(),
        };

        Ok(Self {
            registry_type,
            name: normalized,
            requested: requested.to_string(),
        })
    }

    pub fn registry_type(&self) -> RegistryType {
        self.registry_type
    }

    /// Normalized name sent to the registry
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name as originally given
    pub fn requested(&self) -> &str {
        &self.requested
    }
}

impl fmt::Display for PackageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.registry_type, self.name)
    }
}

/// Inclusive upper bound on a release's publish time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cutoff(DateTime<Utc>);

impl Cutoff {
    /// Creates a cutoff at an exact instant
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }

    /// Cutoff covering the whole calendar day, i.e. `23:59:59Z` of `date`
    pub fn end_of_day(date: NaiveDate) -> Self {
        let end = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
        Self(date.and_time(end).and_utc())
    }

    pub fn instant(&self) -> DateTime<Utc> {
        self.0
    }

    pub fn date(&self) -> NaiveDate {
        self.0.date_naive()
    }

    /// Returns true if a release published at `published_at` qualifies
    pub fn admits(&self, published_at: DateTime<Utc>) -> bool {
        published_at <= self.0
    }
}

impl FromStr for Cutoff {
    type Err = CutoffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let date = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|source| {
            CutoffError::InvalidDate {
                input: s.to_string(),
                source,
            }
        })?;
        Ok(Self::end_of_day(date))
    }
}

impl fmt::Display for Cutoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S UTC"))
    }
}

/// Why a release can never be selected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidReason {
    /// The release has no downloadable files
    NoArtifact,
    /// The registry reports no publish time
    MissingTimestamp,
    /// The publish time could not be parsed
    MalformedTimestamp(String),
    /// The release was yanked by its owner
    Yanked,
    /// The release was removed from the registry
    Unpublished,
    /// The version string is not valid for the ecosystem
    MalformedVersion,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::NoArtifact => f.write_str("no files attached"),
            InvalidReason::MissingTimestamp => f.write_str("no publish time"),
            InvalidReason::MalformedTimestamp(raw) => write!(f, "unparseable time '{}'", raw),
            InvalidReason::Yanked => f.write_str("yanked"),
            InvalidReason::Unpublished => f.write_str("unpublished"),
            InvalidReason::MalformedVersion => f.write_str("invalid version string"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validity {
    Valid,
    Invalid(InvalidReason),
}

/// One release as reported by a registry
///
/// A valid candidate always has a publish time; invalid ones may not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub version: String,
    pub published_at: Option<DateTime<Utc>>,
    pub validity: Validity,
}

impl Candidate {
    /// A usable release published at `published_at`
    pub fn published(version: impl Into<String>, published_at: DateTime<Utc>) -> Self {
        Self {
            version: version.into(),
            published_at: Some(published_at),
            validity: Validity::Valid,
        }
    }

    /// A release that must be skipped regardless of its date
    pub fn rejected(
        version: impl Into<String>,
        published_at: Option<DateTime<Utc>>,
        reason: InvalidReason,
    ) -> Self {
        Self {
            version: version.into(),
            published_at,
            validity: Validity::Invalid(reason),
        }
    }

    /// Publish time of a valid candidate
    pub fn valid_time(&self) -> Option<DateTime<Utc>> {
        match self.validity {
            Validity::Valid => self.published_at,
            Validity::Invalid(_) => None,
        }
    }
}

/// The version a package resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion {
    pub version: String,
    pub published_at: DateTime<Utc>,
}

/// A valid release placed on a package's timeline
pub type Release = ResolvedVersion;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    #[case(RegistryType::Pip, "Django", "django")]
    #[case(RegistryType::Pip, "zope.interface", "zope-interface")]
    #[case(RegistryType::Pip, "Foo__Bar", "foo-bar")]
    #[case(RegistryType::Npm, "@types/node", "@types/node")]
    #[case(RegistryType::Cargo, " serde ", "serde")]
    #[case(RegistryType::Gem, "rails", "rails")]
    #[case(RegistryType::Composer, "Monolog/Monolog", "monolog/monolog")]
    fn package_ref_normalizes_names(
        #[case] registry_type: RegistryType,
        #[case] input: &str,
        #[case] expected: &str,
    ) {
        let package = PackageRef::new(registry_type, input).unwrap();
        assert_eq!(package.name(), expected);
        assert_eq!(package.requested(), input.trim());
    }

    #[rstest]
    #[case(RegistryType::Npm, "")]
    #[case(RegistryType::Cargo, "   ")]
    #[case(RegistryType::Composer, "monolog")]
    #[case(RegistryType::Composer, "vendor/pkg/extra")]
    #[case(RegistryType::Pip, "-not-a-name-")]
    #[case(RegistryType::Npm, "@types%2Fnode")]
    #[case(RegistryType::Npm, "left%2Dpad")]
    fn package_ref_rejects_invalid_names(#[case] registry_type: RegistryType, #[case] input: &str) {
        assert!(PackageRef::new(registry_type, input).is_err());
    }

    #[test]
    fn npm_scoped_name_is_kept_as_typed() {
        let package = PackageRef::new(RegistryType::Npm, "@types/node").unwrap();
        assert_eq!(package.name(), "@types/node");
        assert!(matches!(
            PackageRef::new(RegistryType::Npm, "@types%2Fnode"),
            Err(PackageRefError::Invalid { reason, .. }) if reason.contains("unescaped")
        ));
    }

    #[test]
    fn cutoff_parses_date_to_end_of_day() {
        let cutoff: Cutoff = "2020-01-01".parse().unwrap();
        assert_eq!(
            cutoff.instant(),
            Utc.with_ymd_and_hms(2020, 1, 1, 23, 59, 59).unwrap()
        );
    }

    #[rstest]
    #[case("2020-13-01")]
    #[case("01/01/2020")]
    #[case("yesterday")]
    #[case("")]
    fn cutoff_rejects_malformed_dates(#[case] input: &str) {
        assert!(input.parse::<Cutoff>().is_err());
    }

    #[test]
    fn cutoff_admits_releases_on_the_same_day() {
        let cutoff: Cutoff = "2019-05-16".parse().unwrap();
        assert!(cutoff.admits(Utc.with_ymd_and_hms(2019, 5, 16, 17, 21, 44).unwrap()));
        assert!(cutoff.admits(Utc.with_ymd_and_hms(2019, 5, 16, 23, 59, 59).unwrap()));
        assert!(!cutoff.admits(Utc.with_ymd_and_hms(2019, 5, 17, 0, 0, 0).unwrap()));
    }

    #[test]
    fn valid_time_is_none_for_rejected_candidates() {
        let at = Utc.with_ymd_and_hms(2018, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(Candidate::published("1.0.0", at).valid_time(), Some(at));
        assert_eq!(
            Candidate::rejected("0.1.0", Some(at), InvalidReason::Yanked).valid_time(),
            None
        );
    }
}
