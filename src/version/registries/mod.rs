//! Registry implementations for fetching release metadata

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::config::RegistriesConfig;
use crate::version::error::RegistryError;
use crate::version::http::HttpClient;
use crate::version::registry::{RawDocument, Registry};
use crate::version::types::RegistryType;

pub mod crates_io;
pub mod npm;
pub mod packagist;
pub mod pypi;
pub mod rubygems;

pub use crates_io::CratesIoRegistry;
pub use npm::NpmRegistry;
pub use packagist::PackagistRegistry;
pub use pypi::PypiRegistry;
pub use rubygems::RubyGemsRegistry;

/// Builds one adapter per registry type, all sharing `http`
pub fn build_registries(
    config: &RegistriesConfig,
    http: &HttpClient,
) -> HashMap<RegistryType, Arc<dyn Registry>> {
    let mut registries: HashMap<RegistryType, Arc<dyn Registry>> = HashMap::new();
    registries.insert(
        RegistryType::Pip,
        Arc::new(PypiRegistry::new(http.clone(), &config.pip.base_url)),
    );
    registries.insert(
        RegistryType::Npm,
        Arc::new(NpmRegistry::new(http.clone(), &config.npm.base_url)),
    );
    registries.insert(
        RegistryType::Cargo,
        Arc::new(CratesIoRegistry::new(http.clone(), &config.cargo.base_url)),
    );
    registries.insert(
        RegistryType::Gem,
        Arc::new(RubyGemsRegistry::new(http.clone(), &config.gem.base_url)),
    );
    registries.insert(
        RegistryType::Composer,
        Arc::new(PackagistRegistry::new(http.clone(), &config.composer.base_url)),
    );
    registries
}

/// Appends path segments to `base_url`, percent-encoding each one
///
/// A `/` inside a segment is encoded, so `@scope/name` stays a single segment.
pub(crate) fn endpoint(base_url: &str, segments: &[&str]) -> Result<Url, RegistryError> {
    let mut url = Url::parse(base_url)
        .map_err(|e| RegistryError::InvalidUrl(format!("{}: {}", base_url, e)))?;
    url.path_segments_mut()
        .map_err(|_| RegistryError::InvalidUrl(format!("{}: cannot be a base", base_url)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Deserializes a registry document into the adapter's response type
pub(crate) fn parse_document<T: DeserializeOwned>(
    document: &RawDocument,
) -> Result<T, RegistryError> {
    serde_json::from_str(&document.body).map_err(|e| {
        warn!("Failed to parse registry response from {}: {}", document.url, e);
        RegistryError::InvalidResponse(format!("{}: {}", document.url, e))
    })
}

/// Parses an RFC 3339 timestamp (`2014-12-23T23:54:33.000Z`, `2021-02-16T14:36:00+00:00`)
pub(crate) fn parse_rfc3339(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|date| date.with_timezone(&Utc))
}

/// Parses a timestamp without offset (`2019-05-16T17:21:44`), taken as UTC
pub(crate) fn parse_naive_utc(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
