//! Packagist (composer) API implementation

use indexmap::IndexMap;
use reqwest::Url;
use serde::Deserialize;
use tracing::warn;

use crate::version::error::RegistryError;
use crate::version::http::HttpClient;
use crate::version::registries::{endpoint, parse_document, parse_rfc3339};
use crate::version::registry::{RawDocument, Registry};
use crate::version::types::{Candidate, InvalidReason, RegistryType};

pub const DEFAULT_BASE_URL: &str = "https://packagist.org";

#[derive(Debug, Deserialize)]
struct PackagistResponse {
    package: PackagistPackage,
}

#[derive(Debug, Deserialize)]
struct PackagistPackage {
    versions: IndexMap<String, PackagistVersion>,
}

#[derive(Debug, Deserialize)]
struct PackagistVersion {
    /// e.g. "2021-02-16T14:36:00+00:00"
    #[serde(default)]
    time: Option<String>,
}

/// Registry implementation for the Packagist API
pub struct PackagistRegistry {
    http: HttpClient,
    base_url: String,
}

impl PackagistRegistry {
    pub fn new(http: HttpClient, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl Registry for PackagistRegistry {
    fn registry_type(&self) -> RegistryType {
        RegistryType::Composer
    }

    fn metadata_url(&self, package_name: &str) -> Result<Url, RegistryError> {
        // `vendor/package` maps onto two path segments
        let Some((vendor, package)) = package_name.split_once('/') else {
            return Err(RegistryError::InvalidUrl(format!(
                "'{}' is not in 'vendor/package' format",
                package_name
            )));
        };
        endpoint(
            &self.base_url,
            &["packages", vendor, &format!("{}.json", package)],
        )
    }

    async fn fetch(&self, package_name: &str) -> Result<RawDocument, RegistryError> {
        let url = self.metadata_url(package_name)?;
        self.http.get_document(url, package_name).await
    }

    fn extract_candidates(&self, document: &RawDocument) -> Result<Vec<Candidate>, RegistryError> {
        let response: PackagistResponse = parse_document(document)?;

        let candidates = response
            .package
            .versions
            .into_iter()
            .map(|(version, meta)| match meta.time {
                None => Candidate::rejected(version, None, InvalidReason::MissingTimestamp),
                Some(raw) => match parse_rfc3339(&raw) {
                    Some(at) => Candidate::published(version, at),
                    None => {
                        warn!("Unparseable Packagist time for {}: {}", version, raw);
                        Candidate::rejected(version, None, InvalidReason::MalformedTimestamp(raw))
                    }
                },
            })
            .collect();

        Ok(candidates)
    }
}
