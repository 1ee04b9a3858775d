//! npm registry API implementation

use indexmap::IndexMap;
use reqwest::Url;
use semver::Version;
use serde::Deserialize;
use serde::de::IgnoredAny;

use crate::version::error::RegistryError;
use crate::version::http::HttpClient;
use crate::version::registries::{endpoint, parse_document, parse_rfc3339};
use crate::version::registry::{RawDocument, Registry};
use crate::version::types::{Candidate, InvalidReason, RegistryType};

/// Default base URL for npm registry
pub const DEFAULT_BASE_URL: &str = "https://registry.npmjs.org";

/// Keys of the `time` map that are not versions
const NON_VERSION_TIME_KEYS: [&str; 3] = ["created", "modified", "unpublished"];

/// Response from npm registry API
#[derive(Debug, Deserialize)]
struct NpmPackageResponse {
    #[serde(default)]
    versions: IndexMap<String, IgnoredAny>,
    #[serde(default)]
    time: IndexMap<String, serde_json::Value>,
}

/// Registry implementation for npm registry API
pub struct NpmRegistry {
    http: HttpClient,
    base_url: String,
}

impl NpmRegistry {
    pub fn new(http: HttpClient, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl Registry for NpmRegistry {
    fn registry_type(&self) -> RegistryType {
        RegistryType::Npm
    }

    fn metadata_url(&self, package_name: &str) -> Result<Url, RegistryError> {
        // Scoped packages are one segment: @scope/name -> @scope%2Fname
        endpoint(&self.base_url, &[package_name])
    }

    async fn fetch(&self, package_name: &str) -> Result<RawDocument, RegistryError> {
        let url = self.metadata_url(package_name)?;
        self.http.get_document(url, package_name).await
    }

    fn extract_candidates(&self, document: &RawDocument) -> Result<Vec<Candidate>, RegistryError> {
        let package: NpmPackageResponse = parse_document(document)?;

        let candidates = package
            .time
            .into_iter()
            .filter(|(version, _)| !NON_VERSION_TIME_KEYS.contains(&version.as_str()))
            .map(|(version, time)| {
                let Some(raw) = time.as_str() else {
                    return Candidate::rejected(
                        version,
                        None,
                        InvalidReason::MalformedTimestamp(time.to_string()),
                    );
                };
                let Some(published_at) = parse_rfc3339(raw) else {
                    return Candidate::rejected(
                        version,
                        None,
                        InvalidReason::MalformedTimestamp(raw.to_string()),
                    );
                };
                if Version::parse(&version).is_err() {
                    return Candidate::rejected(
                        version,
                        Some(published_at),
                        InvalidReason::MalformedVersion,
                    );
                }
                // Listed in `time` but gone from `versions`: the tarball was unpublished
                if !package.versions.contains_key(&version) {
                    return Candidate::rejected(
                        version,
                        Some(published_at),
                        InvalidReason::Unpublished,
                    );
                }
                Candidate::published(version, published_at)
            })
            .collect();

        Ok(candidates)
    }
}
