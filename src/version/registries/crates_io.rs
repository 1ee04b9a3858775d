//! crates.io API implementation

use reqwest::Url;
use semver::Version;
use serde::Deserialize;

use crate::version::error::RegistryError;
use crate::version::http::HttpClient;
use crate::version::registries::{endpoint, parse_document, parse_rfc3339};
use crate::version::registry::{RawDocument, Registry};
use crate::version::types::{Candidate, InvalidReason, RegistryType};

pub const DEFAULT_BASE_URL: &str = "https://crates.io";

#[derive(Debug, Deserialize)]
struct CrateResponse {
    versions: Vec<CrateVersion>,
}

#[derive(Debug, Deserialize)]
struct CrateVersion {
    num: String,
    /// e.g. "2015-05-06T00:52:16.890333+00:00"
    created_at: String,
    #[serde(default)]
    yanked: bool,
}

impl From<CrateVersion> for Candidate {
    fn from(v: CrateVersion) -> Self {
        let published_at = parse_rfc3339(&v.created_at);
        match published_at {
            None => Candidate::rejected(
                v.num,
                None,
                InvalidReason::MalformedTimestamp(v.created_at),
            ),
            Some(_) if v.yanked => Candidate::rejected(v.num, published_at, InvalidReason::Yanked),
            Some(_) if Version::parse(&v.num).is_err() => {
                Candidate::rejected(v.num, published_at, InvalidReason::MalformedVersion)
            }
            Some(at) => Candidate::published(v.num, at),
        }
    }
}

/// Registry implementation for the crates.io web API
pub struct CratesIoRegistry {
    http: HttpClient,
    base_url: String,
}

impl CratesIoRegistry {
    pub fn new(http: HttpClient, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl Registry for CratesIoRegistry {
    fn registry_type(&self) -> RegistryType {
        RegistryType::Cargo
    }

    fn metadata_url(&self, package_name: &str) -> Result<Url, RegistryError> {
        endpoint(&self.base_url, &["api", "v1", "crates", package_name])
    }

    async fn fetch(&self, package_name: &str) -> Result<RawDocument, RegistryError> {
        let url = self.metadata_url(package_name)?;
        self.http.get_document(url, package_name).await
    }

    fn extract_candidates(&self, document: &RawDocument) -> Result<Vec<Candidate>, RegistryError> {
        let response: CrateResponse = parse_document(document)?;
        Ok(response.versions.into_iter().map(Candidate::from).collect())
    }
}
