//! PyPI registry client for fetching Python release history

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use pep508_rs::pep440_rs::Version;
use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use crate::version::error::RegistryError;
use crate::version::http::HttpClient;
use crate::version::registries::{endpoint, parse_document, parse_naive_utc, parse_rfc3339};
use crate::version::registry::{RawDocument, Registry};
use crate::version::types::{Candidate, InvalidReason, RegistryType};

pub const DEFAULT_BASE_URL: &str = "https://pypi.org";

/// PyPI registry client
pub struct PypiRegistry {
    http: HttpClient,
    base_url: String,
}

impl PypiRegistry {
    pub fn new(http: HttpClient, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
        }
    }
}

/// PyPI JSON API response structure
#[derive(Debug, Deserialize)]
struct PypiResponse {
    releases: IndexMap<String, Vec<PypiFile>>,
}

/// One distribution file of a release
#[derive(Debug, Deserialize)]
struct PypiFile {
    /// e.g. "2019-05-16T17:21:44.529405Z"
    #[serde(default)]
    upload_time_iso_8601: Option<String>,
    /// e.g. "2019-05-16T17:21:44", UTC without offset
    #[serde(default)]
    upload_time: Option<String>,
}

impl PypiFile {
    fn uploaded_at(&self) -> Option<DateTime<Utc>> {
        self.upload_time_iso_8601
            .as_deref()
            .and_then(parse_rfc3339)
            .or_else(|| self.upload_time.as_deref().and_then(parse_naive_utc))
    }
}

/// A release is published when its first file was uploaded
fn release_candidate(version: String, files: &[PypiFile]) -> Candidate {
    if files.is_empty() {
        return Candidate::rejected(version, None, InvalidReason::NoArtifact);
    }

    let Some(published_at) = files.iter().filter_map(PypiFile::uploaded_at).min() else {
        let raw = files
            .iter()
            .find_map(|f| f.upload_time_iso_8601.clone().or_else(|| f.upload_time.clone()));
        let reason = match raw {
            Some(raw) => InvalidReason::MalformedTimestamp(raw),
            None => InvalidReason::MissingTimestamp,
        };
        return Candidate::rejected(version, None, reason);
    };

    if Version::from_str(&version).is_err() {
        return Candidate::rejected(version, Some(published_at), InvalidReason::MalformedVersion);
    }

    Candidate::published(version, published_at)
}

#[async_trait]
impl Registry for PypiRegistry {
    fn registry_type(&self) -> RegistryType {
        RegistryType::Pip
    }

    fn metadata_url(&self, package_name: &str) -> Result<Url, RegistryError> {
        endpoint(&self.base_url, &["pypi", package_name, "json"])
    }

    async fn fetch(&self, package_name: &str) -> Result<RawDocument, RegistryError> {
        let url = self.metadata_url(package_name)?;
        debug!("Fetching PyPI package: {}", url);
        self.http.get_document(url, package_name).await
    }

    fn extract_candidates(&self, document: &RawDocument) -> Result<Vec<Candidate>, RegistryError> {
        let response: PypiResponse = parse_document(document)?;

        let candidates: Vec<Candidate> = response
            .releases
            .into_iter()
            .map(|(version, files)| release_candidate(version, &files))
            .collect();

        debug!(
            "Found {} releases in {}",
            candidates.len(),
            document.url
        );

        Ok(candidates)
    }
}
