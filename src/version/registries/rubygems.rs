//! RubyGems API implementation

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use indexmap::map::Entry;
use reqwest::Url;
use serde::Deserialize;

use crate::version::error::RegistryError;
use crate::version::http::HttpClient;
use crate::version::registries::{endpoint, parse_document, parse_rfc3339};
use crate::version::registry::{RawDocument, Registry};
use crate::version::types::{Candidate, InvalidReason, RegistryType};

pub const DEFAULT_BASE_URL: &str = "https://rubygems.org";

/// One entry of `/api/v1/versions/{gem}.json`
///
/// Platform-specific builds (java, x64-mingw32, ...) appear as separate
/// entries sharing the same `number`.
#[derive(Debug, Deserialize)]
struct GemVersion {
    number: String,
    /// e.g. "2015-01-23T19:00:00.000Z"
    created_at: String,
}

/// Registry implementation for the RubyGems API
pub struct RubyGemsRegistry {
    http: HttpClient,
    base_url: String,
}

impl RubyGemsRegistry {
    pub fn new(http: HttpClient, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
        }
    }
}

/// Collapses per-platform entries into one candidate per version number,
/// dated by the earliest parseable build
fn collapse_platforms(entries: Vec<GemVersion>) -> Vec<Candidate> {
    let mut by_number: IndexMap<String, Result<DateTime<Utc>, String>> = IndexMap::new();

    for entry in entries {
        let parsed = parse_rfc3339(&entry.created_at).ok_or(entry.created_at);
        match by_number.entry(entry.number) {
            Entry::Vacant(slot) => {
                slot.insert(parsed);
            }
            Entry::Occupied(mut slot) => {
                let keep = match (slot.get(), &parsed) {
                    (Ok(current), Ok(candidate)) => candidate < current,
                    (Err(_), Ok(_)) => true,
                    _ => false,
                };
                if keep {
                    *slot.get_mut() = parsed;
                }
            }
        }
    }

    by_number
        .into_iter()
        .map(|(number, published)| match published {
            Ok(at) => Candidate::published(number, at),
            Err(raw) => Candidate::rejected(number, None, InvalidReason::MalformedTimestamp(raw)),
        })
        .collect()
}

#[async_trait::async_trait]
impl Registry for RubyGemsRegistry {
    fn registry_type(&self) -> RegistryType {
        RegistryType::Gem
    }

    fn metadata_url(&self, package_name: &str) -> Result<Url, RegistryError> {
        endpoint(
            &self.base_url,
            &["api", "v1", "versions", &format!("{}.json", package_name)],
        )
    }

    async fn fetch(&self, package_name: &str) -> Result<RawDocument, RegistryError> {
        let url = self.metadata_url(package_name)?;
        self.http.get_document(url, package_name).await
    }

    fn extract_candidates(&self, document: &RawDocument) -> Result<Vec<Candidate>, RegistryError> {
        let entries: Vec<GemVersion> = parse_document(document)?;
        Ok(collapse_platforms(entries))
    }
}
