//! Registry trait for fetching release metadata from package registries

#[cfg(test)]
use mockall::automock;

use reqwest::Url;

use crate::version::error::RegistryError;
use crate::version::types::{Candidate, RegistryType};

/// Body of a registry metadata response, kept as text until an adapter parses it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    pub url: String,
    pub body: String,
}

/// Trait for fetching and interpreting a registry's package metadata
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Registry: Send + Sync {
    /// Returns the type of registry this implementation handles
    fn registry_type(&self) -> RegistryType;

    /// Builds the metadata endpoint for a (normalized) package name
    fn metadata_url(&self, package_name: &str) -> Result<Url, RegistryError>;

    /// Fetches the package's metadata document
    ///
    /// Performs exactly one request. Returns `NotFound` on 404, `Http` for any
    /// other non-2xx status and `Network` for transport failures or timeouts.
    async fn fetch(&self, package_name: &str) -> Result<RawDocument, RegistryError>;

    /// Converts a metadata document into one candidate per release
    ///
    /// Releases without a usable artifact or time are returned as invalid
    /// candidates. Candidates keep the registry's listing order.
    fn extract_candidates(&self, document: &RawDocument) -> Result<Vec<Candidate>, RegistryError>;
}
