//! Registry test utilities

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::Url;

use pkgtime::config::{BatchConfig, RegistriesConfig, RegistryConfig};
use pkgtime::version::batch::BatchRunner;
use pkgtime::version::error::RegistryError;
use pkgtime::version::registry::{RawDocument, Registry};
use pkgtime::version::resolver::Resolver;
use pkgtime::version::types::{Candidate, RegistryType};

enum Listing {
    Candidates(Vec<Candidate>),
    Unreachable,
}

/// In-memory registry with an optional artificial latency per package
pub struct StaticRegistry {
    registry_type: RegistryType,
    listings: HashMap<String, (Duration, Listing)>,
}

impl StaticRegistry {
    pub fn new(registry_type: RegistryType) -> Self {
        Self {
            registry_type,
            listings: HashMap::new(),
        }
    }

    pub fn with_candidates(self, package: &str, candidates: Vec<Candidate>) -> Self {
        self.with_delayed_candidates(package, Duration::ZERO, candidates)
    }

    pub fn with_delayed_candidates(
        mut self,
        package: &str,
        delay: Duration,
        candidates: Vec<Candidate>,
    ) -> Self {
        self.listings
            .insert(package.to_string(), (delay, Listing::Candidates(candidates)));
        self
    }

    /// Requests for `package` fail as if the connection dropped
    pub fn with_unreachable(mut self, package: &str) -> Self {
        self.listings
            .insert(package.to_string(), (Duration::ZERO, Listing::Unreachable));
        self
    }
}

#[async_trait]
impl Registry for StaticRegistry {
    fn registry_type(&self) -> RegistryType {
        self.registry_type
    }

    fn metadata_url(&self, package_name: &str) -> Result<Url, RegistryError> {
        Url::parse(&format!("memory://{}/{}", self.registry_type, package_name))
            .map_err(|e| RegistryError::InvalidUrl(e.to_string()))
    }

    async fn fetch(&self, package_name: &str) -> Result<RawDocument, RegistryError> {
        let Some((delay, listing)) = self.listings.get(package_name) else {
            return Err(RegistryError::NotFound(package_name.to_string()));
        };
        tokio::time::sleep(*delay).await;

        match listing {
            Listing::Candidates(_) => Ok(RawDocument {
                url: self.metadata_url(package_name)?.to_string(),
                body: package_name.to_string(),
            }),
            Listing::Unreachable => Err(RegistryError::Network(format!(
                "connection refused while fetching {package_name}"
            ))),
        }
    }

    fn extract_candidates(&self, document: &RawDocument) -> Result<Vec<Candidate>, RegistryError> {
        match self.listings.get(&document.body) {
            Some((_, Listing::Candidates(candidates))) => Ok(candidates.clone()),
            _ => Err(RegistryError::InvalidResponse(document.url.clone())),
        }
    }
}

/// Batch runner over a single registry, without start staggering
pub fn create_test_runner(registry: StaticRegistry) -> BatchRunner {
    BatchRunner::new(
        Arc::new(Resolver::with_registry(Arc::new(registry))),
        &BatchConfig {
            stagger_delay_ms: 0,
        },
    )
}

/// Registry configuration pointing every registry at one mock server
pub fn registries_at(base_url: &str) -> RegistriesConfig {
    let at = || RegistryConfig {
        base_url: base_url.to_string(),
    };
    RegistriesConfig {
        pip: at(),
        npm: at(),
        cargo: at(),
        gem: at(),
        composer: at(),
    }
}

pub fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}
