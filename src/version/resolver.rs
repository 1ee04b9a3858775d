//! Version-by-date resolution for a single package
//!
//! Connects a registry adapter with the selector and translates every
//! failure into one [`ResolveError`].

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::version::error::ResolveError;
use crate::version::registry::Registry;
use crate::version::selector::{Verdict, assess, select};
use crate::version::types::{Candidate, Cutoff, PackageRef, RegistryType, Release, ResolvedVersion};

/// Result of resolving one package
#[derive(Debug)]
pub struct Resolution {
    /// Package name as given by the user
    pub requested: String,
    pub outcome: Result<ResolvedVersion, ResolveError>,
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Resolves packages against the registry matching their type
pub struct Resolver {
    registries: HashMap<RegistryType, Arc<dyn Registry>>,
}

impl Resolver {
    pub fn new(registries: HashMap<RegistryType, Arc<dyn Registry>>) -> Self {
        Self { registries }
    }

    /// Resolver backed by a single registry
    pub fn with_registry(registry: Arc<dyn Registry>) -> Self {
        let registry_type = registry.registry_type();
        Self::new(HashMap::from([(registry_type, registry)]))
    }

    /// Finds the newest version of `package` published at or before `cutoff`
    pub async fn resolve(&self, package: &PackageRef, cutoff: Cutoff) -> Resolution {
        let outcome = self.resolve_outcome(package, cutoff).await;

        match &outcome {
            Ok(resolved) => info!(
                "Resolved {} to {} (published {})",
                package, resolved.version, resolved.published_at
            ),
            Err(e) => info!("Failed to resolve {}: {}", package, e),
        }

        Resolution {
            requested: package.requested().to_string(),
            outcome,
        }
    }

    /// All valid releases of `package`, oldest first
    pub async fn release_timeline(&self, package: &PackageRef) -> Result<Vec<Release>, ResolveError> {
        let candidates = self.fetch_candidates(package).await?;

        let mut releases: Vec<Release> = candidates
            .into_iter()
            .filter_map(|candidate| {
                let published_at = candidate.valid_time()?;
                Some(Release {
                    version: candidate.version,
                    published_at,
                })
            })
            .collect();

        // Stable sort keeps listing order for identical times
        releases.sort_by_key(|release| release.published_at);
        Ok(releases)
    }

    async fn resolve_outcome(
        &self,
        package: &PackageRef,
        cutoff: Cutoff,
    ) -> Result<ResolvedVersion, ResolveError> {
        let candidates = self.fetch_candidates(package).await?;

        for candidate in &candidates {
            log_verdict(package, candidate, cutoff);
        }

        select(&candidates, cutoff).map_err(|_| ResolveError::NoVersionBeforeDate { cutoff })
    }

    async fn fetch_candidates(&self, package: &PackageRef) -> Result<Vec<Candidate>, ResolveError> {
        let registry = self
            .registries
            .get(&package.registry_type())
            .ok_or(ResolveError::Unsupported(package.registry_type()))?;

        let document = registry.fetch(package.name()).await?;
        let candidates = registry.extract_candidates(&document)?;
        debug!("{} candidates for {}", candidates.len(), package);

        Ok(candidates)
    }
}

fn log_verdict(package: &PackageRef, candidate: &Candidate, cutoff: Cutoff) {
    let published = candidate
        .published_at
        .map(|at| at.date_naive().to_string())
        .unwrap_or_else(|| "unknown date".to_string());

    match assess(candidate, cutoff) {
        Verdict::Eligible => debug!(
            "[{}] v{} ({}): eligible",
            package, candidate.version, published
        ),
        Verdict::AfterCutoff => debug!(
            "[{}] v{} ({}): too recent",
            package, candidate.version, published
        ),
        Verdict::Invalid(reason) => debug!(
            "[{}] v{} ({}): ignored, {}",
            package, candidate.version, published, reason
        ),
    }
}
