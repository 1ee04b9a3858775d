//! Concurrent resolution of many packages
//!
//! Every package is resolved independently; one failure never affects the
//! others. Results come back in input order regardless of completion order.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::BatchConfig;
use crate::version::error::ResolveError;
use crate::version::resolver::{Resolution, Resolver};
use crate::version::types::{Cutoff, PackageRef, RegistryType};

pub struct BatchRunner {
    resolver: Arc<Resolver>,
    stagger_delay_ms: u64,
}

/// Start delay of the `index`-th request
fn start_delay(stagger_delay_ms: u64, index: usize) -> Duration {
    Duration::from_millis(stagger_delay_ms.saturating_mul(index as u64))
}

impl BatchRunner {
    pub fn new(resolver: Arc<Resolver>, config: &BatchConfig) -> Self {
        Self {
            resolver,
            stagger_delay_ms: config.stagger_delay_ms,
        }
    }

    pub fn resolver(&self) -> &Arc<Resolver> {
        &self.resolver
    }

    /// Resolves every package, returning one result per input in the same order
    pub async fn run(&self, packages: &[PackageRef], cutoff: Cutoff) -> Vec<Resolution> {
        self.run_until(packages, cutoff, std::future::pending()).await
    }

    /// Like [`run`](Self::run), but stops waiting once `shutdown` completes
    ///
    /// Packages resolved before shutdown keep their result; the rest are
    /// reported as [`ResolveError::Cancelled`].
    pub async fn run_until<F>(
        &self,
        packages: &[PackageRef],
        cutoff: Cutoff,
        shutdown: F,
    ) -> Vec<Resolution>
    where
        F: Future<Output = ()>,
    {
        info!(
            "Resolving {} packages up to {}",
            packages.len(),
            cutoff
        );

        // Staggered start times avoid bursting a single registry
        let mut pending: FuturesUnordered<_> = packages
            .iter()
            .enumerate()
            .map(|(index, package)| {
                let delay = start_delay(self.stagger_delay_ms, index);
                async move {
                    sleep(delay).await;
                    (index, self.resolver.resolve(package, cutoff).await)
                }
            })
            .collect();

        let mut slots: Vec<Option<Resolution>> = packages.iter().map(|_| None).collect();

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    warn!("Resolution interrupted with {} packages outstanding", pending.len());
                    break;
                }
                next = pending.next() => match next {
                    Some((index, resolution)) => slots[index] = Some(resolution),
                    None => break,
                },
            }
        }

        slots
            .into_iter()
            .zip(packages)
            .map(|(slot, package)| {
                slot.unwrap_or_else(|| Resolution {
                    requested: package.requested().to_string(),
                    outcome: Err(ResolveError::Cancelled),
                })
            })
            .collect()
    }

    /// Validates `names` for `registry_type` and resolves the valid ones
    ///
    /// A name that fails validation becomes an
    /// [`ResolveError::InvalidName`] result at its own position; the other
    /// names are resolved as usual.
    pub async fn run_names_until<F>(
        &self,
        registry_type: RegistryType,
        names: &[String],
        cutoff: Cutoff,
        shutdown: F,
    ) -> Vec<Resolution>
    where
        F: Future<Output = ()>,
    {
        let parsed: Vec<_> = names
            .iter()
            .map(|name| PackageRef::new(registry_type, name))
            .collect();
        let valid: Vec<PackageRef> = parsed
            .iter()
            .filter_map(|package| package.as_ref().ok().cloned())
            .collect();

        let mut resolved = self.run_until(&valid, cutoff, shutdown).await.into_iter();

        parsed
            .into_iter()
            .zip(names)
            .map(|(package, name)| match package {
                Ok(_) => resolved.next().unwrap_or_else(|| Resolution {
                    requested: name.trim().to_string(),
                    outcome: Err(ResolveError::Cancelled),
                }),
                Err(e) => {
                    warn!("Skipping {} package '{}': {}", registry_type, name, e);
                    Resolution {
                        requested: name.trim().to_string(),
                        outcome: Err(e.into()),
                    }
                }
            })
            .collect()
    }
}
