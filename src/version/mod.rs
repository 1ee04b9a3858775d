//! Version-by-date resolution across package registries
//!
//! This module answers "what was the newest version of package P on date D?"
//! for PyPI, npm, crates.io, RubyGems and Packagist.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ BatchRunner │────▶│  Resolver   │────▶│  Selector   │
//! │ (N packages)│     │ (1 package) │     │   (pure)    │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                            │
//!                            ▼
//!                     ┌─────────────┐     ┌─────────────┐
//!                     │  Registry   │────▶│ HttpClient  │
//!                     │(pypi, npm..)│     │  (shared)   │
//!                     └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`batch`]: Concurrent, order-preserving resolution of many packages
//! - [`error`]: Error types for registries and resolution
//! - [`http`]: Shared HTTP client with per-request timeout
//! - [`overlap`]: Release windows for the `overlap` command
//! - [`registry`]: Registry trait for fetching and interpreting metadata
//! - [`registries`]: Concrete registry implementations
//! - [`resolver`]: Single-package resolution
//! - [`selector`]: Candidate filtering and selection by date
//! - [`types`]: Common types like `PackageRef`, `Cutoff` and `Candidate`

pub mod batch;
pub mod error;
pub mod http;
pub mod overlap;
pub mod registries;
pub mod registry;
pub mod resolver;
pub mod selector;
pub mod types;
