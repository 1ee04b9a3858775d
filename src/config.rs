use serde::Deserialize;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::version::registries::{crates_io, npm, packagist, pypi, rubygems};

// =============================================================================
// Time-related constants
// =============================================================================

/// Timeout for a single registry request in milliseconds (10 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Delay between starting each fetch request to avoid rate limiting (10ms)
pub const FETCH_STAGGER_DELAY_MS: u64 = 10;

pub const DEFAULT_USER_AGENT: &str = concat!("pkgtime/", env!("CARGO_PKG_VERSION"), " (pkgtime-tool)");

/// pkgtime configuration structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PkgtimeConfig {
    pub http: HttpConfig,
    pub batch: BatchConfig,
    pub registries: RegistriesConfig,
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct HttpConfig {
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Batch runner configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct BatchConfig {
    /// Delay between the start of consecutive requests in milliseconds
    pub stagger_delay_ms: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            stagger_delay_ms: FETCH_STAGGER_DELAY_MS,
        }
    }
}

/// Registry-specific configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RegistriesConfig {
    pub pip: RegistryConfig,
    pub npm: RegistryConfig,
    pub cargo: RegistryConfig,
    pub gem: RegistryConfig,
    pub composer: RegistryConfig,
}

impl Default for RegistriesConfig {
    fn default() -> Self {
        Self {
            pip: RegistryConfig::with_base_url(pypi::DEFAULT_BASE_URL),
            npm: RegistryConfig::with_base_url(npm::DEFAULT_BASE_URL),
            cargo: RegistryConfig::with_base_url(crates_io::DEFAULT_BASE_URL),
            gem: RegistryConfig::with_base_url(rubygems::DEFAULT_BASE_URL),
            composer: RegistryConfig::with_base_url(packagist::DEFAULT_BASE_URL),
        }
    }
}

/// Individual registry configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegistryConfig {
    /// Root of the registry API, e.g. a mirror
    pub base_url: String,
}

impl RegistryConfig {
    fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
        }
    }
}

impl PkgtimeConfig {
    /// Loads configuration from an explicit file, or from the default location
    ///
    /// A missing default file yields the defaults; a missing explicit file is an error.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = config_path();
                if path.exists() {
                    Self::from_file(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

/// Returns the path to the config file.
/// Uses $XDG_CONFIG_HOME/pkgtime/config.json if XDG_CONFIG_HOME is set,
/// otherwise falls back to ~/.config/pkgtime/config.json.
pub fn config_path() -> PathBuf {
    base_dir_with_env(
        std::env::var("XDG_CONFIG_HOME").ok(),
        dirs::home_dir(),
        ".config",
    )
    .join("config.json")
}

/// Returns the path to the data directory for pkgtime.
/// Uses $XDG_DATA_HOME/pkgtime if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/pkgtime,
/// or ./pkgtime if neither is available.
pub fn data_dir() -> PathBuf {
    base_dir_with_env(
        std::env::var("XDG_DATA_HOME").ok(),
        dirs::home_dir(),
        ".local/share",
    )
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("pkgtime.log")
}

fn base_dir_with_env(xdg_home: Option<String>, home_dir: Option<PathBuf>, fallback: &str) -> PathBuf {
    let base = xdg_home
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(fallback)))
        .unwrap_or_else(|| PathBuf::from("."));

    base.join("pkgtime")
}
