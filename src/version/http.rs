//! Shared HTTP client used by every registry adapter

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use tracing::{debug, warn};

use crate::config::HttpConfig;
use crate::version::error::RegistryError;
use crate::version::registry::RawDocument;

/// Pooled HTTP client with a per-request timeout
///
/// Cheap to clone; clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(config: &HttpConfig) -> Result<Self, RegistryError> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(timeout)
            .build()
            .map_err(|e| RegistryError::Network(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, timeout })
    }

    /// Issues a single GET for `url` and returns the body of a 2xx response
    ///
    /// `package_name` is only used to label a `NotFound` error.
    pub async fn get_document(
        &self,
        url: Url,
        package_name: &str,
    ) -> Result<RawDocument, RegistryError> {
        debug!("Fetching {}", url);

        let response = self
            .client
            .get(url.clone())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| self.network_error(e))?;

        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound(package_name.to_string()));
        }

        if !status.is_success() {
            warn!("Registry returned status {}: {}", status, url);
            return Err(RegistryError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await.map_err(|e| self.network_error(e))?;

        Ok(RawDocument {
            url: url.to_string(),
            body,
        })
    }

    fn network_error(&self, error: reqwest::Error) -> RegistryError {
        if error.is_timeout() {
            RegistryError::Network(format!(
                "request timed out after {}s",
                self.timeout.as_secs_f64()
            ))
        } else {
            RegistryError::Network(error.to_string())
        }
    }
}
