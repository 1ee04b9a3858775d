use thiserror::Error;

use crate::version::types::{Cutoff, RegistryType};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Package not found: {0}")]
    NotFound(String),

    #[error("Unexpected HTTP status {status} from {url}")]
    Http { status: u16, url: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid package URL: {0}")]
    InvalidUrl(String),
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("No version found on or before {cutoff}")]
    NoVersionBeforeDate { cutoff: Cutoff },

    #[error("No registry configured for {0}")]
    Unsupported(RegistryType),

    #[error(transparent)]
    InvalidName(#[from] PackageRefError),

    #[error("Resolution cancelled")]
    Cancelled,
}

/// Flat classification of a failed resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    HttpError,
    NetworkError,
    InvalidResponse,
    NoVersionBeforeDate,
    Unsupported,
    InvalidName,
    Cancelled,
}

impl ResolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolveError::Registry(RegistryError::NotFound(_)) => ErrorKind::NotFound,
            ResolveError::Registry(RegistryError::Http { .. }) => ErrorKind::HttpError,
            ResolveError::Registry(RegistryError::Network(_)) => ErrorKind::NetworkError,
            ResolveError::Registry(
                RegistryError::InvalidResponse(_) | RegistryError::InvalidUrl(_),
            ) => ErrorKind::InvalidResponse,
            ResolveError::NoVersionBeforeDate { .. } => ErrorKind::NoVersionBeforeDate,
            ResolveError::Unsupported(_) => ErrorKind::Unsupported,
            ResolveError::InvalidName(_) => ErrorKind::InvalidName,
            ResolveError::Cancelled => ErrorKind::Cancelled,
        }
    }
}

#[derive(Debug, Error)]
pub enum CutoffError {
    #[error("Invalid date '{input}': use the format YYYY-MM-DD (e.g. 2019-12-12)")]
    InvalidDate {
        input: String,
        #[source]
        source: chrono::ParseError,
    },
}

#[derive(Debug, Error)]
pub enum PackageRefError {
    #[error("Package name must not be empty")]
    Empty,

    #[error("Invalid package name '{name}': {reason}")]
    Invalid { name: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(RegistryError::NotFound("left-pad".into()), ErrorKind::NotFound)]
    #[case(RegistryError::Http { status: 503, url: "http://x".into() }, ErrorKind::HttpError)]
    #[case(RegistryError::Network("timed out".into()), ErrorKind::NetworkError)]
    #[case(RegistryError::InvalidResponse("eof".into()), ErrorKind::InvalidResponse)]
    fn registry_errors_keep_their_kind(#[case] error: RegistryError, #[case] expected: ErrorKind) {
        assert_eq!(ResolveError::from(error).kind(), expected);
    }

    #[test]
    fn http_error_message_carries_status_code() {
        let error = ResolveError::from(RegistryError::Http {
            status: 500,
            url: "https://pypi.org/pypi/requests/json".into(),
        });
        assert!(error.to_string().contains("500"));
    }

    #[test]
    fn invalid_name_keeps_validation_message() {
        let error = ResolveError::from(PackageRefError::Invalid {
            name: "monolog".into(),
            reason: "expected 'vendor/package' format".into(),
        });
        assert_eq!(error.kind(), ErrorKind::InvalidName);
        assert_eq!(
            error.to_string(),
            "Invalid package name 'monolog': expected 'vendor/package' format"
        );
    }
}
