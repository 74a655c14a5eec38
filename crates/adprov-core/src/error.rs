//! Error types for directory provisioning operations.
//!
//! Every failure surfaced by the plugin maps onto one of these variants. The
//! write and search variants carry the target of the failed operation together
//! with the server's own message so an operator can diagnose the rejection
//! without re-running the request.

use thiserror::Error;

/// Main error type for directory provisioning operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A required resource field is empty or malformed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Directory server could not be reached or the bind failed
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Operation timed out
    #[error("Timeout waiting for directory: {0}")]
    Timeout(String),

    /// Directory object not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid endpoint URL
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Add or delete operation rejected by the directory server
    #[error("Directory {operation} failed for `{dn}`: {message}")]
    DirectoryWrite {
        /// Protocol operation that was attempted (`add` or `delete`)
        operation: String,
        /// Distinguished name the operation targeted
        dn: String,
        /// Underlying server error, verbatim
        message: String,
    },

    /// Search operation failed (connectivity, malformed filter, permission)
    #[error("Directory search failed under `{base}`: {message}")]
    DirectorySearch {
        /// Base distinguished name of the failed search
        base: String,
        /// Underlying server error, verbatim
        message: String,
    },
}

/// Specialized result type for directory provisioning operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
            Self::DirectoryWrite { .. } => "DIRECTORY_WRITE_ERROR",
            Self::DirectorySearch { .. } => "DIRECTORY_SEARCH_ERROR",
        }
    }

    /// Returns true if the failure means the object is confirmed absent.
    ///
    /// A search failure is NOT absence: only [`Error::NotFound`] states that
    /// the directory was reached and reported no matching entry.
    #[must_use]
    pub const fn is_confirmed_absent(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

// Conversions from external error types
impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes() {
        assert_eq!(
            Error::Validation("test".to_string()).error_code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(
            Error::ServiceUnavailable("test".to_string()).error_code(),
            "SERVICE_UNAVAILABLE"
        );
        assert_eq!(
            Error::ConfigError("test".to_string()).error_code(),
            "CONFIG_ERROR"
        );
        assert_eq!(Error::Timeout("test".to_string()).error_code(), "TIMEOUT");
        assert_eq!(
            Error::NotFound("test".to_string()).error_code(),
            "NOT_FOUND"
        );
        assert_eq!(
            Error::InvalidRequest("test".to_string()).error_code(),
            "INVALID_REQUEST"
        );
        assert_eq!(
            Error::InvalidEndpoint("test".to_string()).error_code(),
            "INVALID_ENDPOINT"
        );
        assert_eq!(
            Error::DirectoryWrite {
                operation: "add".to_string(),
                dn: "CN=x".to_string(),
                message: "denied".to_string()
            }
            .error_code(),
            "DIRECTORY_WRITE_ERROR"
        );
        assert_eq!(
            Error::DirectorySearch {
                base: "OU=x".to_string(),
                message: "down".to_string()
            }
            .error_code(),
            "DIRECTORY_SEARCH_ERROR"
        );
    }

    #[test]
    fn error_display_carries_context() {
        let err = Error::DirectoryWrite {
            operation: "delete".to_string(),
            dn: "CN=Jane Doe,OU=Users,DC=example,DC=com".to_string(),
            message: "insufficient access rights".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Directory delete failed for `CN=Jane Doe,OU=Users,DC=example,DC=com`: \
             insufficient access rights"
        );

        let err = Error::DirectorySearch {
            base: "OU=Users,DC=example,DC=com".to_string(),
            message: "connection reset".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Directory search failed under `OU=Users,DC=example,DC=com`: connection reset"
        );
    }

    #[test]
    fn confirmed_absent_distinguishes_search_failures() {
        assert!(Error::NotFound("user".to_string()).is_confirmed_absent());
        assert!(!Error::DirectorySearch {
            base: "OU=x".to_string(),
            message: "timeout".to_string()
        }
        .is_confirmed_absent());
    }

    #[test]
    fn from_url_parse_error() {
        let err = url::Url::parse("not a url").unwrap_err();
        let core_err: Error = err.into();
        assert!(matches!(core_err, Error::InvalidEndpoint(_)));
    }

    #[test]
    fn error_clone_and_eq() {
        let err = Error::NotFound("test".to_string());
        assert_eq!(err, err.clone());
        assert_ne!(err, Error::NotFound("other".to_string()));
    }
}
