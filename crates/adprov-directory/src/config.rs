//! Configuration for the directory connection.

use crate::Result;
use adprov_core::services::DirectoryCredentials;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Default connection timeout (seconds).
pub const DEFAULT_CONNECTION_TIMEOUT_SECS: u64 = 10;
/// Default operation timeout (seconds).
pub const DEFAULT_OPERATION_TIMEOUT_SECS: u64 = 10;

/// Configuration for connecting to the directory server.
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    url: String,
    credentials: DirectoryCredentials,
    tls_verify: bool,
    tls_ca_cert: Option<PathBuf>,
    connection_timeout_secs: u64,
    operation_timeout_secs: u64,
}

impl DirectoryConfig {
    /// Creates a new directory configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the provided URL is invalid.
    pub fn new(url: impl Into<String>, credentials: DirectoryCredentials) -> Result<Self> {
        let url_string = url.into();
        Url::parse(&url_string)?;

        Ok(Self {
            url: url_string,
            credentials,
            tls_verify: true,
            tls_ca_cert: None,
            connection_timeout_secs: DEFAULT_CONNECTION_TIMEOUT_SECS,
            operation_timeout_secs: DEFAULT_OPERATION_TIMEOUT_SECS,
        })
    }

    /// Returns the directory endpoint URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the bind credentials.
    #[must_use]
    pub const fn credentials(&self) -> &DirectoryCredentials {
        &self.credentials
    }

    /// Returns the connection timeout duration.
    #[must_use]
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_secs)
    }

    /// Returns the operation timeout duration.
    #[must_use]
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }

    /// Returns whether TLS certificate verification is enabled.
    #[must_use]
    pub const fn tls_verify(&self) -> bool {
        self.tls_verify
    }

    /// Optional custom CA certificate path.
    #[must_use]
    pub fn tls_ca_cert(&self) -> Option<&PathBuf> {
        self.tls_ca_cert.as_ref()
    }

    /// Enables or disables TLS certificate verification.
    #[must_use]
    pub const fn with_tls_verification(mut self, verify: bool) -> Self {
        self.tls_verify = verify;
        self
    }

    /// Sets the custom CA certificate path for TLS verification.
    #[must_use]
    pub fn with_tls_ca_cert(mut self, path: PathBuf) -> Self {
        self.tls_ca_cert = Some(path);
        self
    }

    /// Overrides the connection timeout in seconds.
    #[must_use]
    pub const fn with_connection_timeout_secs(mut self, seconds: u64) -> Self {
        self.connection_timeout_secs = seconds;
        self
    }

    /// Overrides the operation timeout in seconds.
    #[must_use]
    pub const fn with_operation_timeout_secs(mut self, seconds: u64) -> Self {
        self.operation_timeout_secs = seconds;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adprov_core::Error;

    fn sample_credentials() -> DirectoryCredentials {
        DirectoryCredentials::new("CN=svc,DC=example,DC=com", "secret")
    }

    #[test]
    fn defaults() {
        let config = DirectoryConfig::new("ldaps://dc01.example.com", sample_credentials()).unwrap();
        assert_eq!(config.url(), "ldaps://dc01.example.com");
        assert!(config.tls_verify());
        assert!(config.tls_ca_cert().is_none());
        assert_eq!(config.connection_timeout(), Duration::from_secs(10));
        assert_eq!(config.operation_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn builder_overrides() {
        let config = DirectoryConfig::new("ldaps://dc01.example.com", sample_credentials())
            .unwrap()
            .with_tls_verification(false)
            .with_tls_ca_cert(PathBuf::from("/etc/ssl/dc01.pem"))
            .with_connection_timeout_secs(20)
            .with_operation_timeout_secs(30);

        assert!(!config.tls_verify());
        assert_eq!(
            config.tls_ca_cert(),
            Some(&PathBuf::from("/etc/ssl/dc01.pem"))
        );
        assert_eq!(config.connection_timeout(), Duration::from_secs(20));
        assert_eq!(config.operation_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn invalid_url_rejected() {
        let result = DirectoryConfig::new("not a url", sample_credentials());
        assert!(matches!(result, Err(Error::InvalidEndpoint(_))));
    }
}
