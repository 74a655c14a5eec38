//! Directory service credentials.

use secrecy::{ExposeSecret, SecretString};

/// Credentials for binding to the directory service.
///
/// The bind password is held behind [`SecretString`] so it never appears in
/// `Debug` output or log events.
#[derive(Debug, Clone)]
pub struct DirectoryCredentials {
    bind_dn: String,
    bind_password: SecretString,
}

impl DirectoryCredentials {
    /// Create new directory bind credentials.
    ///
    /// # Arguments
    ///
    /// * `bind_dn` - The distinguished name of the service account
    /// * `bind_password` - The service account password
    #[must_use]
    pub fn new(bind_dn: impl Into<String>, bind_password: impl Into<String>) -> Self {
        Self {
            bind_dn: bind_dn.into(),
            bind_password: SecretString::from(bind_password.into()),
        }
    }

    /// Get the LDAP bind DN.
    #[must_use]
    pub fn bind_dn(&self) -> &str {
        &self.bind_dn
    }

    /// Expose the LDAP bind password for use in a bind request.
    #[must_use]
    pub fn bind_password(&self) -> &str {
        self.bind_password.expose_secret()
    }
}
