//! LDAP client for directory user provisioning.

use crate::{config::DirectoryConfig, dn::DistinguishedName, user::UserSpec, Result};
use adprov_core::error::Error;
use async_trait::async_trait;
use ldap3::{LdapConnAsync, LdapConnSettings, SearchEntry};
use native_tls::{Certificate, TlsConnector};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Attributes requested by the existence probe. The read is a liveness check,
/// not a data fetch, so only the entry path and display name come back.
const USER_PROBE_ATTRIBUTES: &[&str] = &["distinguishedName", "cn"];

/// LDAP entry representation used by the client.
#[derive(Debug, Clone)]
pub struct LdapEntry {
    /// Distinguished name of the entry.
    pub dn: String,
    /// Attribute map (values preserved order from server).
    pub attributes: HashMap<String, Vec<String>>,
}

impl LdapEntry {
    /// Returns the first value of the attribute if present.
    #[must_use]
    pub fn first(&self, attribute: &str) -> Option<&str> {
        self.attributes
            .get(attribute)
            .and_then(|values| values.first().map(String::as_str))
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub(crate) trait LdapSession: Send {
    async fn simple_bind(&mut self, dn: &str, password: &str) -> Result<()>;
    async fn add(&mut self, dn: &str, attributes: &[(String, Vec<String>)]) -> Result<()>;
    async fn search(
        &mut self,
        base_dn: &str,
        filter: &str,
        attributes: &[&'static str],
    ) -> Result<Vec<LdapEntry>>;
    async fn delete(&mut self, dn: &str) -> Result<()>;
    async fn unbind(&mut self) -> Result<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub(crate) trait LdapConnector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn LdapSession>>;
}

/// Directory client translating user specifications into LDAP operations.
///
/// Each public operation is a single synchronous round trip on a freshly
/// bound session; no state is retained between calls.
pub struct DirectoryClient {
    config: Arc<DirectoryConfig>,
    connector: Box<dyn LdapConnector>,
}

impl DirectoryClient {
    /// Creates a directory client that uses the real LDAP connector.
    #[must_use]
    pub fn new(config: DirectoryConfig) -> Self {
        let config = Arc::new(config);
        let connector: Box<dyn LdapConnector> = Box::new(RealLdapConnector::new(config.clone()));
        Self { config, connector }
    }

    #[cfg(test)]
    #[must_use]
    pub(crate) fn with_connector(config: DirectoryConfig, connector: Box<dyn LdapConnector>) -> Self {
        Self {
            config: Arc::new(config),
            connector,
        }
    }

    /// Creates the user object described by `spec`.
    ///
    /// Builds the distinguished name and attribute set, submits one add
    /// operation and returns the distinguished name as the resource's durable
    /// identity. The add is atomic at the protocol layer, so a failure leaves
    /// no partial object behind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] before any directory call when a
    /// required field is empty, or [`Error::DirectoryWrite`] when the server
    /// rejects the add.
    pub async fn create_user(&self, spec: &UserSpec) -> Result<String> {
        spec.validate_fields()?;
        let dn = spec.distinguished_name();
        let attributes = spec.add_attributes();
        debug!(
            dn = %dn,
            account_control = %spec.account_control(),
            "adding directory user"
        );

        let mut session = self.admin_session().await?;
        self.execute_with_timeout(session.add(&dn, &attributes))
            .await?;
        session.unbind().await?;

        debug!(dn = %dn, "directory user added");
        Ok(dn)
    }

    /// Probes whether the user object described by `spec` exists.
    ///
    /// Issues a subtree search under the organizational unit filtered by
    /// common name. The filter matches on `cn` only, so another object with
    /// the same common name elsewhere in the subtree would count as a match;
    /// this loose matching is kept as observed behavior.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DirectorySearch`] when the search itself fails. A
    /// search failure is not absence: callers must only treat an explicit
    /// empty result as "confirmed absent".
    pub async fn user_exists(&self, spec: &UserSpec) -> Result<bool> {
        spec.validate_fields()?;
        let common_name = spec.common_name();
        let filter = user_filter(&common_name);
        debug!(base = %spec.ou_distinguished_name, filter = %filter, "probing directory user");

        let mut session = self.admin_session().await?;
        let entries = self
            .execute_with_timeout(session.search(
                &spec.ou_distinguished_name,
                &filter,
                USER_PROBE_ATTRIBUTES,
            ))
            .await?;
        session.unbind().await?;

        for entry in &entries {
            match DistinguishedName::parse(&entry.dn) {
                Ok(dn) => debug!(
                    dn = %dn,
                    cn = dn.get("cn").or_else(|| entry.first("cn")).unwrap_or_default(),
                    "matched directory entry"
                ),
                Err(err) => warn!(
                    dn = %entry.dn,
                    "search returned entry with malformed DN: {err}"
                ),
            }
        }
        Ok(!entries.is_empty())
    }

    /// Deletes the user object described by `spec`.
    ///
    /// Re-runs the existence probe first: the delete is never issued for an
    /// object that cannot be confirmed to exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when the probe finds nothing, or
    /// [`Error::DirectoryWrite`] when the server rejects the delete (the
    /// recorded identity should then be kept so a retry can be attempted).
    pub async fn delete_user(&self, spec: &UserSpec) -> Result<()> {
        let exists = self.user_exists(spec).await?;
        let common_name = spec.common_name();
        if !exists {
            warn!(cn = %common_name, "delete requested for absent directory user");
            return Err(Error::NotFound(format!(
                "user `{common_name}` not found under `{}`",
                spec.ou_distinguished_name
            )));
        }

        let dn = spec.distinguished_name();
        let mut session = self.admin_session().await?;
        self.execute_with_timeout(session.delete(&dn)).await?;
        session.unbind().await?;

        debug!(dn = %dn, "directory user deleted");
        Ok(())
    }

    async fn admin_session(&self) -> Result<Box<dyn LdapSession>> {
        let mut session = self.connector.connect().await?;
        self.execute_with_timeout(session.simple_bind(
            self.config.credentials().bind_dn(),
            self.config.credentials().bind_password(),
        ))
        .await?;
        Ok(session)
    }

    async fn execute_with_timeout<F, T>(&self, fut: F) -> Result<T>
    where
        F: std::future::Future<Output = Result<T>>,
    {
        timeout(self.config.operation_timeout(), fut)
            .await
            .map_err(|_| Error::Timeout("directory operation timed out".to_string()))?
    }
}

fn user_filter(common_name: &str) -> String {
    format!(
        "(&(objectClass=User)(cn={}))",
        escape_filter_value(common_name)
    )
}

fn escape_filter_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '*' => escaped.push_str("\\2a"),
            '(' => escaped.push_str("\\28"),
            ')' => escaped.push_str("\\29"),
            '\\' => escaped.push_str("\\5c"),
            '\0' => escaped.push_str("\\00"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Real LDAP connector backed by `ldap3`.
pub(crate) struct RealLdapConnector {
    config: Arc<DirectoryConfig>,
}

impl RealLdapConnector {
    #[must_use]
    pub(crate) fn new(config: Arc<DirectoryConfig>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl LdapConnector for RealLdapConnector {
    async fn connect(&self) -> Result<Box<dyn LdapSession>> {
        let settings = build_ldap_settings(&self.config)?;
        let (conn, ldap) = LdapConnAsync::with_settings(settings, self.config.url())
            .await
            .map_err(|err| Error::ServiceUnavailable(err.to_string()))?;
        ldap3::drive!(conn);
        Ok(Box::new(RealLdapSession {
            inner: ldap,
            operation_timeout: self.config.operation_timeout(),
        }))
    }
}

struct RealLdapSession {
    inner: ldap3::Ldap,
    operation_timeout: Duration,
}

#[async_trait]
impl LdapSession for RealLdapSession {
    async fn simple_bind(&mut self, dn: &str, password: &str) -> Result<()> {
        let result = timeout(self.operation_timeout, self.inner.simple_bind(dn, password))
            .await
            .map_err(|_| Error::Timeout("directory bind timed out".to_string()))?
            .map_err(|err| Error::ServiceUnavailable(err.to_string()))?;
        result
            .success()
            .map_err(|err| Error::ServiceUnavailable(format!("bind rejected: {err}")))?;
        Ok(())
    }

    async fn add(&mut self, dn: &str, attributes: &[(String, Vec<String>)]) -> Result<()> {
        let attrs = attributes
            .iter()
            .map(|(attribute, values)| {
                (
                    attribute.clone(),
                    values.iter().cloned().collect::<HashSet<_>>(),
                )
            })
            .collect::<Vec<_>>();

        let write_error = |message: String| Error::DirectoryWrite {
            operation: "add".to_string(),
            dn: dn.to_string(),
            message,
        };
        let result = timeout(self.operation_timeout, self.inner.add(dn, attrs))
            .await
            .map_err(|_| Error::Timeout("directory add timed out".to_string()))?
            .map_err(|err| write_error(err.to_string()))?;
        result
            .success()
            .map_err(|err| write_error(err.to_string()))?;
        Ok(())
    }

    async fn search(
        &mut self,
        base_dn: &str,
        filter: &str,
        attributes: &[&'static str],
    ) -> Result<Vec<LdapEntry>> {
        let search_error = |message: String| Error::DirectorySearch {
            base: base_dn.to_string(),
            message,
        };
        // Scope is always the whole subtree under the base.
        let result = timeout(
            self.operation_timeout,
            self.inner
                .search(base_dn, ldap3::Scope::Subtree, filter, attributes.to_vec()),
        )
        .await
        .map_err(|_| Error::Timeout("directory search timed out".to_string()))?
        .map_err(|err| search_error(err.to_string()))?;
        let (entries, _) = result
            .success()
            .map_err(|err| search_error(err.to_string()))?;
        Ok(entries
            .into_iter()
            .map(SearchEntry::construct)
            .map(|entry| LdapEntry {
                dn: entry.dn,
                attributes: entry.attrs,
            })
            .collect())
    }

    async fn delete(&mut self, dn: &str) -> Result<()> {
        let write_error = |message: String| Error::DirectoryWrite {
            operation: "delete".to_string(),
            dn: dn.to_string(),
            message,
        };
        let result = timeout(self.operation_timeout, self.inner.delete(dn))
            .await
            .map_err(|_| Error::Timeout("directory delete timed out".to_string()))?
            .map_err(|err| write_error(err.to_string()))?;
        result
            .success()
            .map_err(|err| write_error(err.to_string()))?;
        Ok(())
    }

    async fn unbind(&mut self) -> Result<()> {
        timeout(self.operation_timeout, self.inner.unbind())
            .await
            .map_err(|_| Error::Timeout("directory unbind timed out".to_string()))?
            .map_err(|err| Error::ServiceUnavailable(err.to_string()))?;
        Ok(())
    }
}

fn build_ldap_settings(config: &DirectoryConfig) -> Result<LdapConnSettings> {
    let mut settings = LdapConnSettings::new().set_conn_timeout(config.connection_timeout());

    if !config.tls_verify() {
        let connector = TlsConnector::builder()
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|err| {
                Error::ConfigError(format!("failed to construct TLS connector: {err}"))
            })?;
        settings = settings.set_connector(connector).set_no_tls_verify(true);
    } else if let Some(cert_path) = config.tls_ca_cert() {
        let pem = fs::read(cert_path).map_err(|err| {
            Error::ConfigError(format!(
                "failed to read directory CA certificate {}: {err}",
                cert_path.display()
            ))
        })?;
        let certificate = Certificate::from_pem(&pem)
            .map_err(|err| Error::ConfigError(format!("invalid directory CA certificate: {err}")))?;
        let connector = TlsConnector::builder()
            .add_root_certificate(certificate)
            .build()
            .map_err(|err| {
                Error::ConfigError(format!("failed to load directory CA certificate: {err}"))
            })?;
        settings = settings.set_connector(connector);
    }

    Ok(settings)
}
