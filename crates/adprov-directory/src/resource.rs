//! Host-facing lifecycle for the directory user resource.
//!
//! The host runtime drives a resource through create, read and delete; there
//! is no update entry point because every field forces a replacement. The
//! opaque identity string the host stores on the resource's behalf is the
//! distinguished name computed at create time.

use crate::{client::DirectoryClient, user::UserSpec, Result};
use tracing::debug;

/// Lifecycle entry point selected by the host runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    /// Create the directory object and record its identity.
    Create,
    /// Probe for the object; clear identity if it is confirmed absent.
    Read,
    /// Delete the object after confirming it exists.
    Delete,
}

/// A declared directory user together with its recorded identity.
#[derive(Debug, Clone)]
pub struct UserResource {
    spec: UserSpec,
    identity: Option<String>,
}

impl UserResource {
    /// Creates a resource that has not been applied yet.
    #[must_use]
    pub fn new(spec: UserSpec) -> Self {
        Self {
            spec,
            identity: None,
        }
    }

    /// Restores a resource whose identity the host persisted earlier.
    #[must_use]
    pub fn restore(spec: UserSpec, identity: impl Into<String>) -> Self {
        Self {
            spec,
            identity: Some(identity.into()),
        }
    }

    /// The declared specification.
    #[must_use]
    pub const fn spec(&self) -> &UserSpec {
        &self.spec
    }

    /// The recorded identity, if the object is believed to exist.
    #[must_use]
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// Dispatches the given lifecycle action.
    ///
    /// # Errors
    ///
    /// Propagates the error of the underlying operation.
    pub async fn apply(&mut self, action: LifecycleAction, client: &DirectoryClient) -> Result<()> {
        match action {
            LifecycleAction::Create => self.create(client).await,
            LifecycleAction::Read => self.read(client).await.map(|_| ()),
            LifecycleAction::Delete => self.delete(client).await,
        }
    }

    /// Creates the directory object and records its distinguished name.
    ///
    /// # Errors
    ///
    /// Propagates validation and write errors; identity is only recorded on
    /// success.
    pub async fn create(&mut self, client: &DirectoryClient) -> Result<()> {
        let identity = client.create_user(&self.spec).await?;
        debug!(identity = %identity, "recorded directory user identity");
        self.identity = Some(identity);
        Ok(())
    }

    /// Probes for the object and reconciles the recorded identity.
    ///
    /// Only an explicit empty search result clears the identity; a search
    /// failure propagates without touching it, so "could not confirm" is
    /// never conflated with "confirmed absent".
    ///
    /// # Errors
    ///
    /// Propagates search failures.
    pub async fn read(&mut self, client: &DirectoryClient) -> Result<bool> {
        let found = client.user_exists(&self.spec).await?;
        if !found {
            debug!(cn = %self.spec.common_name(), "directory user confirmed absent");
            self.identity = None;
        }
        Ok(found)
    }

    /// Deletes the directory object.
    ///
    /// The client re-confirms existence before issuing the delete. When the
    /// object is confirmed absent, the identity is cleared and the not-found
    /// error still surfaces to the host. A rejected delete leaves the
    /// identity in place so a retry can be attempted.
    ///
    /// # Errors
    ///
    /// Propagates [`adprov_core::Error::NotFound`] and write errors.
    pub async fn delete(&mut self, client: &DirectoryClient) -> Result<()> {
        match client.delete_user(&self.spec).await {
            Ok(()) => {
                self.identity = None;
                Ok(())
            }
            Err(err) => {
                if err.is_confirmed_absent() {
                    self.identity = None;
                }
                Err(err)
            }
        }
    }
}
