//! Active Directory user provisioning over LDAP.
//!
//! This crate maps a declarative user specification onto LDAP add, search and
//! delete operations so an infrastructure-as-code host can manage directory
//! user objects through a create/read/delete lifecycle. The distinguished name
//! computed at create time is the object's durable identity.

#![deny(missing_docs)]

mod client;
mod config;
mod dn;
mod resource;
mod schema;
mod user;

pub use client::{DirectoryClient, LdapEntry};
pub use config::{DirectoryConfig, DEFAULT_CONNECTION_TIMEOUT_SECS, DEFAULT_OPERATION_TIMEOUT_SECS};
pub use dn::{DistinguishedName, DistinguishedNameError};
pub use resource::{LifecycleAction, UserResource};
pub use schema::{FieldSchema, ResourceSchema};
pub use user::{AccountOptions, UserAccountControl, UserSpec};

/// Convenient result alias that reuses the core error type.
pub type Result<T> = adprov_core::Result<T>;
