//! # adprov-core
//!
//! Core types for the Active Directory provisioning plugin.
//!
//! This crate provides the shared error taxonomy and the directory bind
//! credentials used by the LDAP-facing crates.
//!
//! ## Modules
//!
//! - [`error`] - Error types and error code mapping
//! - [`services`] - Directory service credentials

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod services;

// Re-export commonly used types
pub use error::{Error, Result};
