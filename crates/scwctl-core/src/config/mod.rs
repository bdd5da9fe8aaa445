//! Configuration and profile management
//!
//! Credentials and account defaults live in a TOML file holding named
//! profiles. Values can be overridden by `SCW_*` environment variables and
//! secrets can be kept in the OS keyring (`secure-storage` feature).

#![allow(clippy::module_inception)]

pub mod config;
pub mod credential;
pub mod error;
pub mod polling;

pub use config::{Config, Profile, ResolvedProfile};
pub use credential::{CredentialStorage, CredentialStore};
pub use error::{ConfigError, Result};
pub use polling::PollingConfig;
