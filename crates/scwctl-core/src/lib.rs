//! # scwctl-core
//!
//! Library behind the `scwctl` CLI: typed clients for the Scaleway block
//! storage, serverless containers and instance APIs, plus the plumbing they
//! share.
//!
//! - [`client`] - authenticated HTTP client and account defaults
//! - [`locality`] - zones, regions and sequential per-locality fan-out
//! - [`pagination`] - "fetch every page" for list endpoints
//! - [`wait`] / [`progress`] - polling a resource until it settles
//! - [`api`] - one module per product API, each with its sweepers
//! - [`sweep`] - bulk cleanup of test accounts
//! - [`config`] - TOML profiles, keyring references and env overrides
//!
//! ## Example
//!
//! ```ignore
//! use scwctl_core::api::block::{BlockApi, ListVolumesRequest};
//! use scwctl_core::{Config, CredentialStore, ScwClient};
//!
//! let profile = Config::load()?.resolve(None, &CredentialStore::new())?;
//! let client = ScwClient::from_profile(&profile)?;
//! let volumes = BlockApi::new(client)
//!     .list_all_volumes(&ListVolumesRequest::default())
//!     .await?;
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod locality;
pub mod pagination;
pub mod progress;
pub mod sweep;
pub mod wait;

#[cfg(feature = "testing")]
pub mod testing;

pub use client::{ApiResponse, Method, Query, ScwClient, ScwClientBuilder};
pub use config::{Config, ConfigError, CredentialStore, Profile, ResolvedProfile};
pub use error::{ErrorList, Result, ResultExt, ScwError};
pub use locality::{Locality, Region, Zone};
pub use progress::{ProgressCallback, ProgressEvent};
pub use wait::WaitOptions;
