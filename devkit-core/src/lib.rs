//! DevKit core library: fleet config model, loader, run settings, errors.
//!
//! Public API surface:
//! - [`types`]: newtypes and config structs
//! - [`managed`]: branch / title conventions for tool-owned pull requests
//! - [`config`]: load, bundle selectors, narrowing
//! - [`settings`]: immutable per-run settings
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod managed;
pub mod settings;
pub mod types;

pub use config::{compute_bundle_configs, BundleSelector};
pub use error::ConfigError;
pub use settings::RunSettings;
pub use types::{
    BotIdentity, FleetConfig, OrganizationConfig, OrganizationName, OrganizationOptions,
    RepoSlug, RepositoryConfig, RepositoryName, RunMode,
};
