//! Fleet config loading and bundle narrowing.
//!
//! # Storage layout
//!
//! ```text
//! <repo root>/
//!   config/
//!     projects.yml      (organization → options + repositories)
//! ```
//!
//! The file is parsed once per run; the only transformation afterwards is
//! [`compute_bundle_configs`], which narrows the fleet to explicitly
//! selected repositories.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::ConfigError;
use crate::types::{
    is_path_segment, FleetConfig, OrganizationConfig, OrganizationName, OrganizationOptions,
    RepositoryConfig, RepositoryName,
};

/// Default location of the fleet config, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/projects.yml";

/// Separator between owner and repository in a bundle selector.
pub const SELECTOR_SEPARATOR: &str = "::";

// ---------------------------------------------------------------------------
// 1. Load
// ---------------------------------------------------------------------------

/// `<cwd>/config/projects.yml`: pure, no I/O.
pub fn default_config_path() -> PathBuf {
    PathBuf::from(DEFAULT_CONFIG_PATH)
}

/// Load the fleet config from `path`.
///
/// Returns `ConfigError::NotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed YAML,
/// `ConfigError::InvalidName` if a key is not a single path segment.
pub fn load_at(path: &Path) -> Result<FleetConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let fleet = parse(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    if let Some(name) = first_invalid_name(&fleet) {
        return Err(ConfigError::InvalidName {
            path: path.to_path_buf(),
            name: name.to_string(),
        });
    }
    Ok(fleet)
}

/// The first organization or repository key that would not stay inside
/// the clone root once joined onto it.
pub fn first_invalid_name(fleet: &FleetConfig) -> Option<&str> {
    fleet.organizations.iter().find_map(|(owner, org)| {
        if !is_path_segment(&owner.0) {
            return Some(owner.0.as_str());
        }
        org.repositories
            .keys()
            .map(|name| name.0.as_str())
            .find(|name| !is_path_segment(name))
    })
}

/// Parse a fleet config from YAML text. An empty document is an empty fleet.
pub fn parse(contents: &str) -> Result<FleetConfig, serde_yaml::Error> {
    if contents.trim().is_empty() {
        return Ok(FleetConfig::default());
    }
    let parsed: Option<FleetConfig> = serde_yaml::from_str(contents)?;
    Ok(parsed.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// 2. Bundle selectors
// ---------------------------------------------------------------------------

/// An explicit `owner::repository` target given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleSelector {
    pub owner: OrganizationName,
    pub repository: RepositoryName,
}

impl FromStr for BundleSelector {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidSelector {
            selector: s.to_string(),
        };
        let (owner, repository) = s.split_once(SELECTOR_SEPARATOR).ok_or_else(invalid)?;
        let (owner, repository) = (owner.trim(), repository.trim());
        if repository.contains(SELECTOR_SEPARATOR)
            || !is_path_segment(owner)
            || !is_path_segment(repository)
        {
            return Err(invalid());
        }
        Ok(Self {
            owner: OrganizationName::from(owner),
            repository: RepositoryName::from(repository),
        })
    }
}

impl fmt::Display for BundleSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SELECTOR_SEPARATOR}{}", self.owner, self.repository)
    }
}

/// Parse every raw selector, failing on the first malformed one.
pub fn parse_selectors<S: AsRef<str>>(raw: &[S]) -> Result<Vec<BundleSelector>, ConfigError> {
    raw.iter().map(|s| s.as_ref().parse()).collect()
}

// ---------------------------------------------------------------------------
// 3. Narrowing
// ---------------------------------------------------------------------------

/// Narrow `config` to the selected bundles.
///
/// An empty selection returns the full config unchanged. Otherwise a fresh
/// config is built holding only the named repositories, each forced
/// `active: true, is_project: false`, grouped under active owners. The
/// selection does not need to be present in `config`.
pub fn compute_bundle_configs(config: &FleetConfig, selectors: &[BundleSelector]) -> FleetConfig {
    if selectors.is_empty() {
        return config.clone();
    }

    let mut narrowed = FleetConfig::default();
    for selector in selectors {
        let org = narrowed
            .organizations
            .entry(selector.owner.clone())
            .or_insert_with(|| OrganizationConfig {
                options: OrganizationOptions { active: true },
                repositories: Default::default(),
            });
        org.repositories.insert(
            selector.repository.clone(),
            Some(RepositoryConfig {
                active: true,
                is_project: false,
            }),
        );
    }
    narrowed
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
