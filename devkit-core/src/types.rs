//! Domain types for the DevKit fleet configuration.
//!
//! All types are serializable/deserializable via serde + serde_yaml and
//! match the on-disk `projects.yml` layout:
//!
//! ```yaml
//! blast-project:
//!   options:
//!     active: true
//!   repositories:
//!     CoreBundle:
//!       active: true
//!     SuiteApp:
//!       active: true
//!       is_project: true
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Component, Path};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed GitHub organization (or user) name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrganizationName(pub String);

impl fmt::Display for OrganizationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for OrganizationName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OrganizationName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A strongly-typed repository name inside an organization.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepositoryName(pub String);

impl fmt::Display for RepositoryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for RepositoryName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RepositoryName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// An `(owner, repository)` pair identifying one repository on the host.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RepoSlug {
    pub owner: OrganizationName,
    pub name: RepositoryName,
}

impl RepoSlug {
    pub fn new(owner: impl Into<OrganizationName>, name: impl Into<RepositoryName>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Canonical public clone URL, bound to `github_url` when rendering the
    /// CI descriptor: `https://github.com/<owner>/<repo>.git`.
    pub fn github_url(&self) -> String {
        format!("https://github.com/{}/{}.git", self.owner, self.name)
    }

    /// Both names can be joined under a clone root without leaving it.
    pub fn is_path_safe(&self) -> bool {
        is_path_segment(&self.owner.0) && is_path_segment(&self.name.0)
    }
}

/// `name` is exactly one normal path component: not empty, not `.` or
/// `..`, not absolute, and free of `/` and `\` on every platform.
pub fn is_path_segment(name: &str) -> bool {
    if name.is_empty() || name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Whether mutating remote operations are executed or only previewed.
///
/// Set once per invocation from the `--apply` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    #[default]
    DryRun,
    Apply,
}

impl RunMode {
    pub fn from_apply_flag(apply: bool) -> Self {
        if apply {
            RunMode::Apply
        } else {
            RunMode::DryRun
        }
    }

    pub fn is_apply(self) -> bool {
        matches!(self, RunMode::Apply)
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::DryRun => write!(f, "dry-run"),
            RunMode::Apply => write!(f, "apply"),
        }
    }
}

// ---------------------------------------------------------------------------
// Config model
// ---------------------------------------------------------------------------

/// Per-repository switches. Absent keys resolve to `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RepositoryConfig {
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub is_project: bool,
}

/// Organization-level options block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrganizationOptions {
    #[serde(default)]
    pub active: bool,
}

/// One organization entry of the fleet config.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrganizationConfig {
    #[serde(default)]
    pub options: OrganizationOptions,
    /// `None` values come from YAML entries written as `RepoName: ~` or with
    /// an empty body; they resolve to [`RepositoryConfig::default`].
    #[serde(default)]
    pub repositories: BTreeMap<RepositoryName, Option<RepositoryConfig>>,
}

impl OrganizationConfig {
    pub fn is_active(&self) -> bool {
        self.options.active
    }

    /// Repositories in stable name order, each merged with the defaults.
    pub fn repositories(&self) -> impl Iterator<Item = (&RepositoryName, RepositoryConfig)> {
        self.repositories
            .iter()
            .map(|(name, cfg)| (name, cfg.unwrap_or_default()))
    }
}

/// Root of the fleet YAML config: organization name → organization config.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FleetConfig {
    pub organizations: BTreeMap<OrganizationName, OrganizationConfig>,
}

impl FleetConfig {
    pub fn is_empty(&self) -> bool {
        self.organizations.is_empty()
    }

    /// Total number of repository entries across all organizations,
    /// active or not.
    pub fn repository_count(&self) -> usize {
        self.organizations
            .values()
            .map(|org| org.repositories.len())
            .sum()
    }
}

// ---------------------------------------------------------------------------
// Bot identity
// ---------------------------------------------------------------------------

/// Account used to clone, commit, fork and open pull requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotIdentity {
    pub user: String,
    pub email: String,
}

impl Default for BotIdentity {
    fn default() -> Self {
        Self {
            user: crate::managed::BOT_USER.to_string(),
            email: crate::managed::BOT_EMAIL.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
