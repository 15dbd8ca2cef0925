//! Hosting-service port: forks, pull requests, merges.
//!
//! [`GithubClient`](crate::github::GithubClient) talks to the GitHub REST
//! API. Every operation addresses the upstream repository by its
//! [`RepoSlug`]; fork operations act on the bot account's copy of it.

use serde::{Deserialize, Serialize};

use devkit_core::RepoSlug;

use crate::error::HostingError;

// ---------------------------------------------------------------------------
// Models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullRequestState {
    Open,
    Closed,
}

impl PullRequestState {
    pub fn as_str(self) -> &'static str {
        match self {
            PullRequestState::Open => "open",
            PullRequestState::Closed => "closed",
        }
    }
}

/// One side of a pull request (`head` or `base`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRef {
    /// `owner:branch`.
    pub label: String,
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub sha: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub state: PullRequestState,
    pub head: PullRequestRef,
    pub base: PullRequestRef,
}

/// Query for [`HostingPort::list_pull_requests`]. `None` fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullRequestFilter {
    pub state: Option<PullRequestState>,
    /// `owner:branch` of the head.
    pub head: Option<String>,
    pub base: Option<String>,
}

impl PullRequestFilter {
    pub fn open() -> Self {
        Self {
            state: Some(PullRequestState::Open),
            ..Self::default()
        }
    }

    pub fn with_head(mut self, head: impl Into<String>) -> Self {
        self.head = Some(head.into());
        self
    }

    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Query-string pairs in a stable order.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(state) = self.state {
            pairs.push(("state", state.as_str().to_string()));
        }
        if let Some(head) = &self.head {
            pairs.push(("head", head.clone()));
        }
        if let Some(base) = &self.base {
            pairs.push(("base", base.clone()));
        }
        pairs
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPullRequest {
    pub title: String,
    /// `owner:branch` of the fork branch.
    pub head: String,
    pub base: String,
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PullRequestUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<PullRequestState>,
}

/// Result of a merge the service accepted or refused for content reasons.
///
/// Transport and permission failures are `Err(HostingError)` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    Merged { sha: String },
    /// Base already contains head.
    NothingToMerge,
    /// The change cannot be merged automatically.
    Conflict,
}

// ---------------------------------------------------------------------------
// Port
// ---------------------------------------------------------------------------

pub trait HostingPort {
    /// Fork `upstream` into the authenticated account.
    fn create_fork(&self, upstream: &RepoSlug) -> Result<(), HostingError>;

    /// Delete the authenticated account's fork of `upstream`.
    fn delete_fork(&self, upstream: &RepoSlug) -> Result<(), HostingError>;

    fn list_pull_requests(
        &self,
        upstream: &RepoSlug,
        filter: &PullRequestFilter,
    ) -> Result<Vec<PullRequest>, HostingError>;

    fn create_pull_request(
        &self,
        upstream: &RepoSlug,
        request: &NewPullRequest,
    ) -> Result<PullRequest, HostingError>;

    fn update_pull_request(
        &self,
        upstream: &RepoSlug,
        number: u64,
        update: &PullRequestUpdate,
    ) -> Result<PullRequest, HostingError>;

    /// Merge branch `head` into `base` directly, without a pull request.
    fn merge_branches(
        &self,
        upstream: &RepoSlug,
        base: &str,
        head: &str,
        message: &str,
    ) -> Result<MergeOutcome, HostingError>;

    /// Merge pull request `number`, only if its head is still `sha`.
    fn merge_pull_request(
        &self,
        upstream: &RepoSlug,
        number: u64,
        message: &str,
        sha: &str,
    ) -> Result<MergeOutcome, HostingError>;
}
