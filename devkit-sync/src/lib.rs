//! # devkit-sync
//!
//! Fleet workflows: skeleton application, the per-repository update
//! sequence, and pull-request reconciliation.
//!
//! Version control and the hosting service are reached only through the
//! [`VersionControlPort`] and [`HostingPort`] traits; [`GitCli`] and
//! [`GithubClient`] are the production adapters.

pub mod dispatch;
pub mod error;
pub mod git;
pub mod github;
pub mod hosting;
pub mod migrate;
pub mod reconcile;
pub mod skeleton;
pub mod vcs;
pub mod workflow;

pub use dispatch::{
    active_repositories, auto_close, auto_merge, auto_merge_branches, dispatch, FleetReport,
    RepoReport, RepoStatus, RepoTarget,
};
pub use error::{HostingError, SyncError, VcsError};
pub use git::GitCli;
pub use github::GithubClient;
pub use hosting::{HostingPort, MergeOutcome, PullRequest};
pub use reconcile::{
    BranchMergeReconciliation, CloseReconciliation, MergeReconciliation, PullRequestReconciler,
};
pub use skeleton::{SkeletonApplier, WriteResult};
pub use vcs::{VersionControlPort, WorkingCopy};
pub use workflow::{PullRequestStatus, RepositoryUpdateWorkflow, UpdateKind, UpdateOutcome};
