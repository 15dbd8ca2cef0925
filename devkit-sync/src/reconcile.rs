//! Merge and close tool-owned pull requests.

use devkit_core::managed::{self, DEVKIT_BRANCH};
use devkit_core::{RepoSlug, RunSettings};

use crate::error::SyncError;
use crate::hosting::{
    HostingPort, MergeOutcome, PullRequest, PullRequestFilter, PullRequestState,
    PullRequestUpdate,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeReconciliation {
    NotFound,
    /// Dry run: the managed pull request exists and would be merged.
    Found { number: u64 },
    Merged { number: u64, sha: String },
    NothingToMerge { number: u64 },
    ConflictSkipped { number: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReconciliation {
    NotFound,
    WouldClose { number: u64 },
    Closed { number: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchMergeReconciliation {
    /// Dry run: nothing was sent.
    Skipped,
    Merged { sha: String },
    NothingToMerge,
    ConflictSkipped,
}

impl std::fmt::Display for MergeReconciliation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MergeReconciliation::NotFound => f.write_str("no managed pull request"),
            MergeReconciliation::Found { number } => write!(f, "would merge #{number}"),
            MergeReconciliation::Merged { number, sha } => write!(f, "merged #{number} ({sha})"),
            MergeReconciliation::NothingToMerge { number } => write!(f, "#{number}: nothing to merge"),
            MergeReconciliation::ConflictSkipped { number } => write!(f, "#{number}: conflict, skipped"),
        }
    }
}

impl std::fmt::Display for CloseReconciliation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CloseReconciliation::NotFound => f.write_str("no managed pull request"),
            CloseReconciliation::WouldClose { number } => write!(f, "would close #{number}"),
            CloseReconciliation::Closed { number } => write!(f, "closed #{number}"),
        }
    }
}

impl std::fmt::Display for BranchMergeReconciliation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BranchMergeReconciliation::Skipped => f.write_str("skipped (dry run)"),
            BranchMergeReconciliation::Merged { sha } => write!(f, "merged ({sha})"),
            BranchMergeReconciliation::NothingToMerge => f.write_str("nothing to merge"),
            BranchMergeReconciliation::ConflictSkipped => f.write_str("conflict, skipped"),
        }
    }
}

pub struct PullRequestReconciler<'a, H> {
    settings: &'a RunSettings,
    hosting: &'a H,
}

impl<'a, H: HostingPort> PullRequestReconciler<'a, H> {
    pub fn new(settings: &'a RunSettings, hosting: &'a H) -> Self {
        Self { settings, hosting }
    }

    /// First open pull request whose head is the bot branch and whose title
    /// carries the managed marker.
    pub fn find_managed(&self, slug: &RepoSlug) -> Result<Option<PullRequest>, SyncError> {
        let head = managed::head_label(&self.settings.bot.user);
        let filter = PullRequestFilter::open()
            .with_head(head.clone())
            .with_base(self.settings.base_branch.clone());
        let pulls = self.hosting.list_pull_requests(slug, &filter)?;
        Ok(pulls
            .into_iter()
            .find(|pr| pr.head.label == head && managed::is_managed_title(&pr.title)))
    }

    /// Merge the managed pull request into the base branch.
    ///
    /// A conflict is reported as [`MergeReconciliation::ConflictSkipped`];
    /// any other hosting failure is returned as an error.
    pub fn merge(&self, slug: &RepoSlug) -> Result<MergeReconciliation, SyncError> {
        tracing::info!("finding pull request");
        let Some(pr) = self.find_managed(slug)? else {
            tracing::info!("pull request does not exist");
            return Ok(MergeReconciliation::NotFound);
        };
        let number = pr.number;
        tracing::info!(number, title = %pr.title, sha = %pr.head.sha, "found pull request");

        if !self.settings.mode.is_apply() {
            return Ok(MergeReconciliation::Found { number });
        }

        let base = &self.settings.base_branch;
        let message = managed::merge_message(&pr.head.label, base);
        let outcome = self
            .hosting
            .merge_pull_request(slug, number, &message, &pr.head.sha)?;
        Ok(match outcome {
            MergeOutcome::Merged { sha } => {
                tracing::info!(number, "merged {} into {base}", pr.head.label);
                MergeReconciliation::Merged { number, sha }
            }
            MergeOutcome::NothingToMerge => {
                tracing::info!(number, "nothing to merge on {base}");
                MergeReconciliation::NothingToMerge { number }
            }
            MergeOutcome::Conflict => {
                tracing::warn!(
                    number,
                    "merging of {} into {base} contains conflicts, skipped",
                    pr.head.label
                );
                MergeReconciliation::ConflictSkipped { number }
            }
        })
    }

    /// Close the open pull request titled exactly `DevKit updates for <repo>`.
    pub fn close(&self, slug: &RepoSlug) -> Result<CloseReconciliation, SyncError> {
        let title = managed::pull_request_title(&slug.name);
        let filter =
            PullRequestFilter::open().with_head(managed::head_label(&self.settings.bot.user));
        let pulls = self.hosting.list_pull_requests(slug, &filter)?;
        let Some(pr) = pulls.into_iter().find(|pr| pr.title == title) else {
            tracing::info!("pull request does not exist");
            return Ok(CloseReconciliation::NotFound);
        };
        let number = pr.number;
        tracing::info!(number, title = %pr.title, sha = %pr.head.sha, "found pull request");

        if !self.settings.mode.is_apply() {
            tracing::info!(number, "would close pull request for {slug}");
            return Ok(CloseReconciliation::WouldClose { number });
        }

        let update = PullRequestUpdate {
            title: Some(title),
            state: Some(PullRequestState::Closed),
        };
        self.hosting.update_pull_request(slug, number, &update)?;
        std::thread::sleep(self.settings.pull_request_settle_delay);
        tracing::info!(number, "pull request for {} closed", slug.name);
        Ok(CloseReconciliation::Closed { number })
    }

    /// Merge `update-branch` into the base branch of the upstream
    /// repository directly. Apply mode only.
    pub fn merge_branches(&self, slug: &RepoSlug) -> Result<BranchMergeReconciliation, SyncError> {
        if !self.settings.mode.is_apply() {
            return Ok(BranchMergeReconciliation::Skipped);
        }
        let base = &self.settings.base_branch;
        let message = managed::merge_message(DEVKIT_BRANCH, base);
        let outcome = self
            .hosting
            .merge_branches(slug, base, DEVKIT_BRANCH, &message)?;
        Ok(match outcome {
            MergeOutcome::Merged { sha } => {
                tracing::info!("merged {DEVKIT_BRANCH} into {base}");
                BranchMergeReconciliation::Merged { sha }
            }
            MergeOutcome::NothingToMerge => {
                tracing::info!("nothing to merge on {base}");
                BranchMergeReconciliation::NothingToMerge
            }
            MergeOutcome::Conflict => {
                tracing::warn!("merging of {DEVKIT_BRANCH} into {base} contains conflicts, skipped");
                BranchMergeReconciliation::ConflictSkipped
            }
        })
    }
}
