//! Per-repository update: clone, mutate, diff, and (in apply mode) publish
//! the change as a pull request from the bot fork.

use std::fmt;
use std::path::Path;

use devkit_core::managed::{self, COMMIT_MESSAGE, DEVKIT_BRANCH};
use devkit_core::RunSettings;

use crate::dispatch::RepoTarget;
use crate::error::{io_err, SyncError};
use crate::hosting::{HostingPort, NewPullRequest, PullRequestFilter};
use crate::migrate;
use crate::skeleton::{relocate_project_resources, SkeletonApplier};
use crate::vcs::{VersionControlPort, WorkingCopy};

/// Which mutation the workflow applies to the working copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    /// Skeleton mirror + CI descriptor, plus resource relocation for projects.
    Skeleton,
    /// Move sources under `src/`, apply the skeleton, rewrite autoloading.
    SourceMigration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullRequestStatus {
    Created(u64),
    AlreadyOpen(u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The mutation produced an empty diff.
    NoChanges,
    /// Dry run: the diff is not empty but nothing was published.
    ChangesPending,
    Published {
        pull_request: PullRequestStatus,
        fork_deleted: bool,
    },
}

impl fmt::Display for UpdateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateOutcome::NoChanges => f.write_str("nothing to be changed"),
            UpdateOutcome::ChangesPending => f.write_str("changes pending (dry run)"),
            UpdateOutcome::Published { pull_request, .. } => match pull_request {
                PullRequestStatus::Created(n) => write!(f, "pull request #{n} created"),
                PullRequestStatus::AlreadyOpen(n) => write!(f, "pull request #{n} updated"),
            },
        }
    }
}

/// Drives one repository through the update sequence.
pub struct RepositoryUpdateWorkflow<'a, V, H> {
    settings: &'a RunSettings,
    vcs: &'a V,
    hosting: &'a H,
    skeleton: &'a SkeletonApplier,
}

impl<'a, V, H> RepositoryUpdateWorkflow<'a, V, H>
where
    V: VersionControlPort,
    H: HostingPort,
{
    pub fn new(
        settings: &'a RunSettings,
        vcs: &'a V,
        hosting: &'a H,
        skeleton: &'a SkeletonApplier,
    ) -> Self {
        Self {
            settings,
            vcs,
            hosting,
            skeleton,
        }
    }

    /// Run the whole sequence for `target`. On error the working copy is
    /// left on disk.
    pub fn run(&self, target: &RepoTarget, kind: UpdateKind) -> Result<UpdateOutcome, SyncError> {
        let mut wc = self.checkout(target)?;
        self.mutate(wc.path(), target, kind)?;

        wc.stage_all()?;
        if wc.diff_cached()?.trim().is_empty() {
            tracing::info!("Nothing to be changed.");
            return Ok(UpdateOutcome::NoChanges);
        }
        tracing::info!("Diff is not empty.");

        if !self.settings.mode.is_apply() {
            tracing::warn!("changes pending for {}; rerun with --apply to publish", target.slug);
            return Ok(UpdateOutcome::ChangesPending);
        }

        self.publish(&mut wc, target)
    }

    /// Fresh clone on `update-branch`, committing as the bot.
    fn checkout(&self, target: &RepoTarget) -> Result<V::WorkingCopy, SyncError> {
        if !target.slug.is_path_safe() {
            return Err(SyncError::UnsafeSlug {
                slug: target.slug.to_string(),
            });
        }
        let path = self.settings.clone_path(&target.slug);
        if path.exists() {
            tracing::debug!("removing previous working copy {}", path.display());
            std::fs::remove_dir_all(&path).map_err(|e| io_err(&path, e))?;
        }

        tracing::info!("cloning {} into {}", target.slug, path.display());
        let url = self.settings.upstream_remote_url(&target.slug);
        let mut wc = self.vcs.clone_repository(&url, &path)?;

        let bot = &self.settings.bot;
        wc.configure_identity(&bot.user, &bot.email)?;
        wc.reset_hard()?;
        wc.checkout_new_branch(DEVKIT_BRANCH)?;
        Ok(wc)
    }

    fn mutate(&self, root: &Path, target: &RepoTarget, kind: UpdateKind) -> Result<(), SyncError> {
        match kind {
            UpdateKind::Skeleton => {
                self.skeleton.apply(root, &target.slug)?;
                if target.config.is_project {
                    relocate_project_resources(root)?;
                }
            }
            UpdateKind::SourceMigration => {
                migrate::prepare_layout(root)?;
                self.skeleton.apply(root, &target.slug)?;
                migrate::rewrite_composer_autoload(root)?;
            }
        }
        Ok(())
    }

    fn publish(&self, wc: &mut V::WorkingCopy, target: &RepoTarget) -> Result<UpdateOutcome, SyncError> {
        let slug = &target.slug;
        let bot = &self.settings.bot.user;

        tracing::info!("creating commit");
        wc.commit(COMMIT_MESSAGE)?;

        tracing::info!("creating fork of {slug}");
        self.hosting.create_fork(slug)?;

        wc.add_remote(bot, &self.settings.fork_remote_url(slug))?;
        std::thread::sleep(self.settings.fork_settle_delay);

        tracing::info!("pushing {DEVKIT_BRANCH} to {bot}");
        wc.push(bot, DEVKIT_BRANCH, true)?;

        let head = managed::head_label(bot);
        let filter = PullRequestFilter::open()
            .with_head(head.clone())
            .with_base(self.settings.base_branch.clone());
        let existing = self.hosting.list_pull_requests(slug, &filter)?;

        let pull_request = match existing.iter().find(|pr| pr.head.label == head) {
            Some(pr) => {
                tracing::info!(number = pr.number, "pull request already open");
                PullRequestStatus::AlreadyOpen(pr.number)
            }
            None => {
                let request = NewPullRequest {
                    title: managed::pull_request_title(&slug.name),
                    head,
                    base: self.settings.base_branch.clone(),
                    body: String::new(),
                };
                let pr = self.hosting.create_pull_request(slug, &request)?;
                tracing::info!(number = pr.number, "pull request created for {slug}");
                PullRequestStatus::Created(pr.number)
            }
        };
        std::thread::sleep(self.settings.pull_request_settle_delay);

        let fork_deleted = if self.settings.keep_fork {
            tracing::warn!("fork {bot}/{} kept (--do-not-delete-fork)", slug.name);
            false
        } else {
            self.hosting.delete_fork(slug)?;
            tracing::info!("fork {bot}/{} deleted", slug.name);
            true
        };

        Ok(UpdateOutcome::Published {
            pull_request,
            fork_deleted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_display() {
        assert_eq!(UpdateOutcome::NoChanges.to_string(), "nothing to be changed");
        assert_eq!(
            UpdateOutcome::Published {
                pull_request: PullRequestStatus::Created(7),
                fork_deleted: true,
            }
            .to_string(),
            "pull request #7 created"
        );
    }
}
