//! Fleet iteration: select active repositories and run one operation on
//! each, isolating per-repository failures.

use std::fmt::Display;

use chrono::{DateTime, Utc};

use devkit_core::{FleetConfig, RepoSlug, RepositoryConfig, RunMode, RunSettings};

use crate::error::SyncError;
use crate::hosting::HostingPort;
use crate::reconcile::PullRequestReconciler;
use crate::skeleton::SkeletonApplier;
use crate::vcs::VersionControlPort;
use crate::workflow::{RepositoryUpdateWorkflow, UpdateKind};

/// One active repository with its effective config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoTarget {
    pub slug: RepoSlug,
    pub config: RepositoryConfig,
}

/// Active repositories of active organizations, in config order.
///
/// Inactive organizations and repositories are logged and skipped.
pub fn active_repositories(config: &FleetConfig) -> Vec<RepoTarget> {
    let mut targets = Vec::new();
    for (owner, org) in &config.organizations {
        if !org.is_active() {
            tracing::info!("{owner} disabled in config");
            continue;
        }
        for (name, repo) in org.repositories() {
            if !repo.active {
                tracing::info!("{owner}/{name} disabled in config");
                continue;
            }
            targets.push(RepoTarget {
                slug: RepoSlug::new(owner.clone(), name.clone()),
                config: repo,
            });
        }
    }
    targets
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoStatus {
    Completed(String),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct RepoReport {
    pub slug: RepoSlug,
    pub status: RepoStatus,
}

/// Per-repository results of one fleet run.
#[derive(Debug, Clone)]
pub struct FleetReport {
    pub mode: RunMode,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub repositories: Vec<RepoReport>,
}

impl FleetReport {
    pub fn start(mode: RunMode) -> Self {
        Self {
            mode,
            started_at: Utc::now(),
            finished_at: None,
            repositories: Vec::new(),
        }
    }

    /// Record the result for `slug`. Failures are logged here and never
    /// propagate further.
    pub fn record<T: Display>(&mut self, slug: RepoSlug, result: Result<T, SyncError>) {
        let status = match result {
            Ok(outcome) => RepoStatus::Completed(outcome.to_string()),
            Err(err) => {
                tracing::error!("Failed with message: {err}");
                RepoStatus::Failed(err.to_string())
            }
        };
        self.repositories.push(RepoReport { slug, status });
    }

    pub fn finish(mut self) -> Self {
        self.finished_at = Some(Utc::now());
        self
    }

    pub fn failures(&self) -> usize {
        self.repositories
            .iter()
            .filter(|r| matches!(r.status, RepoStatus::Failed(_)))
            .count()
    }
}

fn repository_span(slug: &RepoSlug) -> tracing::Span {
    tracing::info_span!("repository", owner = %slug.owner, repository = %slug.name)
}

// ---------------------------------------------------------------------------
// Fleet operations
// ---------------------------------------------------------------------------

/// Run the update workflow on every active repository.
pub fn dispatch<V, H>(
    config: &FleetConfig,
    settings: &RunSettings,
    vcs: &V,
    hosting: &H,
    skeleton: &SkeletonApplier,
    kind: UpdateKind,
) -> FleetReport
where
    V: VersionControlPort,
    H: HostingPort,
{
    let workflow = RepositoryUpdateWorkflow::new(settings, vcs, hosting, skeleton);
    let mut report = FleetReport::start(settings.mode);
    for target in active_repositories(config) {
        let _span = repository_span(&target.slug).entered();
        tracing::info!("{}", target.slug);
        let result = workflow.run(&target, kind);
        report.record(target.slug, result);
    }
    report.finish()
}

/// Merge the managed pull request of every active repository.
pub fn auto_merge<H: HostingPort>(config: &FleetConfig, settings: &RunSettings, hosting: &H) -> FleetReport {
    let reconciler = PullRequestReconciler::new(settings, hosting);
    let mut report = FleetReport::start(settings.mode);
    for target in active_repositories(config) {
        let _span = repository_span(&target.slug).entered();
        tracing::info!("{}", target.slug);
        let result = reconciler.merge(&target.slug);
        report.record(target.slug, result);
    }
    report.finish()
}

/// Close the managed pull request of every active repository.
pub fn auto_close<H: HostingPort>(config: &FleetConfig, settings: &RunSettings, hosting: &H) -> FleetReport {
    let reconciler = PullRequestReconciler::new(settings, hosting);
    let mut report = FleetReport::start(settings.mode);
    for target in active_repositories(config) {
        let _span = repository_span(&target.slug).entered();
        tracing::info!("{}", target.slug);
        let result = reconciler.close(&target.slug);
        report.record(target.slug, result);
    }
    report.finish()
}

/// Merge `update-branch` into the base branch of every active repository.
pub fn auto_merge_branches<H: HostingPort>(
    config: &FleetConfig,
    settings: &RunSettings,
    hosting: &H,
) -> FleetReport {
    let reconciler = PullRequestReconciler::new(settings, hosting);
    let mut report = FleetReport::start(settings.mode);
    for target in active_repositories(config) {
        let _span = repository_span(&target.slug).entered();
        tracing::info!("{}", target.slug);
        let result = reconciler.merge_branches(&target.slug);
        report.record(target.slug, result);
    }
    report.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
acme:
  options: { active: true }
  repositories:
    lib: { active: true }
    app: { active: true, is_project: true }
    old: { active: false }
    bare:
dormant:
  options: { active: false }
  repositories:
    thing: { active: true }
noopts:
  repositories:
    other: { active: true }
"#;

    #[test]
    fn only_active_repositories_of_active_orgs() {
        let config = devkit_core::config::parse(CONFIG).unwrap();
        let targets = active_repositories(&config);
        let slugs: Vec<String> = targets.iter().map(|t| t.slug.to_string()).collect();
        assert_eq!(slugs, vec!["acme/app", "acme/lib"]);
        assert!(targets[0].config.is_project);
        assert!(!targets[1].config.is_project);
    }

    #[test]
    fn report_counts_failures() {
        let mut report = FleetReport::start(RunMode::DryRun);
        report.record(RepoSlug::new("acme", "a"), Ok::<_, SyncError>("done"));
        report.record::<&str>(
            RepoSlug::new("acme", "b"),
            Err(SyncError::SkeletonNotFound { path: "x".into() }),
        );
        let report = report.finish();
        assert_eq!(report.failures(), 1);
        assert!(report.finished_at.is_some());
        assert_eq!(report.repositories[0].status, RepoStatus::Completed("done".into()));
    }
}
