mod support;

use devkit_core::{config, RunMode};
use devkit_sync::dispatch::{auto_merge, dispatch, RepoStatus};
use devkit_sync::skeleton::SkeletonApplier;
use devkit_sync::workflow::UpdateKind;
use tempfile::TempDir;

use support::{settings, skeleton_dir, FakeHosting, FakeVcs};

const THREE_REPOS: &str = r#"
acme:
  options: { active: true }
  repositories:
    alpha: { active: true }
    broken: { active: true }
    gamma: { active: true }
    sleeping: { active: false }
"#;

#[test]
fn one_failing_clone_does_not_stop_the_fleet() {
    let workspace = TempDir::new().unwrap();
    let skeleton = skeleton_dir();
    let settings = settings(RunMode::Apply, workspace.path(), skeleton.path());
    let vcs = FakeVcs {
        fail_clone_matching: Some("/acme/broken".into()),
        ..FakeVcs::default()
    };
    let hosting = FakeHosting::default();
    let applier = SkeletonApplier::new(skeleton.path()).unwrap();
    let config = config::parse(THREE_REPOS).unwrap();

    let report = dispatch(&config, &settings, &vcs, &hosting, &applier, UpdateKind::Skeleton);

    let names: Vec<String> = report.repositories.iter().map(|r| r.slug.to_string()).collect();
    assert_eq!(names, vec!["acme/alpha", "acme/broken", "acme/gamma"]);
    assert_eq!(report.failures(), 1);
    assert!(matches!(&report.repositories[1].status, RepoStatus::Failed(msg) if msg.contains("repository not found")));
    assert!(matches!(report.repositories[2].status, RepoStatus::Completed(_)));
    assert!(hosting.calls().iter().any(|c| c == "create_fork acme/gamma"));
}

#[test]
fn hosting_failure_is_recorded_per_repository() {
    let hosting = FakeHosting {
        fail_list_for: Some("alpha".into()),
        ..FakeHosting::default()
    };
    let workspace = TempDir::new().unwrap();
    let skeleton = skeleton_dir();
    let settings = settings(RunMode::Apply, workspace.path(), skeleton.path());
    let config = config::parse(THREE_REPOS).unwrap();

    let report = auto_merge(&config, &settings, &hosting);

    assert_eq!(report.repositories.len(), 3);
    assert_eq!(report.failures(), 1);
    assert!(matches!(&report.repositories[0].status, RepoStatus::Failed(msg) if msg.contains("500")));
}

#[test]
fn dry_run_issues_no_mutating_calls_for_any_repository() {
    let workspace = TempDir::new().unwrap();
    let skeleton = skeleton_dir();
    let settings = settings(RunMode::DryRun, workspace.path(), skeleton.path());
    let vcs = FakeVcs::default();
    let hosting = FakeHosting::with_pulls(vec![support::pull_request(
        1,
        "DevKit updates for alpha",
        "BlastCI:update-branch",
    )]);
    let applier = SkeletonApplier::new(skeleton.path()).unwrap();
    let config = config::parse(THREE_REPOS).unwrap();

    dispatch(&config, &settings, &vcs, &hosting, &applier, UpdateKind::Skeleton);
    dispatch(&config, &settings, &vcs, &hosting, &applier, UpdateKind::SourceMigration);
    auto_merge(&config, &settings, &hosting);
    devkit_sync::auto_close(&config, &settings, &hosting);
    devkit_sync::auto_merge_branches(&config, &settings, &hosting);

    assert!(hosting.mutating_calls().is_empty(), "{:?}", hosting.mutating_calls());
    assert!(!vcs.calls().iter().any(|c| c.starts_with("push") || c.starts_with("commit")));
}
