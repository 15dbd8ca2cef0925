//! Recording fakes of the version-control and hosting ports.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use devkit_core::{RunMode, RunSettings};
use devkit_sync::error::{HostingError, VcsError};
use devkit_sync::hosting::{
    HostingPort, MergeOutcome, NewPullRequest, PullRequest, PullRequestFilter, PullRequestRef,
    PullRequestState, PullRequestUpdate,
};
use devkit_sync::vcs::{VersionControlPort, WorkingCopy};
use devkit_core::RepoSlug;
use tempfile::TempDir;

pub type CallLog = Rc<RefCell<Vec<String>>>;
pub type Tree = BTreeMap<PathBuf, Vec<u8>>;

/// Every file under `root`, keyed by relative path.
pub fn snapshot(root: &Path) -> Tree {
    fn walk(root: &Path, dir: &Path, out: &mut Tree) {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(root, &path, out);
            } else {
                let rel = path.strip_prefix(root).unwrap().to_path_buf();
                out.insert(rel, fs::read(&path).unwrap());
            }
        }
    }
    let mut out = Tree::new();
    if root.exists() {
        walk(root, root, &mut out);
    }
    out
}

// ---------------------------------------------------------------------------
// Version control
// ---------------------------------------------------------------------------

/// Clones materialise `upstream` on disk; the index is a tree snapshot.
#[derive(Default)]
pub struct FakeVcs {
    pub log: CallLog,
    pub upstream: Rc<RefCell<Tree>>,
    /// Clones of URLs containing this string fail.
    pub fail_clone_matching: Option<String>,
}

impl FakeVcs {
    pub fn with_upstream(files: &[(&str, &str)]) -> Self {
        let tree = files
            .iter()
            .map(|(p, c)| (PathBuf::from(p), c.as_bytes().to_vec()))
            .collect();
        Self {
            upstream: Rc::new(RefCell::new(tree)),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.borrow().clone()
    }
}

impl VersionControlPort for FakeVcs {
    type WorkingCopy = FakeWorkingCopy;

    fn clone_repository(&self, url: &str, path: &Path) -> Result<FakeWorkingCopy, VcsError> {
        self.log.borrow_mut().push(format!("clone {url}"));
        if let Some(pattern) = &self.fail_clone_matching {
            if url.contains(pattern.as_str()) {
                return Err(VcsError::CommandFailed {
                    command: format!("git clone {url}"),
                    status: "exit status: 128".into(),
                    stderr: "repository not found".into(),
                });
            }
        }
        assert!(!path.exists(), "clone target must have been removed");
        let baseline = self.upstream.borrow().clone();
        for (rel, content) in &baseline {
            let file = path.join(rel);
            fs::create_dir_all(file.parent().unwrap()).unwrap();
            fs::write(file, content).unwrap();
        }
        fs::create_dir_all(path).unwrap();
        Ok(FakeWorkingCopy {
            root: path.to_path_buf(),
            log: Rc::clone(&self.log),
            head: baseline,
            index: None,
        })
    }
}

pub struct FakeWorkingCopy {
    root: PathBuf,
    log: CallLog,
    head: Tree,
    index: Option<Tree>,
}

impl FakeWorkingCopy {
    fn record(&self, call: String) {
        self.log.borrow_mut().push(call);
    }
}

impl WorkingCopy for FakeWorkingCopy {
    fn path(&self) -> &Path {
        &self.root
    }

    fn configure_identity(&mut self, name: &str, email: &str) -> Result<(), VcsError> {
        self.record(format!("identity {name} <{email}>"));
        Ok(())
    }

    fn reset_hard(&mut self) -> Result<(), VcsError> {
        self.record("reset --hard".into());
        Ok(())
    }

    fn checkout_new_branch(&mut self, branch: &str) -> Result<(), VcsError> {
        self.record(format!("checkout -b {branch}"));
        Ok(())
    }

    fn stage_all(&mut self) -> Result<(), VcsError> {
        self.record("add --all".into());
        self.index = Some(snapshot(&self.root));
        Ok(())
    }

    fn diff_cached(&self) -> Result<String, VcsError> {
        let index = self.index.clone().unwrap_or_else(|| self.head.clone());
        let mut diff = String::new();
        for (path, content) in &index {
            match self.head.get(path) {
                None => diff.push_str(&format!("A {}\n", path.display())),
                Some(old) if old != content => diff.push_str(&format!("M {}\n", path.display())),
                Some(_) => {}
            }
        }
        for path in self.head.keys().filter(|p| !index.contains_key(*p)) {
            diff.push_str(&format!("D {}\n", path.display()));
        }
        Ok(diff)
    }

    fn commit(&mut self, message: &str) -> Result<(), VcsError> {
        self.record(format!("commit {message}"));
        if let Some(index) = &self.index {
            self.head = index.clone();
        }
        Ok(())
    }

    fn add_remote(&mut self, name: &str, url: &str) -> Result<(), VcsError> {
        self.record(format!("remote add {name} {url}"));
        Ok(())
    }

    fn push(&mut self, remote: &str, branch: &str, force: bool) -> Result<(), VcsError> {
        self.record(format!("push {remote} {branch} force={force}"));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Hosting
// ---------------------------------------------------------------------------

/// In-memory pull requests. The `head` filter is recorded but not applied,
/// so callers must check labels themselves.
pub struct FakeHosting {
    pub log: CallLog,
    pub pulls: RefCell<Vec<PullRequest>>,
    pub merge_result: Result<MergeOutcome, u16>,
    /// Listing pull requests of this repository name fails with 500.
    pub fail_list_for: Option<String>,
    /// Listings stop after this many matches, like a single API page.
    pub page_size: Option<usize>,
}

impl Default for FakeHosting {
    fn default() -> Self {
        Self {
            log: CallLog::default(),
            pulls: RefCell::new(Vec::new()),
            merge_result: Ok(MergeOutcome::Merged { sha: "merged-sha".into() }),
            fail_list_for: None,
            page_size: None,
        }
    }
}

pub const MUTATING_CALLS: &[&str] = &[
    "create_fork",
    "delete_fork",
    "create_pull_request",
    "update_pull_request",
    "merge_branches",
    "merge_pull_request",
];

impl FakeHosting {
    pub fn with_pulls(pulls: Vec<PullRequest>) -> Self {
        Self {
            pulls: RefCell::new(pulls),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.borrow().clone()
    }

    pub fn mutating_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| MUTATING_CALLS.iter().any(|m| c.starts_with(m)))
            .collect()
    }

    fn record(&self, call: String) {
        self.log.borrow_mut().push(call);
    }

    fn status_error(method: &str, status: u16) -> HostingError {
        HostingError::Status {
            method: method.into(),
            url: "https://api.example.test".into(),
            status,
            message: "fake failure".into(),
        }
    }
}

pub fn pull_request(number: u64, title: &str, head_label: &str) -> PullRequest {
    let branch = head_label.split(':').nth(1).unwrap_or(head_label);
    PullRequest {
        number,
        title: title.into(),
        state: PullRequestState::Open,
        head: PullRequestRef {
            label: head_label.into(),
            ref_name: branch.into(),
            sha: format!("sha-{number}"),
        },
        base: PullRequestRef {
            label: "acme:master".into(),
            ref_name: "master".into(),
            sha: "base-sha".into(),
        },
    }
}

impl HostingPort for FakeHosting {
    fn create_fork(&self, upstream: &RepoSlug) -> Result<(), HostingError> {
        self.record(format!("create_fork {upstream}"));
        Ok(())
    }

    fn delete_fork(&self, upstream: &RepoSlug) -> Result<(), HostingError> {
        self.record(format!("delete_fork {upstream}"));
        Ok(())
    }

    fn list_pull_requests(
        &self,
        upstream: &RepoSlug,
        filter: &PullRequestFilter,
    ) -> Result<Vec<PullRequest>, HostingError> {
        self.record(format!(
            "list_pull_requests {upstream} head={}",
            filter.head.as_deref().unwrap_or("-")
        ));
        if self.fail_list_for.as_deref() == Some(upstream.name.0.as_str()) {
            return Err(Self::status_error("GET", 500));
        }
        Ok(self
            .pulls
            .borrow()
            .iter()
            .filter(|pr| filter.state.map_or(true, |s| pr.state == s))
            .filter(|pr| filter.base.as_deref().map_or(true, |b| pr.base.ref_name == b))
            .filter(|pr| filter.head.as_deref().map_or(true, |h| pr.head.label == h))
            .take(self.page_size.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    fn create_pull_request(
        &self,
        upstream: &RepoSlug,
        request: &NewPullRequest,
    ) -> Result<PullRequest, HostingError> {
        self.record(format!(
            "create_pull_request {upstream} '{}' {} -> {}",
            request.title, request.head, request.base
        ));
        let number = self.pulls.borrow().len() as u64 + 1;
        let pr = pull_request(number, &request.title, &request.head);
        self.pulls.borrow_mut().push(pr.clone());
        Ok(pr)
    }

    fn update_pull_request(
        &self,
        upstream: &RepoSlug,
        number: u64,
        update: &PullRequestUpdate,
    ) -> Result<PullRequest, HostingError> {
        let state = update.state.map(PullRequestState::as_str).unwrap_or("-");
        self.record(format!("update_pull_request {upstream} #{number} state={state}"));
        let mut pulls = self.pulls.borrow_mut();
        let pr = pulls
            .iter_mut()
            .find(|pr| pr.number == number)
            .ok_or_else(|| Self::status_error("PATCH", 404))?;
        if let Some(state) = update.state {
            pr.state = state;
        }
        if let Some(title) = &update.title {
            pr.title = title.clone();
        }
        Ok(pr.clone())
    }

    fn merge_branches(
        &self,
        upstream: &RepoSlug,
        base: &str,
        head: &str,
        message: &str,
    ) -> Result<MergeOutcome, HostingError> {
        self.record(format!("merge_branches {upstream} {head} -> {base} '{message}'"));
        self.merge_result
            .clone()
            .map_err(|status| Self::status_error("POST", status))
    }

    fn merge_pull_request(
        &self,
        upstream: &RepoSlug,
        number: u64,
        message: &str,
        sha: &str,
    ) -> Result<MergeOutcome, HostingError> {
        self.record(format!("merge_pull_request {upstream} #{number} {sha} '{message}'"));
        self.merge_result
            .clone()
            .map_err(|status| Self::status_error("PUT", status))
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Skeleton with a templated CI descriptor and a docs subtree.
pub fn skeleton_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::write(
        root.join(".travis.yml"),
        "language: php\nenv:\n  global:\n    - GITHUB_URL=\"{{ github_url }}\"\n",
    )
    .unwrap();
    fs::write(root.join("CONTRIBUTING.md"), "# Contributing\n").unwrap();
    fs::create_dir_all(root.join("src/Resources/doc")).unwrap();
    fs::write(root.join("src/Resources/doc/index.md"), "# Documentation\n").unwrap();
    dir
}

pub fn settings(mode: RunMode, workspace: &Path, skeleton: &Path) -> RunSettings {
    RunSettings {
        mode,
        clone_root: workspace.join("clones"),
        skeleton_dir: skeleton.to_path_buf(),
        fork_settle_delay: Duration::ZERO,
        pull_request_settle_delay: Duration::ZERO,
        ..RunSettings::default()
    }
}

pub const SINGLE_REPO_CONFIG: &str = r#"
acme:
  options:
    active: true
  repositories:
    lib:
      active: true
      is_project: false
"#;
