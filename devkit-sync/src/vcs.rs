//! Version-control port used by the update workflow.
//!
//! [`GitCli`](crate::git::GitCli) implements it by shelling out to `git`;
//! tests substitute a recording fake.

use std::path::Path;

use crate::error::VcsError;

/// Creates working copies.
pub trait VersionControlPort {
    type WorkingCopy: WorkingCopy;

    /// Clone `url` into `path`. `path` must not exist yet.
    fn clone_repository(&self, url: &str, path: &Path) -> Result<Self::WorkingCopy, VcsError>;
}

/// A local checkout bound to one repository.
pub trait WorkingCopy {
    fn path(&self) -> &Path;

    fn configure_identity(&mut self, name: &str, email: &str) -> Result<(), VcsError>;

    fn reset_hard(&mut self) -> Result<(), VcsError>;

    fn checkout_new_branch(&mut self, branch: &str) -> Result<(), VcsError>;

    /// Stage every change, deletions included.
    fn stage_all(&mut self) -> Result<(), VcsError>;

    /// Diff of the index against `HEAD`. Empty when nothing is staged.
    fn diff_cached(&self) -> Result<String, VcsError>;

    fn commit(&mut self, message: &str) -> Result<(), VcsError>;

    fn add_remote(&mut self, name: &str, url: &str) -> Result<(), VcsError>;

    /// Push `branch` to `remote` and set it as upstream. `force` overwrites
    /// a diverged remote branch.
    fn push(&mut self, remote: &str, branch: &str, force: bool) -> Result<(), VcsError>;
}
