//! Naming conventions that identify tool-owned branches, commits and pull
//! requests on the host.

use crate::types::RepositoryName;

/// Bot account that owns forks and opens pull requests.
pub const BOT_USER: &str = "BlastCI";
/// Committer e-mail configured in every working copy.
pub const BOT_EMAIL: &str = "r.et.d@libre-informatique.fr";
/// Branch created in every working copy and pushed to the bot fork.
pub const DEVKIT_BRANCH: &str = "update-branch";
/// Base branch pull requests target and merges land on.
pub const DEFAULT_BASE_BRANCH: &str = "master";
/// Commit message for skeleton updates.
pub const COMMIT_MESSAGE: &str = "DevKit updates";
/// Substring every managed pull request title contains.
pub const MANAGED_TITLE_MARKER: &str = "DevKit updates";

/// `DevKit updates for <repo>`.
pub fn pull_request_title(repository: &RepositoryName) -> String {
    format!("{MANAGED_TITLE_MARKER} for {repository}")
}

/// Head label of the managed branch on the bot fork, e.g. `BlastCI:update-branch`.
pub fn head_label(bot_user: &str) -> String {
    format!("{bot_user}:{DEVKIT_BRANCH}")
}

/// `Merge <head> into <base>`.
pub fn merge_message(head: &str, base: &str) -> String {
    format!("Merge {head} into {base}")
}

/// True when `title` carries the managed marker.
pub fn is_managed_title(title: &str) -> bool {
    title.contains(MANAGED_TITLE_MARKER)
}
