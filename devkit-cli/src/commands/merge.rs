//! `devkit pr-auto-merge` and `devkit auto-merge`.

use anyhow::Result;
use clap::Args;

use devkit_sync::GithubClient;

use super::common::{print_report, RunArgs};

/// Merge the open DevKit pull request of each repository.
#[derive(Args, Debug)]
pub struct PrAutoMergeArgs {
    #[command(flatten)]
    pub run: RunArgs,
}

impl PrAutoMergeArgs {
    pub fn run(self) -> Result<()> {
        let fleet = self.run.fleet()?;
        let settings = self.run.settings();
        let hosting = GithubClient::from_settings(&settings);

        let report = devkit_sync::auto_merge(&fleet, &settings, &hosting);
        print_report("pr-auto-merge", &report, self.run.json)
    }
}

/// Merge `update-branch` into the base branch without a pull request.
#[derive(Args, Debug)]
pub struct AutoMergeArgs {
    #[command(flatten)]
    pub run: RunArgs,
}

impl AutoMergeArgs {
    pub fn run(self) -> Result<()> {
        let fleet = self.run.fleet()?;
        let settings = self.run.settings();
        let hosting = GithubClient::from_settings(&settings);

        let report = devkit_sync::auto_merge_branches(&fleet, &settings, &hosting);
        print_report("auto-merge", &report, self.run.json)
    }
}
