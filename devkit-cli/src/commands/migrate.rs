//! `devkit src-migrate`: move package sources under `src/`.

use anyhow::Result;
use clap::Args;

use devkit_sync::{GitCli, GithubClient, UpdateKind};

use super::common::{print_report, RunArgs, WorkingCopyArgs};

#[derive(Args, Debug)]
pub struct SrcMigrateArgs {
    #[command(flatten)]
    pub run: RunArgs,

    #[command(flatten)]
    pub working_copy: WorkingCopyArgs,
}

impl SrcMigrateArgs {
    pub fn run(self) -> Result<()> {
        let fleet = self.run.fleet()?;
        let settings = self.working_copy.apply_to(self.run.settings());
        let skeleton = self.working_copy.skeleton(&settings)?;
        let hosting = GithubClient::from_settings(&settings);

        let report = devkit_sync::dispatch(
            &fleet,
            &settings,
            &GitCli::default(),
            &hosting,
            &skeleton,
            UpdateKind::SourceMigration,
        );
        print_report("src-migrate", &report, self.run.json)
    }
}
