//! `devkit pr-auto-close`: close open DevKit pull requests.

use anyhow::Result;
use clap::Args;

use devkit_sync::GithubClient;

use super::common::{print_report, RunArgs};

#[derive(Args, Debug)]
pub struct PrAutoCloseArgs {
    #[command(flatten)]
    pub run: RunArgs,
}

impl PrAutoCloseArgs {
    pub fn run(self) -> Result<()> {
        let fleet = self.run.fleet()?;
        let settings = self.run.settings();
        let hosting = GithubClient::from_settings(&settings);

        let report = devkit_sync::auto_close(&fleet, &settings, &hosting);
        print_report("pr-auto-close", &report, self.run.json)
    }
}
