//! Arguments and output shared by every fleet subcommand.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use devkit_core::{
    compute_bundle_configs,
    config::{self, DEFAULT_CONFIG_PATH},
    settings::{DEFAULT_CLONE_ROOT, DEFAULT_SKELETON_DIR},
    FleetConfig, RunMode, RunSettings,
};
use devkit_sync::{FleetReport, RepoStatus, SkeletonApplier};

/// Flags accepted by every subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Only process these repositories, written `owner::repository`.
    pub bundles: Vec<String>,

    /// Perform remote changes. Without it the run is a dry run.
    #[arg(long)]
    pub apply: bool,

    /// Keep the bot fork after opening the pull request.
    #[arg(long)]
    pub do_not_delete_fork: bool,

    /// Fleet configuration file.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Emit the run report as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Flags for subcommands that clone and mutate working copies.
#[derive(Args, Debug)]
pub struct WorkingCopyArgs {
    /// Skeleton directory mirrored into every working copy.
    #[arg(long, default_value = DEFAULT_SKELETON_DIR)]
    pub skeleton: PathBuf,

    /// Directory receiving the clones.
    #[arg(long, default_value = DEFAULT_CLONE_ROOT)]
    pub clone_root: PathBuf,
}

impl RunArgs {
    /// Load the fleet config, narrowed to the requested bundles.
    pub fn fleet(&self) -> Result<FleetConfig> {
        let selectors = config::parse_selectors(&self.bundles).context("invalid bundle argument")?;
        let full = config::load_at(&self.config)
            .with_context(|| format!("failed to load fleet config {}", self.config.display()))?;
        Ok(compute_bundle_configs(&full, &selectors))
    }

    pub fn settings(&self) -> RunSettings {
        let settings = RunSettings::from_env(RunMode::from_apply_flag(self.apply), self.do_not_delete_fork);
        if !settings.mode.is_apply() {
            tracing::warn!(
                "Dry run: nothing will be pushed, forked, merged or closed. Pass --apply to publish."
            );
        }
        settings
    }
}

impl WorkingCopyArgs {
    pub fn apply_to(&self, mut settings: RunSettings) -> RunSettings {
        settings.skeleton_dir = self.skeleton.clone();
        settings.clone_root = self.clone_root.clone();
        settings
    }

    pub fn skeleton(&self, settings: &RunSettings) -> Result<SkeletonApplier> {
        SkeletonApplier::new(&settings.skeleton_dir).with_context(|| {
            format!(
                "failed to load skeleton from {}",
                settings.skeleton_dir.display()
            )
        })
    }
}

// ---------------------------------------------------------------------------
// Report output
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct FleetReportJson {
    command: &'static str,
    apply: bool,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    failures: usize,
    repositories: Vec<RepoReportJson>,
}

#[derive(Serialize)]
struct RepoReportJson {
    repository: String,
    ok: bool,
    detail: String,
}

#[derive(Tabled)]
struct ReportTableRow {
    #[tabled(rename = "repository")]
    repository: String,
    #[tabled(rename = "status")]
    status: String,
    #[tabled(rename = "detail")]
    detail: String,
}

/// Print the report. Per-repository failures never change the exit status.
pub fn print_report(command: &'static str, report: &FleetReport, json: bool) -> Result<()> {
    if json {
        let payload = FleetReportJson {
            command,
            apply: report.mode.is_apply(),
            started_at: report.started_at,
            finished_at: report.finished_at,
            failures: report.failures(),
            repositories: report
                .repositories
                .iter()
                .map(|r| {
                    let (ok, detail) = match &r.status {
                        RepoStatus::Completed(detail) => (true, detail.clone()),
                        RepoStatus::Failed(detail) => (false, detail.clone()),
                    };
                    RepoReportJson {
                        repository: r.slug.to_string(),
                        ok,
                        detail,
                    }
                })
                .collect(),
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).context("failed to serialize run report")?
        );
        return Ok(());
    }

    if report.repositories.is_empty() {
        println!("No active repository selected.");
        return Ok(());
    }

    let rows: Vec<ReportTableRow> = report
        .repositories
        .iter()
        .map(|r| match &r.status {
            RepoStatus::Completed(detail) => ReportTableRow {
                repository: r.slug.to_string(),
                status: "ok".green().to_string(),
                detail: detail.clone(),
            },
            RepoStatus::Failed(detail) => ReportTableRow {
                repository: r.slug.to_string(),
                status: "failed".red().bold().to_string(),
                detail: detail.clone(),
            },
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    let elapsed = report
        .finished_at
        .map(|end| end - report.started_at)
        .unwrap_or_else(chrono::Duration::zero);
    println!(
        "devkit {command} | {} repositories | {} failed | {}.{:03}s",
        report.repositories.len(),
        report.failures(),
        elapsed.num_seconds(),
        elapsed.num_milliseconds() % 1000,
    );
    Ok(())
}
