//! CLI for lecdl.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use lecdl_core::config::{self, ConfigOverrides, LecdlConfig};
use lecdl_core::dedup::LinkKind;
use std::path::PathBuf;

use commands::{
    run_dedup_stats, run_download, run_reset, run_retry_failed, run_status, run_tasks,
    DownloadArgs,
};

/// Top-level CLI for lecdl.
#[derive(Debug, Parser)]
#[command(name = "lecdl")]
#[command(
    about = "lecdl: bulk download of lecture videos and documents listed in a workbook",
    long_about = None
)]
pub struct Cli {
    /// Config file to use instead of ~/.config/lecdl/config.toml. Must exist.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output root for downloaded files (overrides `download_dir`).
    #[arg(long, global = true, value_name = "DIR")]
    pub download_dir: Option<PathBuf>,

    /// Directory holding download_db.json and url_dedup.json.
    #[arg(long, global = true, value_name = "DIR")]
    pub state_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download everything listed in a workbook, skipping finished work.
    Run {
        /// Workbook JSON exported from the lecture spreadsheet.
        workbook: PathBuf,

        /// Only process this sheet (repeatable). Default: every sheet.
        #[arg(long = "sheet", value_name = "NAME")]
        sheets: Vec<String>,

        /// Walk the decision path and report, without fetching or writing state.
        #[arg(long)]
        dry_run: bool,

        /// Fetch again even if the resume state says a task is done.
        #[arg(long)]
        overwrite: bool,

        /// Do not consult or update the dedup index.
        #[arg(long)]
        no_dedup: bool,

        /// How duplicates are materialized: symlink, copy, or record-only.
        #[arg(long, value_name = "MODE")]
        dedup_mode: Option<LinkKind>,

        /// Run up to N tasks concurrently (default from config).
        #[arg(long, value_name = "N")]
        jobs: Option<usize>,
    },

    /// Show resume record counts by status and list failures.
    Status,

    /// Clear every resume record. Downloaded files and the dedup index are kept.
    Reset,

    /// Re-run only the tasks whose last attempt failed.
    RetryFailed {
        /// List what would be retried without fetching or writing state.
        #[arg(long)]
        dry_run: bool,

        /// Run up to N tasks concurrently (default from config).
        #[arg(long, value_name = "N")]
        jobs: Option<usize>,
    },

    /// Show dedup savings and the most shared URLs.
    DedupStats {
        /// How many of the most-referenced URLs to list.
        #[arg(long, default_value = "5", value_name = "N")]
        top: usize,
    },

    /// Print the tasks a workbook expands to, without touching state.
    Tasks {
        /// Workbook JSON exported from the lecture spreadsheet.
        workbook: PathBuf,

        /// Only list this sheet (repeatable).
        #[arg(long = "sheet", value_name = "NAME")]
        sheets: Vec<String>,
    },
}

impl Cli {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let overrides = cli.overrides();
        let cfg = cli.load_config(&overrides)?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Run {
                workbook,
                sheets,
                dry_run,
                overwrite,
                ..
            } => {
                let args = DownloadArgs {
                    workbook,
                    sheets,
                    dry_run,
                    overwrite,
                };
                run_download(&cfg, &args).await?;
            }
            CliCommand::Status => run_status(&cfg)?,
            CliCommand::Reset => run_reset(&cfg)?,
            CliCommand::RetryFailed { dry_run, .. } => run_retry_failed(&cfg, dry_run).await?,
            CliCommand::DedupStats { top } => run_dedup_stats(&cfg, top)?,
            CliCommand::Tasks { workbook, sheets } => run_tasks(&cfg, &workbook, &sheets)?,
        }

        Ok(())
    }

    /// Flags that override config values for this invocation.
    pub fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides {
            download_dir: self.download_dir.clone(),
            state_dir: self.state_dir.clone(),
            ..Default::default()
        };
        match &self.command {
            CliCommand::Run {
                no_dedup,
                dedup_mode,
                jobs,
                ..
            } => {
                overrides.no_dedup = *no_dedup;
                overrides.dedup_mode = *dedup_mode;
                overrides.workers = *jobs;
            }
            CliCommand::RetryFailed { jobs, .. } => overrides.workers = *jobs,
            _ => {}
        }
        overrides
    }

    fn load_config(&self, overrides: &ConfigOverrides) -> Result<LecdlConfig> {
        let mut cfg = match &self.config {
            Some(path) => config::load_from_path(path)?,
            None => config::load_or_init()?,
        };
        cfg.apply(overrides);
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests;
