//! `lecdl run` – download everything a workbook lists.

use anyhow::Result;
use lecdl_core::config::LecdlConfig;
use lecdl_core::fetcher::CommandFetcher;
use lecdl_core::scheduler::{self, BatchContext, BatchOptions};
use lecdl_core::task::{TaskGenerator, Workbook};
use std::path::PathBuf;
use std::sync::Arc;

use super::cancel_on_ctrl_c;
use super::report::print_report;

/// Per-invocation options of `lecdl run` that are not config overrides.
#[derive(Debug, Clone)]
pub struct DownloadArgs {
    pub workbook: PathBuf,
    pub sheets: Vec<String>,
    pub dry_run: bool,
    pub overwrite: bool,
}

pub async fn run_download(cfg: &LecdlConfig, args: &DownloadArgs) -> Result<()> {
    let workbook = Workbook::load_json(&args.workbook)?;
    let tasks = TaskGenerator::from_config(cfg).generate(&workbook, &args.sheets)?;
    if tasks.is_empty() {
        println!("No downloadable links found.");
        return Ok(());
    }

    let mut options = BatchOptions::from_config(cfg);
    options.dry_run = args.dry_run;
    options.overwrite = args.overwrite;
    let fetcher = CommandFetcher::from_config(&cfg.fetcher);
    let ctx = Arc::new(BatchContext::open(cfg, Box::new(fetcher), options)?);

    let report = scheduler::run_batch(ctx, tasks, Some(cancel_on_ctrl_c())).await?;
    print_report(&report);
    if report.has_failures() {
        anyhow::bail!(
            "{} download(s) failed; run `lecdl retry-failed` to try them again",
            report.totals.failed
        );
    }
    Ok(())
}
