//! `lecdl retry-failed` – re-run only failed tasks.

use anyhow::Result;
use lecdl_core::config::LecdlConfig;
use lecdl_core::fetcher::CommandFetcher;
use lecdl_core::scheduler::{self, BatchContext, BatchOptions};
use std::sync::Arc;

use super::cancel_on_ctrl_c;
use super::report::print_report;

pub async fn run_retry_failed(cfg: &LecdlConfig, dry_run: bool) -> Result<()> {
    let mut options = BatchOptions::from_config(cfg);
    options.dry_run = dry_run;
    let fetcher = CommandFetcher::from_config(&cfg.fetcher);
    let ctx = Arc::new(BatchContext::open(cfg, Box::new(fetcher), options)?);

    if ctx.state.statistics().failed == 0 {
        println!("No failed downloads.");
        return Ok(());
    }

    let report = scheduler::retry_failed(ctx, Some(cancel_on_ctrl_c())).await?;
    print_report(&report);
    if report.has_failures() {
        anyhow::bail!("{} download(s) still failing", report.totals.failed);
    }
    Ok(())
}
