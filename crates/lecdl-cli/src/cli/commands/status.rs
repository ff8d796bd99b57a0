//! `lecdl status` – resume record counts and failures.

use anyhow::Result;
use lecdl_core::config::LecdlConfig;
use lecdl_core::state_store::{DownloadStatus, StateStore};

pub fn run_status(cfg: &LecdlConfig) -> Result<()> {
    let store = StateStore::open_in(&cfg.state_dir())?;
    let stats = store.statistics();

    println!("State: {}", store.path().display());
    println!("{:<12} {}", DownloadStatus::Pending.as_str(), stats.pending);
    println!("{:<12} {}", DownloadStatus::InProgress.as_str(), stats.in_progress);
    println!("{:<12} {}", DownloadStatus::Completed.as_str(), stats.completed);
    println!("{:<12} {}", DownloadStatus::Failed.as_str(), stats.failed);
    println!("{:<12} {}", "total", stats.total);

    let failed = store.failed_records();
    if !failed.is_empty() {
        println!();
        println!("Failed:");
        for record in failed {
            println!(
                "  [{} row {}] {}",
                record.provenance.sheet,
                record.provenance.row_index + 1,
                record.identity.url
            );
            if let Some(error) = record.error {
                println!("      {}", error);
            }
        }
    }
    Ok(())
}
