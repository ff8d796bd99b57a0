//! Re-run only the tasks whose last attempt failed.

use anyhow::Result;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::state_store::DownloadRecord;
use crate::task::DownloadTask;
use crate::url_model::classify_url;

use super::parallel::run_batch;
use super::process::BatchContext;
use super::report::BatchReport;

/// Rebuilds a task from its resume record.
pub fn task_from_record(record: DownloadRecord) -> DownloadTask {
    let url_type = classify_url(&record.identity.url);
    DownloadTask {
        identity: record.identity,
        provenance: record.provenance,
        url_type,
    }
}

/// Resets `failed` records to `pending` and runs them through the full
/// decision sequence. A dry run lists them without resetting.
pub async fn retry_failed(
    ctx: Arc<BatchContext>,
    cancel: Option<Arc<AtomicBool>>,
) -> Result<BatchReport> {
    let records = if ctx.options.dry_run {
        ctx.state.failed_records()
    } else {
        ctx.state.reset_failed()?
    };
    tracing::info!(count = records.len(), "retrying failed downloads");
    let tasks = records.into_iter().map(task_from_record).collect();
    run_batch(ctx, tasks, cancel).await
}
