//! Run a batch of tasks on a bounded worker pool.
//!
//! Keeps up to `workers` tasks in flight at once; when one finishes, the next
//! queued task is started until the queue is empty or the batch is cancelled.

use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::task::DownloadTask;

use super::outcome::{TaskOutcome, TaskResult};
use super::process::{process_task, BatchContext};
use super::report::BatchReport;

fn is_cancelled(cancel: &Option<Arc<AtomicBool>>) -> bool {
    cancel
        .as_ref()
        .map(|t| t.load(Ordering::Relaxed))
        .unwrap_or(false)
}

/// Runs `tasks` with up to `ctx.options.workers` in flight. Each task's
/// decision sequence runs on a blocking thread.
///
/// Before dispatch (outside a dry run), records left `in_progress` by an
/// interrupted run are reset and every task gets a `pending` record. Failing
/// to persist either aborts the batch. Once `cancel` is set no new task is
/// started; in-flight tasks finish and the rest are counted as not started.
pub async fn run_batch(
    ctx: Arc<BatchContext>,
    tasks: Vec<DownloadTask>,
    cancel: Option<Arc<AtomicBool>>,
) -> Result<BatchReport> {
    let started = Instant::now();
    let workers = ctx.options.workers.max(1);
    let dry_run = ctx.options.dry_run;

    if !dry_run {
        let recovered = ctx.state.recover_in_progress()?;
        if recovered > 0 {
            tracing::info!(recovered, "reset interrupted downloads to pending");
        }
        ctx.state
            .ensure_pending(tasks.iter().map(|t| (&t.identity, &t.provenance)))?;
    }

    tracing::info!(tasks = tasks.len(), workers, dry_run, "starting batch");

    let total = tasks.len();
    let mut outcomes: Vec<Option<TaskOutcome>> = vec![None; total];
    let mut next = 0usize;
    let mut join_set = tokio::task::JoinSet::new();

    loop {
        while join_set.len() < workers && next < total {
            if is_cancelled(&cancel) {
                break;
            }
            let idx = next;
            next += 1;
            let ctx = Arc::clone(&ctx);
            let task = tasks[idx].clone();
            join_set.spawn_blocking(move || (idx, process_task(&ctx, &task)));
        }

        if join_set.is_empty() {
            break;
        }

        let Some(res) = join_set.join_next().await else {
            break;
        };
        let (idx, outcome) = res.map_err(|e| anyhow::anyhow!("task join: {}", e))?;
        outcomes[idx] = Some(outcome);
    }

    let not_started = total - next;
    if not_started > 0 {
        tracing::warn!(not_started, "batch cancelled");
    }

    let results = tasks
        .into_iter()
        .zip(outcomes)
        .filter_map(|(task, outcome)| outcome.map(|outcome| TaskResult { task, outcome }))
        .collect();
    let report = BatchReport::new(results, started.elapsed(), dry_run, not_started);
    tracing::info!(
        completed = report.totals.completed,
        skipped = report.totals.skipped,
        deduped = report.totals.deduped,
        failed = report.totals.failed,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "batch finished"
    );
    Ok(report)
}
