//! Printing batch reports.

use lecdl_core::scheduler::{BatchReport, Counts, TaskOutcome};

fn counts_line(counts: &Counts) -> String {
    format!(
        "{} total, {} completed, {} deduped, {} skipped, {} failed",
        counts.total, counts.completed, counts.deduped, counts.skipped, counts.failed
    )
}

pub fn print_report(report: &BatchReport) {
    if report.dry_run {
        println!("Dry run: nothing was fetched or recorded.");
        for result in &report.results {
            let action = match &result.outcome {
                TaskOutcome::Completed { .. } => "fetch",
                TaskOutcome::Skipped => "skip",
                TaskOutcome::Deduped { link_kind, .. } => link_kind.as_str(),
                TaskOutcome::Failed { .. } => "fail",
            };
            println!(
                "  {:<11} {} -> {}",
                action,
                result.task.url(),
                result.task.target().display()
            );
        }
    }

    for sheet in &report.sheets {
        println!("[{}] {}", sheet.sheet, counts_line(&sheet.counts));
    }
    println!(
        "Overall: {} in {:.1}s",
        counts_line(&report.totals),
        report.elapsed.as_secs_f64()
    );
    if report.cancelled() {
        println!("Cancelled: {} task(s) not started.", report.not_started);
    }

    if report.has_failures() {
        println!("Failures:");
        for failure in report.failures() {
            println!(
                "  [{} row {} {}] {}",
                failure.provenance.sheet,
                failure.provenance.row_index + 1,
                failure.provenance.column_role,
                failure.identity.url
            );
            println!("      {}", failure.error);
        }
    }
}
