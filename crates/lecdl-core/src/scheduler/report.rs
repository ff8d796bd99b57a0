//! Per-sheet and whole-batch summaries.

use std::time::Duration;

use crate::state_store::{DownloadIdentity, Provenance};

use super::outcome::{OutcomeKind, TaskOutcome, TaskResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub total: usize,
    pub completed: usize,
    pub skipped: usize,
    pub deduped: usize,
    pub failed: usize,
}

impl Counts {
    fn add(&mut self, kind: OutcomeKind) {
        self.total += 1;
        match kind {
            OutcomeKind::Completed => self.completed += 1,
            OutcomeKind::Skipped => self.skipped += 1,
            OutcomeKind::Deduped => self.deduped += 1,
            OutcomeKind::Failed => self.failed += 1,
        }
    }
}

/// A failed task with its error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub identity: DownloadIdentity,
    pub provenance: Provenance,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetReport {
    pub sheet: String,
    pub counts: Counts,
    pub failures: Vec<Failure>,
}

#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Sheets in the order their first task appeared.
    pub sheets: Vec<SheetReport>,
    /// Finished tasks in generation order.
    pub results: Vec<TaskResult>,
    pub totals: Counts,
    pub elapsed: Duration,
    pub dry_run: bool,
    /// Tasks never started because the batch was cancelled.
    pub not_started: usize,
}

impl BatchReport {
    pub fn new(
        results: Vec<TaskResult>,
        elapsed: Duration,
        dry_run: bool,
        not_started: usize,
    ) -> Self {
        let mut sheets: Vec<SheetReport> = Vec::new();
        let mut totals = Counts::default();
        for result in &results {
            let kind = result.outcome.kind();
            totals.add(kind);
            let name = &result.task.provenance.sheet;
            let pos = match sheets.iter().position(|s| &s.sheet == name) {
                Some(i) => i,
                None => {
                    sheets.push(SheetReport {
                        sheet: name.clone(),
                        counts: Counts::default(),
                        failures: Vec::new(),
                    });
                    sheets.len() - 1
                }
            };
            let sheet = &mut sheets[pos];
            sheet.counts.add(kind);
            if let TaskOutcome::Failed { error } = &result.outcome {
                sheet.failures.push(Failure {
                    identity: result.task.identity.clone(),
                    provenance: result.task.provenance.clone(),
                    error: error.clone(),
                });
            }
        }
        Self {
            sheets,
            results,
            totals,
            elapsed,
            dry_run,
            not_started,
        }
    }

    pub fn cancelled(&self) -> bool {
        self.not_started > 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &Failure> {
        self.sheets.iter().flat_map(|s| s.failures.iter())
    }

    pub fn has_failures(&self) -> bool {
        self.totals.failed > 0
    }
}

/// Human-readable byte count (`1.5 MB`).
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;
    const TB: f64 = GB * 1024.0;
    let value = bytes as f64;
    if value >= TB {
        format!("{:.1} TB", value / TB)
    } else if value >= GB {
        format!("{:.1} GB", value / GB)
    } else if value >= MB {
        format!("{:.1} MB", value / MB)
    } else if value >= KB {
        format!("{:.1} KB", value / KB)
    } else {
        format!("{bytes} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::ColumnRole;
    use crate::task::DownloadTask;
    use crate::url_model::UrlType;

    fn result(sheet: &str, row: usize, outcome: TaskOutcome) -> TaskResult {
        TaskResult {
            task: DownloadTask {
                identity: DownloadIdentity::new(format!("https://youtu.be/{row}"), format!("/o/{row}")),
                provenance: Provenance {
                    sheet: sheet.to_string(),
                    row_index: row,
                    column_role: ColumnRole::ViewLink,
                },
                url_type: UrlType::Youtube,
            },
            outcome,
        }
    }

    #[test]
    fn counts_per_sheet_and_overall() {
        let report = BatchReport::new(
            vec![
                result("A", 0, TaskOutcome::Skipped),
                result("B", 0, TaskOutcome::Failed { error: "boom".into() }),
                result(
                    "A",
                    1,
                    TaskOutcome::Completed {
                        path: "/o/1.srt".into(),
                        file_size: 3,
                    },
                ),
            ],
            Duration::from_secs(1),
            false,
            0,
        );
        assert_eq!(report.sheets.len(), 2);
        assert_eq!(report.sheets[0].sheet, "A");
        assert_eq!(report.sheets[0].counts.total, 2);
        assert_eq!(report.sheets[0].counts.skipped, 1);
        assert_eq!(report.sheets[0].counts.completed, 1);
        assert_eq!(report.sheets[1].counts.failed, 1);
        assert_eq!(report.totals.total, 3);
        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].error, "boom");
        assert!(report.has_failures());
        assert!(!report.cancelled());
    }

    #[test]
    fn sizes_are_human_readable() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.0 GB");
    }
}
