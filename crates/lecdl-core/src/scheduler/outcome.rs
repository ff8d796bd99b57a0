use std::path::PathBuf;

use crate::dedup::LinkKind;
use crate::task::DownloadTask;

/// How one task resolved. Every task ends in exactly one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Fetched now (or, in a dry run, would be fetched).
    Completed { path: PathBuf, file_size: u64 },
    /// Already on disk; no Fetcher call.
    Skipped,
    /// Reused an earlier download of the same normalized URL.
    Deduped {
        source: PathBuf,
        link_path: PathBuf,
        link_kind: LinkKind,
    },
    Failed { error: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    Completed,
    Skipped,
    Deduped,
    Failed,
}

impl OutcomeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OutcomeKind::Completed => "completed",
            OutcomeKind::Skipped => "skipped",
            OutcomeKind::Deduped => "deduped",
            OutcomeKind::Failed => "failed",
        }
    }
}

impl TaskOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            TaskOutcome::Completed { .. } => OutcomeKind::Completed,
            TaskOutcome::Skipped => OutcomeKind::Skipped,
            TaskOutcome::Deduped { .. } => OutcomeKind::Deduped,
            TaskOutcome::Failed { .. } => OutcomeKind::Failed,
        }
    }
}

/// A task paired with its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskResult {
    pub task: DownloadTask,
    pub outcome: TaskOutcome,
}
