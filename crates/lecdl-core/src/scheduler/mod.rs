//! Orchestrator.
//!
//! For each task: skip if the resume store says it is done, reuse an earlier
//! download of the same normalized URL if the dedup index has one, otherwise
//! fetch (with retry on transient errors) and record the result in both
//! stores. Tasks run on a bounded worker pool.

mod options;
mod outcome;
mod parallel;
mod process;
mod report;
mod retry_failed;

pub use options::{BatchOptions, DedupOptions};
pub use outcome::{OutcomeKind, TaskOutcome, TaskResult};
pub use parallel::run_batch;
pub use process::{process_task, BatchContext};
pub use report::{format_size, BatchReport, Counts, Failure, SheetReport};
pub use retry_failed::{retry_failed, task_from_record};
