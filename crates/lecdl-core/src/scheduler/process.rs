//! Per-task decision sequence: skip, dedup, or fetch.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::config::LecdlConfig;
use crate::dedup::{
    create_symlink, materialize_with, DedupEntry, DedupError, DedupIndex, KeyLocks, LinkKind,
    SymlinkFn,
};
use crate::fetcher::{FetchRequest, Fetcher};
use crate::fs_util;
use crate::naming;
use crate::retry::run_with_retry;
use crate::state_store::StateStore;
use crate::task::DownloadTask;
use crate::url_model::dedup_key;

use super::options::BatchOptions;
use super::outcome::TaskOutcome;

/// Everything a worker needs: both stores, the fetcher, and batch options.
pub struct BatchContext {
    pub state: StateStore,
    pub dedup: DedupIndex,
    pub fetcher: Box<dyn Fetcher>,
    pub options: BatchOptions,
    inflight: KeyLocks,
    symlinker: SymlinkFn,
    /// Dry run only: dedup key -> stem of the first task that would fetch it.
    planned: Mutex<HashMap<String, PathBuf>>,
}

impl BatchContext {
    pub fn new(
        state: StateStore,
        dedup: DedupIndex,
        fetcher: Box<dyn Fetcher>,
        options: BatchOptions,
    ) -> Self {
        Self {
            state,
            dedup,
            fetcher,
            options,
            inflight: KeyLocks::new(),
            symlinker: create_symlink,
            planned: Mutex::new(HashMap::new()),
        }
    }

    /// Replaces the call used to create dedup symlinks.
    pub fn with_symlinker(mut self, symlinker: SymlinkFn) -> Self {
        self.symlinker = symlinker;
        self
    }

    /// Opens both stores under the configured state directory. Outside a dry
    /// run the output root is created first; failing that aborts the batch.
    pub fn open(cfg: &LecdlConfig, fetcher: Box<dyn Fetcher>, options: BatchOptions) -> Result<Self> {
        let state_dir = cfg.state_dir();
        if !options.dry_run {
            std::fs::create_dir_all(&cfg.download_dir).with_context(|| {
                format!("create output root: {}", cfg.download_dir.display())
            })?;
            std::fs::create_dir_all(&state_dir)
                .with_context(|| format!("create state dir: {}", state_dir.display()))?;
        }
        let state = StateStore::open_in(&state_dir)?;
        let dedup = DedupIndex::open_in(&state_dir)?;
        Ok(Self::new(state, dedup, fetcher, options))
    }
}

/// Runs the decision sequence for one task. Never returns an error: every
/// problem becomes `TaskOutcome::Failed`.
pub fn process_task(ctx: &BatchContext, task: &DownloadTask) -> TaskOutcome {
    let (outcome, fetched) = {
        // Held across lookup, fetch and register so two tasks whose URLs
        // normalize identically cannot both fetch.
        let key = dedup_key(task.url());
        let _claim = ctx.inflight.acquire(&key);
        decide(ctx, task, &key)
    };
    log_outcome(task, &outcome, ctx.options.dry_run);
    let delay = ctx.options.inter_task_delay;
    if fetched && !delay.is_zero() {
        std::thread::sleep(delay);
    }
    outcome
}

fn decide(ctx: &BatchContext, task: &DownloadTask, key: &str) -> (TaskOutcome, bool) {
    let opts = &ctx.options;

    if !opts.overwrite && ctx.state.is_completed(&task.identity) {
        return (TaskOutcome::Skipped, false);
    }

    let mut has_entry = false;
    if opts.dedup.enabled {
        let found = if opts.dry_run {
            Ok(ctx.dedup.probe(task.url()))
        } else {
            ctx.dedup.lookup(task.url())
        };
        match found {
            Err(e) => return (fail(ctx, task, e.to_string()), false),
            Ok(None) => {}
            Ok(Some(entry)) => {
                has_entry = true;
                if !fs_util::belongs_to_stem(&entry.source_file_path, task.target()) {
                    return (reuse(ctx, task, &entry), false);
                }
                if !opts.overwrite {
                    // Our own earlier download; only the resume record is missing.
                    return (adopt(ctx, task, &entry), false);
                }
            }
        }
    }

    if opts.dry_run {
        if opts.dedup.enabled && !has_entry {
            if let Some(outcome) = plan_shared(ctx, task, key) {
                return (outcome, false);
            }
        }
        let would = TaskOutcome::Completed {
            path: task.target().to_path_buf(),
            file_size: 0,
        };
        return (would, false);
    }
    (fetch(ctx, task, has_entry), true)
}

/// Dry-run stand-in for the index entry a real run would have registered
/// earlier in this batch. The first task to reach a key claims it.
fn plan_shared(ctx: &BatchContext, task: &DownloadTask, key: &str) -> Option<TaskOutcome> {
    let mut planned = ctx.planned.lock().unwrap_or_else(PoisonError::into_inner);
    let Some(first) = planned.get(key).cloned() else {
        planned.insert(key.to_string(), task.target().to_path_buf());
        return None;
    };
    if first == task.target() {
        return (!ctx.options.overwrite).then_some(TaskOutcome::Skipped);
    }
    Some(TaskOutcome::Deduped {
        link_path: link_path_for(&first, task.target()),
        source: first,
        link_kind: ctx.options.dedup.mode,
    })
}

/// Path a sharer gets: its own stem plus the canonical artifact's suffix.
fn link_path_for(source: &Path, stem: &Path) -> PathBuf {
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    fs_util::with_suffix(stem, &naming::artifact_suffix(&name))
}

fn adopt(ctx: &BatchContext, task: &DownloadTask, entry: &DedupEntry) -> TaskOutcome {
    if ctx.options.dry_run {
        return TaskOutcome::Skipped;
    }
    match ctx.state.mark_completed(
        &task.identity,
        &task.provenance,
        &entry.source_file_path,
        entry.file_size,
    ) {
        Ok(()) => TaskOutcome::Skipped,
        Err(e) => fail(ctx, task, format!("{e:#}")),
    }
}

fn reuse(ctx: &BatchContext, task: &DownloadTask, entry: &DedupEntry) -> TaskOutcome {
    let source = entry.source_file_path.clone();
    let link_path = link_path_for(&source, task.target());
    if ctx.options.dry_run {
        return TaskOutcome::Deduped {
            source,
            link_path,
            link_kind: ctx.options.dedup.mode,
        };
    }

    let link_kind = match materialize(ctx, &source, &link_path) {
        Ok(kind) => kind,
        Err(e) => return fail(ctx, task, e.to_string()),
    };
    if let Err(e) = ctx.dedup.attach_reference(task.url(), &link_path, link_kind) {
        return fail(ctx, task, e.to_string());
    }
    let resolved = if link_kind == LinkKind::RecordOnly {
        &source
    } else {
        &link_path
    };
    if let Err(e) = ctx
        .state
        .mark_completed(&task.identity, &task.provenance, resolved, entry.file_size)
    {
        return fail(ctx, task, format!("{e:#}"));
    }
    TaskOutcome::Deduped {
        source,
        link_path,
        link_kind,
    }
}

/// Materializes with the configured kind, downgrading a refused symlink.
fn materialize(ctx: &BatchContext, source: &Path, link: &Path) -> Result<LinkKind, DedupError> {
    let mode = ctx.options.dedup.mode;
    match materialize_with(source, link, mode, ctx.symlinker) {
        Ok(()) => Ok(mode),
        Err(e) if e.is_link_creation() => {
            let fallback = ctx.options.dedup.effective_fallback();
            tracing::warn!(
                path = %link.display(),
                fallback = %fallback,
                "{}; falling back",
                e
            );
            materialize_with(source, link, fallback, ctx.symlinker)?;
            Ok(fallback)
        }
        Err(e) => Err(e),
    }
}

fn fetch(ctx: &BatchContext, task: &DownloadTask, has_entry: bool) -> TaskOutcome {
    if let Err(e) = ctx.state.mark_in_progress(&task.identity, &task.provenance) {
        return fail(ctx, task, format!("{e:#}"));
    }

    let request = FetchRequest {
        url: task.url(),
        url_type: task.url_type,
        stem: task.target(),
    };
    let fetched = run_with_retry(&ctx.options.retry, |attempt| {
        tracing::debug!(url = task.url(), attempt, "fetching");
        ctx.fetcher.fetch(&request)
    });

    let artifact = match fetched {
        Ok(a) => a,
        Err(e) => return fail(ctx, task, e.to_string()),
    };
    if let Err(e) = ctx.state.mark_completed(
        &task.identity,
        &task.provenance,
        &artifact.path,
        artifact.file_size,
    ) {
        return fail(ctx, task, format!("{e:#}"));
    }
    if ctx.options.dedup.enabled && !has_entry {
        if let Err(e) = ctx
            .dedup
            .register(task.url(), &artifact.path, artifact.file_size)
        {
            tracing::warn!(url = task.url(), "could not register canonical source: {}", e);
        }
    }
    TaskOutcome::Completed {
        path: artifact.path,
        file_size: artifact.file_size,
    }
}

fn fail(ctx: &BatchContext, task: &DownloadTask, error: String) -> TaskOutcome {
    if !ctx.options.dry_run {
        if let Err(e) = ctx
            .state
            .mark_failed(&task.identity, &task.provenance, &error)
        {
            tracing::error!(url = task.url(), "could not record failure: {:#}", e);
        }
    }
    TaskOutcome::Failed { error }
}

fn log_outcome(task: &DownloadTask, outcome: &TaskOutcome, dry_run: bool) {
    let sheet = task.provenance.sheet.as_str();
    let row = task.provenance.row_index;
    let path = task.target().display();
    match outcome {
        TaskOutcome::Skipped => {
            tracing::info!(sheet, row, url = task.url(), %path, "skipped: already completed")
        }
        TaskOutcome::Deduped {
            source, link_kind, ..
        } => tracing::info!(
            sheet,
            row,
            url = task.url(),
            %path,
            source = %source.display(),
            link_kind = %link_kind,
            dry_run,
            "deduped"
        ),
        TaskOutcome::Completed { path: out, file_size } => tracing::info!(
            sheet,
            row,
            url = task.url(),
            path = %out.display(),
            file_size,
            dry_run,
            "completed"
        ),
        TaskOutcome::Failed { error } => {
            tracing::warn!(sheet, row, url = task.url(), %path, "failed: {}", error)
        }
    }
}
