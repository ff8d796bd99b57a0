//! Per-batch knobs resolved from config and CLI flags.

use std::time::Duration;

use crate::config::LecdlConfig;
use crate::dedup::LinkKind;
use crate::retry::RetryPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DedupOptions {
    pub enabled: bool,
    pub mode: LinkKind,
    /// Link kind used when a symlink is refused.
    pub symlink_fallback: LinkKind,
}

impl DedupOptions {
    /// Fallback after a refused symlink. Never another symlink.
    pub fn effective_fallback(&self) -> LinkKind {
        match self.symlink_fallback {
            LinkKind::Symlink => LinkKind::Copy,
            other => other,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Walk the decision sequence without fetching or touching either store.
    pub dry_run: bool,
    /// Ignore completed resume records and fetch again.
    pub overwrite: bool,
    pub dedup: DedupOptions,
    /// Worker-pool width (at least 1).
    pub workers: usize,
    /// Pause after each real Fetcher call.
    pub inter_task_delay: Duration,
    pub retry: RetryPolicy,
}

impl BatchOptions {
    pub fn from_config(cfg: &LecdlConfig) -> Self {
        Self {
            dry_run: false,
            overwrite: false,
            dedup: DedupOptions {
                enabled: cfg.dedup.enabled,
                mode: cfg.dedup.mode,
                symlink_fallback: cfg.dedup.symlink_fallback,
            },
            workers: cfg.workers.max(1),
            inter_task_delay: cfg.inter_task_delay(),
            retry: cfg.retry.to_policy(),
        }
    }
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self::from_config(&LecdlConfig::default())
    }
}
