//! Types used by the resume state store.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::naming::ColumnRole;

/// Natural key for resume tracking: one remote URL written to one target stem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DownloadIdentity {
    pub url: String,
    /// Extension-less target path produced by the filename policy.
    pub target_file_path: PathBuf,
}

impl DownloadIdentity {
    pub fn new(url: impl Into<String>, target_file_path: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            target_file_path: target_file_path.into(),
        }
    }
}

/// Lifecycle state stored per identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl DownloadStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DownloadStatus::Pending => "pending",
            DownloadStatus::InProgress => "in_progress",
            DownloadStatus::Completed => "completed",
            DownloadStatus::Failed => "failed",
        }
    }
}

/// Where a task came from, kept for diagnostics and retry-failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub sheet: String,
    pub row_index: usize,
    pub column_role: ColumnRole,
}

/// One persisted record per `DownloadIdentity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRecord {
    pub identity: DownloadIdentity,
    pub status: DownloadStatus,
    /// Artifact actually written (stem plus extension, a link, or the
    /// canonical source for record-only dedup). Set when completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_file_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub provenance: Provenance,
    pub updated_at: u64,
}

/// Record counts by status (CLI `status`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateStatistics {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub failed: usize,
}

/// On-disk layout of `download_db.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct StateDocument {
    #[serde(default = "default_version")]
    pub version: u8,
    #[serde(default)]
    pub last_updated: Option<u64>,
    #[serde(default)]
    pub records: Vec<DownloadRecord>,
}

fn default_version() -> u8 {
    1
}
