//! Types persisted in `url_dedup.json`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// How a later sharer of a URL is materialized on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    /// Symbolic link pointing at the canonical source.
    #[default]
    Symlink,
    /// Independent physical copy.
    Copy,
    /// Ledger entry only; nothing is written.
    RecordOnly,
}

impl LinkKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LinkKind::Symlink => "symlink",
            LinkKind::Copy => "copy",
            LinkKind::RecordOnly => "record_only",
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "symlink" => Ok(LinkKind::Symlink),
            "copy" => Ok(LinkKind::Copy),
            "record_only" => Ok(LinkKind::RecordOnly),
            other => Err(format!(
                "unknown link kind {other:?} (expected symlink, copy or record_only)"
            )),
        }
    }
}

/// One later sharer of a canonical artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupReference {
    pub file_path: PathBuf,
    pub link_kind: LinkKind,
    pub created_at: u64,
}

/// First successful download of a normalized URL plus everyone sharing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupEntry {
    /// Hex SHA-256 of the normalized URL.
    pub key: String,
    /// URL as first registered.
    pub url: String,
    pub source_file_path: PathBuf,
    pub file_size: u64,
    pub completed_at: u64,
    #[serde(default)]
    pub references: Vec<DedupReference>,
}

impl DedupEntry {
    /// Bytes not downloaded thanks to this entry.
    pub fn space_saved(&self) -> u64 {
        self.file_size
            .saturating_mul(self.references.len() as u64)
    }
}

/// Summary for `dedup-stats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DedupStatistics {
    pub unique_urls: usize,
    pub total_references: usize,
    pub space_saved: u64,
}

/// On-disk layout of `url_dedup.json`. Entries keep first-seen order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct DedupDocument {
    #[serde(default = "default_version")]
    pub version: u8,
    #[serde(default)]
    pub last_updated: Option<u64>,
    #[serde(default)]
    pub entries: Vec<DedupEntry>,
}

fn default_version() -> u8 {
    1
}
