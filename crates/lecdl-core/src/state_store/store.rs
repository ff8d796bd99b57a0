//! JSON-backed resume store.

use anyhow::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockWriteGuard};

use crate::fs_util;
use crate::persist::{self, unix_timestamp};

use super::types::{
    DownloadIdentity, DownloadRecord, DownloadStatus, Provenance, StateDocument, StateStatistics,
};

/// File name of the resume document inside the state directory.
pub const STATE_FILE_NAME: &str = "download_db.json";

#[derive(Debug, Default)]
struct Inner {
    records: Vec<DownloadRecord>,
    index: HashMap<DownloadIdentity, usize>,
}

impl Inner {
    fn from_records(records: Vec<DownloadRecord>) -> Self {
        let mut inner = Inner::default();
        for record in records {
            let existing = inner.index.get(&record.identity).copied();
            match existing {
                // Later duplicates of an identity replace the earlier entry in place.
                Some(i) => inner.records[i] = record,
                None => {
                    inner
                        .index
                        .insert(record.identity.clone(), inner.records.len());
                    inner.records.push(record);
                }
            }
        }
        inner
    }

    fn get(&self, identity: &DownloadIdentity) -> Option<&DownloadRecord> {
        self.index.get(identity).map(|&i| &self.records[i])
    }

    /// Returns the record for `identity`, creating a pending one if absent.
    fn upsert(&mut self, identity: &DownloadIdentity, provenance: &Provenance) -> &mut DownloadRecord {
        let existing = self.index.get(identity).copied();
        let idx = match existing {
            Some(i) => i,
            None => {
                let i = self.records.len();
                self.records.push(DownloadRecord {
                    identity: identity.clone(),
                    status: DownloadStatus::Pending,
                    resolved_file_path: None,
                    file_size: None,
                    completed_at: None,
                    error: None,
                    provenance: provenance.clone(),
                    updated_at: unix_timestamp(),
                });
                self.index.insert(identity.clone(), i);
                i
            }
        };
        let record = &mut self.records[idx];
        record.provenance = provenance.clone();
        record.updated_at = unix_timestamp();
        record
    }
}

/// Durable mapping from `DownloadIdentity` to its `DownloadRecord`.
///
/// Every mutation holds the write lock across "change in memory → persist
/// whole document atomically", so concurrent workers never interleave
/// partial updates and readers never see a torn file.
#[derive(Debug)]
pub struct StateStore {
    path: PathBuf,
    inner: RwLock<Inner>,
}

impl StateStore {
    /// Opens the store at `path`. A missing file is an empty store; a corrupt
    /// one is treated as empty with a warning.
    pub fn open(path: &Path) -> Result<Self> {
        let doc: StateDocument = persist::load_or_default(path, "resume state")?;
        tracing::debug!(
            path = %path.display(),
            records = doc.records.len(),
            "loaded resume state"
        );
        Ok(Self {
            path: path.to_path_buf(),
            inner: RwLock::new(Inner::from_records(doc.records)),
        })
    }

    /// Opens `download_db.json` under `state_dir`.
    pub fn open_in(state_dir: &Path) -> Result<Self> {
        Self::open(&state_dir.join(STATE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, inner: &Inner) -> Result<()> {
        let doc = StateDocument {
            version: 1,
            last_updated: Some(unix_timestamp()),
            records: inner.records.clone(),
        };
        persist::save_json_atomic(&self.path, &doc)
    }

    /// Record for `identity`, if any.
    pub fn get(&self, identity: &DownloadIdentity) -> Option<DownloadRecord> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.get(identity).cloned()
    }

    /// True only if the record is `completed` and its resolved artifact is
    /// non-empty on disk right now. Records without a resolved path (older or
    /// hand-edited files) accept any non-empty sibling of the target stem.
    pub fn is_completed(&self, identity: &DownloadIdentity) -> bool {
        let record = match self.get(identity) {
            Some(r) if r.status == DownloadStatus::Completed => r,
            _ => return false,
        };
        match record.resolved_file_path {
            Some(path) => fs_util::artifact_present(&path),
            None => fs_util::find_stem_artifacts(&identity.target_file_path)
                .iter()
                .any(|p| fs_util::artifact_present(p)),
        }
    }

    /// Creates `pending` records for identities not seen before. Existing
    /// records keep their status. Returns how many were created.
    pub fn ensure_pending<'a, I>(&self, items: I) -> Result<usize>
    where
        I: IntoIterator<Item = (&'a DownloadIdentity, &'a Provenance)>,
    {
        let mut inner = self.write();
        let mut created = 0usize;
        for (identity, provenance) in items {
            if inner.get(identity).is_none() {
                inner.upsert(identity, provenance);
                created += 1;
            }
        }
        if created > 0 {
            self.persist(&inner)?;
        }
        Ok(created)
    }

    pub fn mark_in_progress(&self, identity: &DownloadIdentity, provenance: &Provenance) -> Result<()> {
        let mut inner = self.write();
        let record = inner.upsert(identity, provenance);
        record.status = DownloadStatus::InProgress;
        record.error = None;
        self.persist(&inner)
    }

    pub fn mark_completed(
        &self,
        identity: &DownloadIdentity,
        provenance: &Provenance,
        resolved_file_path: &Path,
        file_size: u64,
    ) -> Result<()> {
        let mut inner = self.write();
        let record = inner.upsert(identity, provenance);
        record.status = DownloadStatus::Completed;
        record.resolved_file_path = Some(resolved_file_path.to_path_buf());
        record.file_size = Some(file_size);
        record.completed_at = Some(unix_timestamp());
        record.error = None;
        self.persist(&inner)
    }

    pub fn mark_failed(
        &self,
        identity: &DownloadIdentity,
        provenance: &Provenance,
        error: &str,
    ) -> Result<()> {
        let mut inner = self.write();
        let record = inner.upsert(identity, provenance);
        record.status = DownloadStatus::Failed;
        record.resolved_file_path = None;
        record.file_size = None;
        record.completed_at = None;
        record.error = Some(error.to_string());
        self.persist(&inner)
    }

    /// Records with status `failed`, in storage order.
    pub fn failed_records(&self) -> Vec<DownloadRecord> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner
            .records
            .iter()
            .filter(|r| r.status == DownloadStatus::Failed)
            .cloned()
            .collect()
    }

    /// Clears all records.
    pub fn reset(&self) -> Result<()> {
        let mut inner = self.write();
        *inner = Inner::default();
        self.persist(&inner)
    }

    /// Moves every `failed` record back to `pending` and returns them (as they
    /// were before the reset, error text included).
    pub fn reset_failed(&self) -> Result<Vec<DownloadRecord>> {
        let mut inner = self.write();
        let mut reset = Vec::new();
        let now = unix_timestamp();
        for record in inner
            .records
            .iter_mut()
            .filter(|r| r.status == DownloadStatus::Failed)
        {
            reset.push(record.clone());
            record.status = DownloadStatus::Pending;
            record.error = None;
            record.updated_at = now;
        }
        if !reset.is_empty() {
            self.persist(&inner)?;
        }
        Ok(reset)
    }

    /// Resets records left `in_progress` by an interrupted run to `pending`.
    pub fn recover_in_progress(&self) -> Result<usize> {
        let mut inner = self.write();
        let now = unix_timestamp();
        let mut count = 0usize;
        for record in inner
            .records
            .iter_mut()
            .filter(|r| r.status == DownloadStatus::InProgress)
        {
            record.status = DownloadStatus::Pending;
            record.updated_at = now;
            count += 1;
        }
        if count > 0 {
            self.persist(&inner)?;
        }
        Ok(count)
    }

    /// Counts by status.
    pub fn statistics(&self) -> StateStatistics {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let mut stats = StateStatistics {
            total: inner.records.len(),
            ..Default::default()
        };
        for record in &inner.records {
            match record.status {
                DownloadStatus::Pending => stats.pending += 1,
                DownloadStatus::InProgress => stats.in_progress += 1,
                DownloadStatus::Completed => stats.completed += 1,
                DownloadStatus::Failed => stats.failed += 1,
            }
        }
        stats
    }
}
