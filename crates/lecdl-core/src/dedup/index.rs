//! JSON-backed deduplication index keyed by normalized-URL digest.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockWriteGuard};

use crate::fs_util;
use crate::persist::{self, unix_timestamp};
use crate::url_model::dedup_key;

use super::error::DedupError;
use super::types::{DedupDocument, DedupEntry, DedupReference, DedupStatistics, LinkKind};

/// File name of the dedup document inside the state directory.
pub const DEDUP_FILE_NAME: &str = "url_dedup.json";

#[derive(Debug, Default)]
struct Inner {
    entries: Vec<DedupEntry>,
    index: HashMap<String, usize>,
}

impl Inner {
    fn from_entries(entries: Vec<DedupEntry>) -> Self {
        let mut inner = Inner::default();
        for entry in entries {
            // First registration of a key wins; later duplicates are dropped.
            if inner.index.contains_key(&entry.key) {
                continue;
            }
            inner.index.insert(entry.key.clone(), inner.entries.len());
            inner.entries.push(entry);
        }
        inner
    }

    fn get(&self, key: &str) -> Option<&DedupEntry> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    fn remove(&mut self, key: &str) -> Option<DedupEntry> {
        let i = self.index.remove(key)?;
        let entry = self.entries.remove(i);
        for slot in self.index.values_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        Some(entry)
    }
}

fn source_valid(entry: &DedupEntry) -> bool {
    fs_util::artifact_present(&entry.source_file_path)
}

/// Durable mapping from dedup key to the canonical artifact and its sharers.
///
/// Mutations (`register`, `attach_reference`, stale purges) hold the write
/// lock across "update in memory, persist atomically".
#[derive(Debug)]
pub struct DedupIndex {
    path: PathBuf,
    inner: RwLock<Inner>,
}

impl DedupIndex {
    /// Opens the index at `path`. Missing or corrupt files start empty.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let doc: DedupDocument = persist::load_or_default(path, "dedup index")?;
        tracing::debug!(
            path = %path.display(),
            entries = doc.entries.len(),
            "loaded dedup index"
        );
        Ok(Self {
            path: path.to_path_buf(),
            inner: RwLock::new(Inner::from_entries(doc.entries)),
        })
    }

    /// Opens `url_dedup.json` under `state_dir`.
    pub fn open_in(state_dir: &Path) -> anyhow::Result<Self> {
        Self::open(&state_dir.join(DEDUP_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, inner: &Inner) -> Result<(), DedupError> {
        let doc = DedupDocument {
            version: 1,
            last_updated: Some(unix_timestamp()),
            entries: inner.entries.clone(),
        };
        persist::save_json_atomic(&self.path, &doc).map_err(DedupError::Persist)
    }

    /// Valid entry for `url`, without side effects. A stale entry (canonical
    /// source missing or empty) reads as absent but is left in place.
    pub fn probe(&self, url: &str) -> Option<DedupEntry> {
        let key = dedup_key(url);
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.get(&key).filter(|e| source_valid(e)).cloned()
    }

    /// Valid entry for `url`. A stale entry is purged (and persisted) so the
    /// next successful download becomes the new canonical source.
    pub fn lookup(&self, url: &str) -> Result<Option<DedupEntry>, DedupError> {
        let key = dedup_key(url);
        {
            let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
            match inner.get(&key) {
                None => return Ok(None),
                Some(entry) if source_valid(entry) => return Ok(Some(entry.clone())),
                Some(_) => {}
            }
        }

        let mut inner = self.write();
        // Re-check under the write lock; another worker may have purged or
        // re-registered the key in between.
        match inner.get(&key) {
            None => return Ok(None),
            Some(entry) if source_valid(entry) => return Ok(Some(entry.clone())),
            Some(_) => {}
        }
        if let Some(entry) = inner.remove(&key) {
            tracing::warn!(
                url = %entry.url,
                path = %entry.source_file_path.display(),
                references = entry.references.len(),
                "canonical source missing; purging stale dedup entry"
            );
        }
        self.persist(&inner)?;
        Ok(None)
    }

    /// Creates the entry for `url` with `file_path` as canonical source.
    /// Fails with `DuplicateRegistration` if the key already has one.
    pub fn register(
        &self,
        url: &str,
        file_path: &Path,
        file_size: u64,
    ) -> Result<DedupEntry, DedupError> {
        let key = dedup_key(url);
        let mut inner = self.write();
        if inner.get(&key).is_some() {
            return Err(DedupError::DuplicateRegistration {
                url: url.to_string(),
            });
        }
        let entry = DedupEntry {
            key: key.clone(),
            url: url.to_string(),
            source_file_path: file_path.to_path_buf(),
            file_size,
            completed_at: unix_timestamp(),
            references: Vec::new(),
        };
        let pos = inner.entries.len();
        inner.index.insert(key, pos);
        inner.entries.push(entry.clone());
        self.persist(&inner)?;
        tracing::debug!(url, path = %file_path.display(), file_size, "registered canonical source");
        Ok(entry)
    }

    /// Records `new_file_path` as a sharer of `url` and returns the canonical
    /// source path. Attaching the same path twice keeps a single reference.
    pub fn attach_reference(
        &self,
        url: &str,
        new_file_path: &Path,
        link_kind: LinkKind,
    ) -> Result<PathBuf, DedupError> {
        let key = dedup_key(url);
        let mut inner = self.write();
        let idx = match inner.index.get(&key).copied() {
            Some(i) => i,
            None => {
                return Err(DedupError::UnknownUrl {
                    url: url.to_string(),
                })
            }
        };
        let entry = &mut inner.entries[idx];
        let source = entry.source_file_path.clone();
        if entry.references.iter().any(|r| r.file_path == new_file_path) {
            return Ok(source);
        }
        entry.references.push(DedupReference {
            file_path: new_file_path.to_path_buf(),
            link_kind,
            created_at: unix_timestamp(),
        });
        self.persist(&inner)?;
        Ok(source)
    }

    /// All entries in first-seen order.
    pub fn entries(&self) -> Vec<DedupEntry> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.entries.clone()
    }

    pub fn statistics(&self) -> DedupStatistics {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        DedupStatistics {
            unique_urls: inner.entries.len(),
            total_references: inner.entries.iter().map(|e| e.references.len()).sum(),
            space_saved: inner.entries.iter().map(DedupEntry::space_saved).sum(),
        }
    }

    /// The `n` most-referenced entries, ties in first-seen order.
    pub fn top_duplicates(&self, n: usize) -> Vec<DedupEntry> {
        let mut entries = self.entries();
        // Stable sort keeps first-seen order among equal counts.
        entries.sort_by(|a, b| b.references.len().cmp(&a.references.len()));
        entries.truncate(n);
        entries
    }
}
