//! Durable JSON documents with atomic replace.
//!
//! Both stores keep their whole state in one JSON file. Saves write a temp
//! file in the same directory and rename it over the target, so a reader or a
//! crashed run never sees a half-written document.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Outcome of loading a persisted document.
#[derive(Debug)]
pub enum Loaded<T> {
    /// No file yet.
    Missing,
    /// File parsed.
    Ok(T),
    /// File present but unreadable as `T`; callers start empty.
    Corrupt(String),
}

/// Reads and parses `path`. A missing file or a parse failure is not an error;
/// only I/O failures other than NotFound are.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Loaded<T>> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Loaded::Missing),
        Err(e) => return Err(e).with_context(|| format!("read state file: {}", path.display())),
    };
    match serde_json::from_slice(&bytes) {
        Ok(value) => Ok(Loaded::Ok(value)),
        Err(e) => Ok(Loaded::Corrupt(e.to_string())),
    }
}

/// Loads `path`, treating a corrupt document as empty with a warning.
pub fn load_or_default<T: DeserializeOwned + Default>(path: &Path, what: &str) -> Result<T> {
    match load_json(path)? {
        Loaded::Missing => Ok(T::default()),
        Loaded::Ok(value) => Ok(value),
        Loaded::Corrupt(reason) => {
            tracing::warn!(
                path = %path.display(),
                "corrupt {} ({}); starting with an empty store",
                what,
                reason
            );
            Ok(T::default())
        }
    }
}

/// Serializes `value` and atomically replaces `path` (creates parent dir if needed).
pub fn save_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)
        .with_context(|| format!("create dir: {}", parent.display()))?;

    let json = serde_json::to_vec_pretty(value).context("serialize state")?;
    let mut tmp = tempfile::Builder::new()
        .prefix(".lecdl-state")
        .tempfile_in(parent)
        .with_context(|| format!("create temp file in {}", parent.display()))?;
    tmp.write_all(&json)
        .with_context(|| format!("write temp state for {}", path.display()))?;
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("sync temp state for {}", path.display()))?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("replace state file: {}", path.display()))?;
    Ok(())
}

/// Seconds since the Unix epoch, as stored in both documents.
pub fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
