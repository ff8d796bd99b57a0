//! On-disk artifact inspection and copying.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Size in bytes of the artifact at `path`: file length, or the total of all
/// files under a directory. Follows symlinks. `None` if nothing is there.
pub fn artifact_size(path: &Path) -> Option<u64> {
    let meta = fs::metadata(path).ok()?;
    if meta.is_file() {
        return Some(meta.len());
    }
    if meta.is_dir() {
        return dir_size(path).ok();
    }
    None
}

fn dir_size(root: &Path) -> io::Result<u64> {
    let mut total = 0u64;
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            let meta = fs::metadata(&path)?;
            if meta.is_dir() {
                stack.push(path);
            } else {
                total += meta.len();
            }
        }
    }
    Ok(total)
}

/// True when a non-empty artifact exists at `path`.
pub fn artifact_present(path: &Path) -> bool {
    artifact_size(path).map(|s| s > 0).unwrap_or(false)
}

/// Existing siblings of an extension-less `stem` path: `stem` itself, any
/// `stem.<ext...>`, and a `stem_folder` directory. Sorted for determinism.
pub fn find_stem_artifacts(stem: &Path) -> Vec<PathBuf> {
    let (Some(parent), Some(name)) = (stem.parent(), stem.file_name()) else {
        return Vec::new();
    };
    let name = name.to_string_lossy();
    let dotted = format!("{name}.");
    let folder = format!("{name}_folder");

    let Ok(entries) = fs::read_dir(parent) else {
        return Vec::new();
    };
    let mut found: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            let file_name = e.file_name();
            let file_name = file_name.to_string_lossy();
            file_name == name || file_name.starts_with(&dotted) || file_name == folder
        })
        .map(|e| e.path())
        .collect();
    found.sort();
    found
}

/// True if `artifact` is `stem` itself, `stem.<ext...>`, or `stem_folder`.
pub fn belongs_to_stem(artifact: &Path, stem: &Path) -> bool {
    if artifact.parent() != stem.parent() {
        return false;
    }
    let (Some(artifact_name), Some(stem_name)) = (artifact.file_name(), stem.file_name()) else {
        return false;
    };
    let artifact_name = artifact_name.to_string_lossy();
    match artifact_name.strip_prefix(stem_name.to_string_lossy().as_ref()) {
        Some(rest) => rest.is_empty() || rest.starts_with('.') || rest == "_folder",
        None => false,
    }
}

/// `stem` with `suffix` appended to its file name.
pub fn with_suffix(stem: &Path, suffix: &str) -> PathBuf {
    let mut name = stem.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

/// Copies a file, or a directory tree, to `dest`.
pub fn copy_artifact(source: &Path, dest: &Path) -> io::Result<()> {
    if fs::metadata(source)?.is_dir() {
        fs::create_dir_all(dest)?;
        for entry in fs::read_dir(source)? {
            let entry = entry?;
            copy_artifact(&entry.path(), &dest.join(entry.file_name()))?;
        }
        return Ok(());
    }
    fs::copy(source, dest).map(|_| ())
}

/// Removes whatever sits at `path` (file, symlink, or directory). Missing is fine.
pub fn remove_existing(path: &Path) -> io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
