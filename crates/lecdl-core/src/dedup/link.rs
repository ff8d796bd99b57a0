//! Filesystem side of a dedup reference.

use std::fs;
use std::io;
use std::path::Path;

use crate::fs_util;

use super::error::DedupError;
use super::types::LinkKind;

/// Makes `new_path` refer to `source_path` according to `link_kind`.
///
/// Creates missing parent directories and replaces whatever already sits at
/// `new_path`. `RecordOnly` touches nothing. A refused symlink surfaces as
/// `DedupError::LinkCreation`, never as a silent skip.
pub fn materialize_link(
    source_path: &Path,
    new_path: &Path,
    link_kind: LinkKind,
) -> Result<(), DedupError> {
    materialize_with(source_path, new_path, link_kind, create_symlink)
}

/// Signature of the call that creates a symlink at `link` pointing to `target`.
pub type SymlinkFn = fn(target: &Path, link: &Path) -> io::Result<()>;

/// `materialize_link` with the symlink call supplied by the caller.
pub fn materialize_with(
    source_path: &Path,
    new_path: &Path,
    link_kind: LinkKind,
    make_symlink: SymlinkFn,
) -> Result<(), DedupError> {
    if link_kind == LinkKind::RecordOnly {
        return Ok(());
    }
    if source_path == new_path {
        return Ok(());
    }

    if let Some(parent) = new_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| DedupError::io(format!("create dir {}", parent.display()), e))?;
    }
    fs_util::remove_existing(new_path)
        .map_err(|e| DedupError::io(format!("remove {}", new_path.display()), e))?;

    match link_kind {
        LinkKind::Symlink => {
            let target = absolute(source_path);
            make_symlink(&target, new_path).map_err(|source| DedupError::LinkCreation {
                link: new_path.to_path_buf(),
                target,
                source,
            })
        }
        LinkKind::Copy => fs_util::copy_artifact(source_path, new_path).map_err(|e| {
            DedupError::io(
                format!("copy {} -> {}", source_path.display(), new_path.display()),
                e,
            )
        }),
        LinkKind::RecordOnly => Ok(()),
    }
}

fn absolute(path: &Path) -> std::path::PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Platform symlink. Directories get a directory link on Windows.
#[cfg(unix)]
pub fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
pub fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    if target.is_dir() {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    }
}

#[cfg(not(any(unix, windows)))]
pub fn create_symlink(_target: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symlinks are not supported on this platform",
    ))
}
