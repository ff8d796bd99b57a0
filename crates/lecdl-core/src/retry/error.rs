//! Fetcher error type for retry classification.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Error returned by a single Fetcher call.
/// Classified into an `ErrorKind` before deciding whether to retry.
#[derive(Debug)]
pub enum FetchError {
    /// The fetch did not finish within its deadline.
    Timeout(Duration),
    /// Remote answered with a non-success HTTP status.
    Http(u16),
    /// Network-level failure (DNS, refused, reset).
    Connection(String),
    /// External tool exited unsuccessfully; `stderr` is its trimmed tail.
    Command { status: String, stderr: String },
    /// Fetch reported success but nothing non-empty was found on disk.
    NoArtifact(PathBuf),
    /// Local I/O failure (spawning the tool, creating directories).
    Io(std::io::Error),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Timeout(d) => write!(f, "timed out after {}s", d.as_secs()),
            FetchError::Http(code) => write!(f, "HTTP {}", code),
            FetchError::Connection(msg) => write!(f, "connection failed: {}", msg),
            FetchError::Command { status, stderr } if stderr.is_empty() => {
                write!(f, "fetch command failed ({})", status)
            }
            FetchError::Command { status, stderr } => {
                write!(f, "fetch command failed ({}): {}", status, stderr)
            }
            FetchError::NoArtifact(stem) => {
                write!(f, "no artifact written for {}", stem.display())
            }
            FetchError::Io(e) => write!(f, "io: {}", e),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for FetchError {
    fn from(e: std::io::Error) -> Self {
        FetchError::Io(e)
    }
}
