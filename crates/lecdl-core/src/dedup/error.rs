use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures raised by the deduplication index and link materialization.
#[derive(Debug, Error)]
pub enum DedupError {
    /// `register` called for a key that already has an entry.
    #[error("dedup entry already registered for {url}")]
    DuplicateRegistration { url: String },

    /// `attach_reference` called for a key with no entry.
    #[error("no dedup entry for {url}")]
    UnknownUrl { url: String },

    /// The platform or permissions refused a symlink. Recoverable: callers
    /// may fall back to a copy or a record-only reference.
    #[error("cannot create symlink {} -> {}: {source}", .link.display(), .target.display())]
    LinkCreation {
        link: PathBuf,
        target: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("persist dedup index: {0:#}")]
    Persist(anyhow::Error),
}

impl DedupError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        DedupError::Io {
            context: context.into(),
            source,
        }
    }

    /// True for errors the orchestrator may recover from by downgrading the link kind.
    pub fn is_link_creation(&self) -> bool {
        matches!(self, DedupError::LinkCreation { .. })
    }
}
