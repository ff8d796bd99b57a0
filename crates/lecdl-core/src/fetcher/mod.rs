//! The external Fetcher: turns one URL into one artifact on disk.
//!
//! The orchestrator only sees the `Fetcher` trait. `CommandFetcher` is the
//! process-backed implementation driven by argv templates from config.

mod command;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::retry::FetchError;
use crate::url_model::UrlType;

pub use command::{CommandFetcher, CommandTemplates};

/// One fetch: where from, what kind, and which extension-less stem to write.
#[derive(Debug, Clone, Copy)]
pub struct FetchRequest<'a> {
    pub url: &'a str,
    pub url_type: UrlType,
    /// Absolute target stem; the fetcher chooses the extension.
    pub stem: &'a Path,
}

/// What a successful fetch wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedArtifact {
    /// Primary artifact (stem plus extension, or a `_folder` directory).
    pub path: PathBuf,
    pub file_size: u64,
}

/// Downloads a single resource. Implementations enforce their own timeout;
/// the orchestrator treats every `Err` as a task failure after retries.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, request: &FetchRequest<'_>) -> Result<FetchedArtifact, FetchError>;
}

impl<F: Fetcher + ?Sized> Fetcher for Arc<F> {
    fn fetch(&self, request: &FetchRequest<'_>) -> Result<FetchedArtifact, FetchError> {
        (**self).fetch(request)
    }
}
