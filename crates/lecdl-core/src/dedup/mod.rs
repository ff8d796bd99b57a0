//! Deduplication index (`url_dedup.json`).
//!
//! The first successful download of a normalized URL becomes the canonical
//! source; later tasks for the same URL attach a reference and get a
//! symlink, a copy, or a ledger entry instead of a second download.

mod error;
mod index;
mod inflight;
mod link;
mod types;

pub use error::DedupError;
pub use index::{DedupIndex, DEDUP_FILE_NAME};
pub use inflight::{KeyGuard, KeyLocks};
pub use link::{create_symlink, materialize_link, materialize_with, SymlinkFn};
pub use types::{DedupEntry, DedupReference, DedupStatistics, LinkKind};

#[cfg(test)]
mod tests;
