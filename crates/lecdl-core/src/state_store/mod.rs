//! Persistent resume state (`download_db.json`).
//!
//! Tracks one record per (url, target path) so repeated runs skip artifacts
//! that are already on disk. Completion is re-validated against the
//! filesystem on every query.

mod store;
mod types;

pub use store::{StateStore, STATE_FILE_NAME};
pub use types::{DownloadIdentity, DownloadRecord, DownloadStatus, Provenance, StateStatistics};
