//! In-memory Fetcher for integration tests.
//!
//! Writes `<stem>.pdf` (documents) or `<stem>.ja.srt` (videos) containing the
//! URL, counts calls per URL, and can be told to fail or to stall.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use lecdl_core::fetcher::{FetchRequest, FetchedArtifact, Fetcher};
use lecdl_core::fs_util;
use lecdl_core::retry::FetchError;

#[derive(Default)]
pub struct FakeFetcher {
    calls: Mutex<HashMap<String, usize>>,
    total: AtomicUsize,
    failing: Mutex<HashSet<String>>,
    delay: Mutex<Duration>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every fetch of `url` fails permanently until `heal` is called.
    pub fn fail(&self, url: &str) {
        self.failing.lock().unwrap().insert(url.to_string());
    }

    pub fn heal(&self, url: &str) {
        self.failing.lock().unwrap().remove(url);
    }

    /// Each fetch sleeps this long first.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn total_calls(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    pub fn calls_for(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }
}

impl Fetcher for FakeFetcher {
    fn fetch(&self, request: &FetchRequest<'_>) -> Result<FetchedArtifact, FetchError> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(request.url.to_string())
            .or_default() += 1;
        self.total.fetch_add(1, Ordering::SeqCst);

        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        if self.failing.lock().unwrap().contains(request.url) {
            return Err(FetchError::Http(404));
        }

        let suffix = if request.url_type.is_video() { ".ja.srt" } else { ".pdf" };
        let path = fs_util::with_suffix(request.stem, suffix);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, request.url.as_bytes())?;
        Ok(FetchedArtifact {
            file_size: request.url.len() as u64,
            path,
        })
    }
}
