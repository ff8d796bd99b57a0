//! `lecdl reset` – forget all resume records.

use anyhow::Result;
use lecdl_core::config::LecdlConfig;
use lecdl_core::state_store::StateStore;

pub fn run_reset(cfg: &LecdlConfig) -> Result<()> {
    let store = StateStore::open_in(&cfg.state_dir())?;
    let before = store.statistics().total;
    store.reset()?;
    tracing::info!(records = before, path = %store.path().display(), "resume state reset");
    println!("Cleared {} resume record(s).", before);
    Ok(())
}
