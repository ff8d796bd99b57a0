//! `lecdl dedup-stats` – how much sharing the dedup index has done.

use anyhow::Result;
use lecdl_core::config::LecdlConfig;
use lecdl_core::dedup::DedupIndex;
use lecdl_core::scheduler::format_size;

pub fn run_dedup_stats(cfg: &LecdlConfig, top: usize) -> Result<()> {
    let index = DedupIndex::open_in(&cfg.state_dir())?;
    let stats = index.statistics();

    println!("Unique URLs:      {}", stats.unique_urls);
    println!("Total references: {}", stats.total_references);
    println!("Space saved:      {}", format_size(stats.space_saved));

    let shared: Vec<_> = index
        .top_duplicates(top)
        .into_iter()
        .filter(|e| !e.references.is_empty())
        .collect();
    if !shared.is_empty() {
        println!();
        println!("{:<6} {:<10} {}", "REFS", "SIZE", "URL");
        for entry in shared {
            println!(
                "{:<6} {:<10} {}",
                entry.references.len(),
                format_size(entry.file_size),
                entry.url
            );
        }
    }
    Ok(())
}
