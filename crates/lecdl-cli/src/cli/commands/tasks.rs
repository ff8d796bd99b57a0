//! `lecdl tasks` – show what a workbook expands to.

use anyhow::Result;
use lecdl_core::config::LecdlConfig;
use lecdl_core::task::{TaskGenerator, Workbook};
use std::path::Path;

pub fn run_tasks(cfg: &LecdlConfig, workbook: &Path, sheets: &[String]) -> Result<()> {
    let workbook = Workbook::load_json(workbook)?;
    let tasks = TaskGenerator::from_config(cfg).generate(&workbook, sheets)?;
    if tasks.is_empty() {
        println!("No downloadable links found.");
        return Ok(());
    }
    println!("{:<12} {:<5} {:<14} {:<20} {}", "SHEET", "ROW", "COLUMN", "TYPE", "TARGET");
    for task in &tasks {
        println!(
            "{:<12} {:<5} {:<14} {:<20} {}",
            task.provenance.sheet,
            task.provenance.row_index + 1,
            task.provenance.column_role.to_string(),
            task.url_type.as_str(),
            task.target().display()
        );
        println!("    {}", task.url());
    }
    println!("{} task(s).", tasks.len());
    Ok(())
}
