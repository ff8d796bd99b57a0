//! CLI command handlers, one per subcommand.

mod dedup_stats;
mod report;
mod reset;
mod retry_failed;
mod run;
mod status;
mod tasks;

pub use dedup_stats::run_dedup_stats;
pub use reset::run_reset;
pub use retry_failed::run_retry_failed;
pub use run::{run_download, DownloadArgs};
pub use status::run_status;
pub use tasks::run_tasks;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Token set on the first Ctrl-C. The pool stops claiming new tasks and lets
/// in-flight ones finish.
fn cancel_on_ctrl_c() -> Arc<AtomicBool> {
    let token = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&token);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\ninterrupt: finishing in-flight downloads, no new ones will start");
            flag.store(true, Ordering::Relaxed);
        }
    });
    token
}
