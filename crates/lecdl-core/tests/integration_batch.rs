//! Integration test: workbook → task generator → worker pool → both stores.
//!
//! Uses an in-memory fetcher so resume, dedup and recovery behavior can be
//! checked end to end against real files in a temp directory.

mod common;

use std::fs;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use common::fake_fetcher::FakeFetcher;
use lecdl_core::config::LecdlConfig;
use lecdl_core::dedup::{DedupIndex, LinkKind};
use lecdl_core::retry::RetryPolicy;
use lecdl_core::scheduler::{self, BatchContext, BatchOptions, TaskOutcome};
use lecdl_core::state_store::StateStore;
use lecdl_core::task::{DownloadTask, TaskGenerator, Workbook};
use tempfile::tempdir;

const WORKBOOK: &str = r#"{
  "sheets": [
    {
      "name": "講義録画・資料",
      "columns": ["実施年", "実施日", "開催種別", "講義タイトル",
                  "録画（動画視聴リンク）", "録画（動画DLリンク）", "資料1", "資料2"],
      "rows": [
        {"実施年": "2025年", "実施日": "5月15日", "開催種別": "オンライン", "講義タイトル": "AI入門",
         "録画（動画視聴リンク）": "https://vimeo.com/100", "録画（動画DLリンク）": "-",
         "資料1": "https://docs.google.com/presentation/d/shared/edit?usp=sharing", "資料2": null},
        {"実施年": null, "実施日": "5月16日", "開催種別": "会場", "講義タイトル": "応用",
         "録画（動画視聴リンク）": "https://vimeo.com/101", "録画（動画DLリンク）": "",
         "資料1": "https://docs.google.com/presentation/d/shared/edit#slide=2", "資料2": "https://example.com/notes"}
      ]
    },
    {
      "name": "コンテンツ",
      "columns": ["コンテンツタイトル", "動画リンク", "資料1"],
      "rows": [
        {"コンテンツタイトル": "1-1.Overview", "動画リンク": "https://youtu.be/abc", "資料1": null}
      ]
    }
  ]
}"#;

const SHARED_SLIDES: &str = "https://docs.google.com/presentation/d/shared/edit?usp=sharing";

fn options(workers: usize, mode: LinkKind) -> BatchOptions {
    let mut opts = BatchOptions::from_config(&LecdlConfig::default());
    opts.workers = workers;
    opts.inter_task_delay = Duration::ZERO;
    opts.retry = RetryPolicy::no_retry();
    opts.dedup.mode = mode;
    opts
}

fn context(root: &Path, fetcher: &Arc<FakeFetcher>, opts: BatchOptions) -> Arc<BatchContext> {
    let state_dir = root.join(".download_state");
    Arc::new(BatchContext::new(
        StateStore::open_in(&state_dir).unwrap(),
        DedupIndex::open_in(&state_dir).unwrap(),
        Box::new(Arc::clone(fetcher)),
        opts,
    ))
}

fn tasks(root: &Path) -> Vec<DownloadTask> {
    let wb = Workbook::from_json_str(WORKBOOK).unwrap();
    TaskGenerator::new(root).generate(&wb, &[]).unwrap()
}

#[tokio::test]
async fn second_run_skips_everything() {
    let dir = tempdir().unwrap();
    let fetcher = Arc::new(FakeFetcher::new());

    let ctx = context(dir.path(), &fetcher, options(1, LinkKind::Copy));
    let first = scheduler::run_batch(ctx, tasks(dir.path()), None).await.unwrap();
    assert_eq!(first.totals.total, 6);
    assert_eq!(first.totals.completed, 5);
    assert_eq!(first.totals.deduped, 1);
    assert_eq!(first.totals.failed, 0);
    assert_eq!(fetcher.total_calls(), 5);

    let ctx = context(dir.path(), &fetcher, options(1, LinkKind::Copy));
    let second = scheduler::run_batch(ctx, tasks(dir.path()), None).await.unwrap();
    assert_eq!(second.totals.skipped, 6);
    assert_eq!(second.totals.completed + second.totals.deduped, 0);
    assert_eq!(fetcher.total_calls(), 5);

    let sheet = &second.sheets[0];
    assert_eq!(sheet.sheet, "講義録画・資料");
    assert_eq!(sheet.counts.total, 5);
    assert_eq!(second.sheets[1].sheet, "コンテンツ");
}

#[tokio::test]
async fn generated_names_land_in_sheet_directories() {
    let dir = tempdir().unwrap();
    let fetcher = Arc::new(FakeFetcher::new());
    let ctx = context(dir.path(), &fetcher, options(1, LinkKind::Copy));
    scheduler::run_batch(ctx, tasks(dir.path()), None).await.unwrap();

    let calendar = dir.path().join("講義録画・資料");
    assert!(calendar.join("20250515_オンライン_AI入門_video_view.ja.srt").is_file());
    assert!(calendar.join("20250515_オンライン_AI入門_document-1.pdf").is_file());
    assert!(calendar.join("20250516_会場_応用_document-1.pdf").is_file());
    assert!(calendar.join("20250516_会場_応用_document-2.pdf").is_file());
    assert!(dir
        .path()
        .join("コンテンツ")
        .join("1-1_Overview_video_view.ja.srt")
        .is_file());
}

#[tokio::test]
async fn same_normalized_url_is_fetched_once_even_in_parallel() {
    let dir = tempdir().unwrap();
    let fetcher = Arc::new(FakeFetcher::new());
    fetcher.set_delay(Duration::from_millis(50));

    let ctx = context(dir.path(), &fetcher, options(4, LinkKind::Copy));
    let report = scheduler::run_batch(Arc::clone(&ctx), tasks(dir.path()), None)
        .await
        .unwrap();

    // Whichever variant wins the claim is fetched; the other is linked.
    let variant = "https://docs.google.com/presentation/d/shared/edit#slide=2";
    assert_eq!(fetcher.calls_for(SHARED_SLIDES) + fetcher.calls_for(variant), 1);
    assert_eq!(report.totals.deduped, 1);
    assert_eq!(report.totals.failed, 0);

    let entry = ctx.dedup.probe(variant).expect("canonical entry");
    assert_eq!(entry.references.len(), 1);
    let stats = ctx.dedup.statistics();
    assert_eq!(stats.unique_urls, 5);
    assert_eq!(stats.total_references, 1);
    assert_eq!(stats.space_saved, entry.file_size);
}

#[cfg(unix)]
#[tokio::test]
async fn symlink_reference_points_at_canonical_file() {
    let dir = tempdir().unwrap();
    let fetcher = Arc::new(FakeFetcher::new());
    let ctx = context(dir.path(), &fetcher, options(1, LinkKind::Symlink));
    let report = scheduler::run_batch(ctx, tasks(dir.path()), None).await.unwrap();

    let deduped = report
        .results
        .iter()
        .find_map(|r| match &r.outcome {
            TaskOutcome::Deduped {
                source,
                link_path,
                link_kind,
            } => Some((source.clone(), link_path.clone(), *link_kind)),
            _ => None,
        })
        .expect("one deduped task");
    let (source, link, kind) = deduped;
    if kind == LinkKind::Symlink {
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::canonicalize(&link).unwrap(), fs::canonicalize(&source).unwrap());
    } else {
        // Platform refused the symlink; the configured fallback is a copy.
        assert_eq!(kind, LinkKind::Copy);
        assert_eq!(fs::read(&link).unwrap(), fs::read(&source).unwrap());
    }
}

#[tokio::test]
async fn deleted_canonical_source_is_downloaded_again() {
    let dir = tempdir().unwrap();
    let fetcher = Arc::new(FakeFetcher::new());
    let ctx = context(dir.path(), &fetcher, options(1, LinkKind::RecordOnly));
    scheduler::run_batch(ctx, tasks(dir.path()), None).await.unwrap();
    assert_eq!(fetcher.calls_for(SHARED_SLIDES), 1);

    let canonical = dir
        .path()
        .join("講義録画・資料")
        .join("20250515_オンライン_AI入門_document-1.pdf");
    fs::remove_file(&canonical).unwrap();

    let ctx = context(dir.path(), &fetcher, options(1, LinkKind::RecordOnly));
    let report = scheduler::run_batch(Arc::clone(&ctx), tasks(dir.path()), None)
        .await
        .unwrap();
    assert_eq!(report.totals.failed, 0);
    assert_eq!(fetcher.calls_for(SHARED_SLIDES), 2);
    let entry = ctx.dedup.probe(SHARED_SLIDES).expect("re-registered");
    assert_eq!(entry.source_file_path, canonical);
}

#[tokio::test]
async fn failures_are_reported_and_retried() {
    let dir = tempdir().unwrap();
    let fetcher = Arc::new(FakeFetcher::new());
    fetcher.fail("https://example.com/notes");

    let ctx = context(dir.path(), &fetcher, options(2, LinkKind::Copy));
    let report = scheduler::run_batch(ctx, tasks(dir.path()), None).await.unwrap();
    assert_eq!(report.totals.failed, 1);
    let failure = report.failures().next().unwrap();
    assert_eq!(failure.identity.url, "https://example.com/notes");
    assert_eq!(failure.error, "HTTP 404");

    fetcher.heal("https://example.com/notes");
    let ctx = context(dir.path(), &fetcher, options(2, LinkKind::Copy));
    let retry = scheduler::retry_failed(Arc::clone(&ctx), None).await.unwrap();
    assert_eq!(retry.totals.total, 1);
    assert_eq!(retry.totals.completed, 1);
    assert_eq!(ctx.state.statistics().failed, 0);
}

#[tokio::test]
async fn reset_then_status_reports_zero() {
    let dir = tempdir().unwrap();
    let fetcher = Arc::new(FakeFetcher::new());
    let ctx = context(dir.path(), &fetcher, options(1, LinkKind::Copy));
    scheduler::run_batch(Arc::clone(&ctx), tasks(dir.path()), None)
        .await
        .unwrap();
    assert_eq!(ctx.state.statistics().completed, 6);

    ctx.state.reset().unwrap();
    let reopened = StateStore::open_in(&dir.path().join(".download_state")).unwrap();
    let stats = reopened.statistics();
    assert_eq!(
        (stats.total, stats.pending, stats.in_progress, stats.completed, stats.failed),
        (0, 0, 0, 0, 0)
    );
}

#[tokio::test]
async fn dry_run_reports_without_side_effects() {
    let dir = tempdir().unwrap();
    let fetcher = Arc::new(FakeFetcher::new());
    let mut opts = options(2, LinkKind::Copy);
    opts.dry_run = true;
    let ctx = context(dir.path(), &fetcher, opts);
    let report = scheduler::run_batch(ctx, tasks(dir.path()), None).await.unwrap();
    assert!(report.dry_run);
    assert_eq!(report.totals.total, 6);
    assert_eq!(fetcher.total_calls(), 0);
    assert!(!dir.path().join(".download_state").exists());
}

#[tokio::test]
async fn dry_run_counts_match_a_real_run() {
    let real_dir = tempdir().unwrap();
    let fetcher = Arc::new(FakeFetcher::new());
    let ctx = context(real_dir.path(), &fetcher, options(2, LinkKind::Copy));
    let real = scheduler::run_batch(ctx, tasks(real_dir.path()), None)
        .await
        .unwrap();

    let dry_dir = tempdir().unwrap();
    let mut opts = options(2, LinkKind::Copy);
    opts.dry_run = true;
    let ctx = context(dry_dir.path(), &fetcher, opts);
    let dry = scheduler::run_batch(ctx, tasks(dry_dir.path()), None)
        .await
        .unwrap();

    assert_eq!((real.totals.completed, real.totals.deduped), (5, 1));
    assert_eq!(
        (dry.totals.completed, dry.totals.deduped, dry.totals.skipped),
        (real.totals.completed, real.totals.deduped, real.totals.skipped)
    );
}

#[tokio::test]
async fn cancelled_batch_starts_nothing_new() {
    let dir = tempdir().unwrap();
    let fetcher = Arc::new(FakeFetcher::new());
    let cancel = Arc::new(AtomicBool::new(true));
    let ctx = context(dir.path(), &fetcher, options(2, LinkKind::Copy));
    let report = scheduler::run_batch(Arc::clone(&ctx), tasks(dir.path()), Some(cancel))
        .await
        .unwrap();
    assert!(report.cancelled());
    assert_eq!(report.not_started, 6);
    assert_eq!(fetcher.total_calls(), 0);
    // Pending records were written before dispatch and survive a reload.
    let reopened = StateStore::open_in(&dir.path().join(".download_state")).unwrap();
    assert_eq!(reopened.statistics().pending, 6);
}
