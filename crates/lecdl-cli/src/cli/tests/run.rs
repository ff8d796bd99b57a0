//! Tests for the run subcommand and global overrides.

use super::{parse, parse_cli};
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use lecdl_core::dedup::LinkKind;
use std::path::{Path, PathBuf};

#[test]
fn cli_parse_run_defaults() {
    match parse(&["lecdl", "run", "lectures.json"]) {
        CliCommand::Run {
            workbook,
            sheets,
            dry_run,
            overwrite,
            no_dedup,
            dedup_mode,
            jobs,
        } => {
            assert_eq!(workbook, PathBuf::from("lectures.json"));
            assert!(sheets.is_empty());
            assert!(!dry_run);
            assert!(!overwrite);
            assert!(!no_dedup);
            assert!(dedup_mode.is_none());
            assert!(jobs.is_none());
        }
        _ => panic!("expected Run"),
    }
}

#[test]
fn cli_parse_run_all_flags() {
    match parse(&[
        "lecdl",
        "run",
        "wb.json",
        "--sheet",
        "講義録画・資料",
        "--sheet",
        "コンテンツ",
        "--dry-run",
        "--overwrite",
        "--dedup-mode",
        "record-only",
        "--jobs",
        "4",
    ]) {
        CliCommand::Run {
            sheets,
            dry_run,
            overwrite,
            dedup_mode,
            jobs,
            ..
        } => {
            assert_eq!(sheets, vec!["講義録画・資料", "コンテンツ"]);
            assert!(dry_run);
            assert!(overwrite);
            assert_eq!(dedup_mode, Some(LinkKind::RecordOnly));
            assert_eq!(jobs, Some(4));
        }
        _ => panic!("expected Run with flags"),
    }
}

#[test]
fn cli_parse_run_rejects_unknown_dedup_mode() {
    assert!(Cli::try_parse_from(["lecdl", "run", "wb.json", "--dedup-mode", "hardlink"]).is_err());
}

#[test]
fn cli_parse_run_requires_workbook() {
    assert!(Cli::try_parse_from(["lecdl", "run"]).is_err());
}

#[test]
fn run_flags_become_overrides() {
    let cli = parse_cli(&[
        "lecdl",
        "run",
        "wb.json",
        "--no-dedup",
        "--dedup-mode",
        "copy",
        "--jobs",
        "3",
        "--download-dir",
        "/tmp/out",
    ]);
    let overrides = cli.overrides();
    assert!(overrides.no_dedup);
    assert_eq!(overrides.dedup_mode, Some(LinkKind::Copy));
    assert_eq!(overrides.workers, Some(3));
    assert_eq!(overrides.download_dir.as_deref(), Some(Path::new("/tmp/out")));
    assert!(overrides.state_dir.is_none());
}

#[test]
fn global_options_go_before_or_after_subcommand() {
    let cli = parse_cli(&["lecdl", "--state-dir", "/tmp/st", "status"]);
    assert_eq!(cli.state_dir.as_deref(), Some(Path::new("/tmp/st")));

    let cli = parse_cli(&["lecdl", "status", "--config", "/etc/lecdl.toml"]);
    assert_eq!(cli.config.as_deref(), Some(Path::new("/etc/lecdl.toml")));
    assert!(matches!(cli.command, CliCommand::Status));
}
