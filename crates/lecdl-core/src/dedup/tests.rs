//! Tests for the deduplication index and link materialization.

use std::fs;
use std::path::Path;

use super::{materialize_link, DedupError, DedupIndex, LinkKind, DEDUP_FILE_NAME};

fn write(path: &Path, bytes: &[u8]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, bytes).unwrap();
}

#[test]
fn lookup_matches_normalized_variants() {
    let dir = tempfile::tempdir().unwrap();
    let index = DedupIndex::open_in(dir.path()).unwrap();
    let src = dir.path().join("a").join("talk.pdf");
    write(&src, b"pdf bytes");

    index
        .register("https://docs.google.com/document/d/1/edit?usp=sharing", &src, 9)
        .unwrap();

    let hit = index
        .lookup("https://docs.google.com/document/d/1/edit/#heading")
        .unwrap()
        .unwrap();
    assert_eq!(hit.source_file_path, src);
    assert!(index.lookup("https://docs.google.com/document/d/2/edit").unwrap().is_none());
}

#[test]
fn register_twice_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let index = DedupIndex::open_in(dir.path()).unwrap();
    let src = dir.path().join("v.mp4");
    write(&src, b"x");
    index.register("https://vimeo.com/1", &src, 1).unwrap();
    let err = index
        .register("https://vimeo.com/1?h=abc", &src, 1)
        .unwrap_err();
    assert!(matches!(err, DedupError::DuplicateRegistration { .. }));
}

#[test]
fn attach_reference_requires_entry() {
    let dir = tempfile::tempdir().unwrap();
    let index = DedupIndex::open_in(dir.path()).unwrap();
    let err = index
        .attach_reference("https://vimeo.com/9", &dir.path().join("n"), LinkKind::Copy)
        .unwrap_err();
    assert!(matches!(err, DedupError::UnknownUrl { .. }));
}

#[test]
fn stale_entry_is_purged_on_lookup_but_not_on_probe() {
    let dir = tempfile::tempdir().unwrap();
    let index = DedupIndex::open_in(dir.path()).unwrap();
    let src = dir.path().join("gone.pdf");
    write(&src, b"data");
    index.register("https://loom.com/share/1", &src, 4).unwrap();
    fs::remove_file(&src).unwrap();

    assert!(index.probe("https://loom.com/share/1").is_none());
    assert_eq!(index.statistics().unique_urls, 1);

    assert!(index.lookup("https://loom.com/share/1").unwrap().is_none());
    assert_eq!(index.statistics().unique_urls, 0);

    // The purge is durable, and the URL can be registered again.
    let reopened = DedupIndex::open_in(dir.path()).unwrap();
    assert_eq!(reopened.statistics().unique_urls, 0);
    write(&src, b"new data");
    reopened.register("https://loom.com/share/1", &src, 8).unwrap();
}

#[test]
fn statistics_and_top_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    let index = DedupIndex::open_in(dir.path()).unwrap();
    let urls = ["https://vimeo.com/1", "https://vimeo.com/2", "https://vimeo.com/3"];
    for (i, url) in urls.iter().enumerate() {
        let src = dir.path().join(format!("src{i}"));
        write(&src, b"0123456789");
        index.register(url, &src, 10).unwrap();
    }
    index.attach_reference(urls[1], &dir.path().join("r1"), LinkKind::Symlink).unwrap();
    index.attach_reference(urls[2], &dir.path().join("r2"), LinkKind::Copy).unwrap();
    index.attach_reference(urls[2], &dir.path().join("r3"), LinkKind::RecordOnly).unwrap();
    // Same path again is not a new reference.
    index.attach_reference(urls[2], &dir.path().join("r3"), LinkKind::RecordOnly).unwrap();

    let stats = index.statistics();
    assert_eq!(stats.unique_urls, 3);
    assert_eq!(stats.total_references, 3);
    assert_eq!(stats.space_saved, 30);

    let top: Vec<_> = index.top_duplicates(3).into_iter().map(|e| e.url).collect();
    assert_eq!(top, vec![urls[2], urls[1], urls[0]]);
    assert_eq!(index.top_duplicates(1).len(), 1);
}

#[test]
fn top_duplicates_ties_keep_first_seen_order() {
    let dir = tempfile::tempdir().unwrap();
    let index = DedupIndex::open_in(dir.path()).unwrap();
    for n in ["c", "a", "b"] {
        let src = dir.path().join(n);
        write(&src, b"x");
        let url = format!("https://youtu.be/{n}");
        index.register(&url, &src, 1).unwrap();
        index
            .attach_reference(&url, &dir.path().join(format!("{n}-ref")), LinkKind::Copy)
            .unwrap();
    }
    let order: Vec<_> = index.top_duplicates(10).into_iter().map(|e| e.url).collect();
    assert_eq!(
        order,
        vec!["https://youtu.be/c", "https://youtu.be/a", "https://youtu.be/b"]
    );
}

#[test]
fn corrupt_index_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(DEDUP_FILE_NAME), "not json").unwrap();
    let index = DedupIndex::open_in(dir.path()).unwrap();
    assert_eq!(index.statistics().unique_urls, 0);
}

#[test]
fn copy_creates_parent_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("a.pdf");
    write(&src, b"hello");
    let dest = dir.path().join("deep").join("er").join("b.pdf");
    materialize_link(&src, &dest, LinkKind::Copy).unwrap();
    assert_eq!(fs::read(&dest).unwrap(), b"hello");
    assert!(!fs::symlink_metadata(&dest).unwrap().file_type().is_symlink());
}

#[test]
fn record_only_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("a.pdf");
    write(&src, b"hello");
    let dest = dir.path().join("sub").join("b.pdf");
    materialize_link(&src, &dest, LinkKind::RecordOnly).unwrap();
    assert!(!dest.exists());
    assert!(!dir.path().join("sub").exists());
}

#[cfg(unix)]
#[test]
fn symlink_points_at_source_and_replaces_existing() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("a.pdf");
    write(&src, b"hello");
    let dest = dir.path().join("out").join("b.pdf");
    write(&dest, b"stale");

    materialize_link(&src, &dest, LinkKind::Symlink).unwrap();
    let meta = fs::symlink_metadata(&dest).unwrap();
    assert!(meta.file_type().is_symlink());
    assert_eq!(fs::read(&dest).unwrap(), b"hello");
}

#[test]
fn link_kind_parses_cli_spellings() {
    assert_eq!("symlink".parse::<LinkKind>().unwrap(), LinkKind::Symlink);
    assert_eq!("COPY".parse::<LinkKind>().unwrap(), LinkKind::Copy);
    assert_eq!("record-only".parse::<LinkKind>().unwrap(), LinkKind::RecordOnly);
    assert!("hardlink".parse::<LinkKind>().is_err());
}
