//! Priority-ordered URL classification by host and path shape.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of remote resource a sheet cell points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrlType {
    Vimeo,
    Youtube,
    Loom,
    Utage,
    M3u8,
    GoogleSlides,
    GoogleSheets,
    GoogleDocs,
    GoogleDriveFile,
    GoogleDriveFolder,
    Unknown,
}

impl UrlType {
    pub fn as_str(self) -> &'static str {
        match self {
            UrlType::Vimeo => "vimeo",
            UrlType::Youtube => "youtube",
            UrlType::Loom => "loom",
            UrlType::Utage => "utage",
            UrlType::M3u8 => "m3u8",
            UrlType::GoogleSlides => "google_slides",
            UrlType::GoogleSheets => "google_sheets",
            UrlType::GoogleDocs => "google_docs",
            UrlType::GoogleDriveFile => "google_drive_file",
            UrlType::GoogleDriveFolder => "google_drive_folder",
            UrlType::Unknown => "unknown",
        }
    }

    /// Video hosts and streaming manifests.
    pub fn is_video(self) -> bool {
        matches!(
            self,
            UrlType::Vimeo | UrlType::Youtube | UrlType::Loom | UrlType::Utage | UrlType::M3u8
        )
    }
}

impl fmt::Display for UrlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Patterns checked in order; first match wins.
const PATTERNS: [(&str, UrlType); 11] = [
    ("vimeo.com", UrlType::Vimeo),
    ("youtube.com", UrlType::Youtube),
    ("youtu.be", UrlType::Youtube),
    ("loom.com", UrlType::Loom),
    ("utage-system.com", UrlType::Utage),
    (".m3u8", UrlType::M3u8),
    ("docs.google.com/presentation", UrlType::GoogleSlides),
    ("docs.google.com/spreadsheets", UrlType::GoogleSheets),
    ("docs.google.com/document", UrlType::GoogleDocs),
    ("drive.google.com/file", UrlType::GoogleDriveFile),
    ("drive.google.com/drive/folders", UrlType::GoogleDriveFolder),
];

/// Classifies a URL, case-insensitively. Never fails: unmatched input is
/// `UrlType::Unknown` and the fetcher decides what to do with it.
pub fn classify_url(url: &str) -> UrlType {
    let lower = url.to_ascii_lowercase();
    PATTERNS
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map(|(_, kind)| *kind)
        .unwrap_or(UrlType::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_hosts() {
        assert_eq!(classify_url("https://vimeo.com/123"), UrlType::Vimeo);
        assert_eq!(classify_url("https://youtu.be/abc"), UrlType::Youtube);
        assert_eq!(
            classify_url("https://www.YouTube.com/watch?v=x"),
            UrlType::Youtube
        );
        assert_eq!(classify_url("https://www.loom.com/share/x"), UrlType::Loom);
        assert_eq!(
            classify_url("https://school.utage-system.com/video/1"),
            UrlType::Utage
        );
        assert_eq!(
            classify_url("https://cdn.example.com/live/index.m3u8"),
            UrlType::M3u8
        );
    }

    #[test]
    fn google_document_shapes() {
        assert_eq!(
            classify_url("https://docs.google.com/presentation/d/1/edit"),
            UrlType::GoogleSlides
        );
        assert_eq!(
            classify_url("https://docs.google.com/spreadsheets/d/1/edit"),
            UrlType::GoogleSheets
        );
        assert_eq!(
            classify_url("https://docs.google.com/document/d/1/edit"),
            UrlType::GoogleDocs
        );
        assert_eq!(
            classify_url("https://drive.google.com/file/d/1/view"),
            UrlType::GoogleDriveFile
        );
        assert_eq!(
            classify_url("https://drive.google.com/drive/folders/abc"),
            UrlType::GoogleDriveFolder
        );
    }

    #[test]
    fn priority_order_video_before_manifest() {
        assert_eq!(
            classify_url("https://vimeo.com/stream/master.m3u8"),
            UrlType::Vimeo
        );
    }

    #[test]
    fn unmatched_is_unknown() {
        assert_eq!(classify_url("https://example.com/file.pdf"), UrlType::Unknown);
        assert_eq!(classify_url("not a url"), UrlType::Unknown);
    }
}
