//! Filename policy.
//!
//! Pure functions from (sheet, inherited row fields, column role) to a
//! deterministic, extension-less relative path. The fetcher attaches the
//! extension once it knows what it wrote.

mod chapter;
mod date;
mod sanitize;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::OnceLock;

pub use chapter::{extract_chapter, strip_leading_chapter};
pub use date::{parse_sheet_date, DateParseError, SheetDate};
pub use sanitize::{sanitize, DEFAULT_MAX_LEN};

/// What a URL-bearing column holds. Decides the stem suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    /// Streaming / view link for a recording.
    ViewLink,
    /// Direct download link for a recording.
    DownloadLink,
    /// N-th supplementary document column (1-based).
    Document(u8),
}

impl ColumnRole {
    /// Fixed tag appended to the stem.
    pub fn suffix(self) -> String {
        match self {
            ColumnRole::ViewLink => "video_view".to_string(),
            ColumnRole::DownloadLink => "video".to_string(),
            ColumnRole::Document(n) => format!("document-{n}"),
        }
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRole::ViewLink => write!(f, "view_link"),
            ColumnRole::DownloadLink => write!(f, "download_link"),
            ColumnRole::Document(n) => write!(f, "document_{n}"),
        }
    }
}

/// How a sheet builds its filename prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetLayout {
    /// `{YYYYMMDD}_{mode}_{title}` from year/date/mode/title columns.
    Calendar,
    /// `{chapter}_{title}` with the chapter taken from the title text.
    Chapter,
}

/// Row fields after carry-forward, as consumed by the policy.
#[derive(Debug, Clone, Default)]
pub struct StemFields<'a> {
    /// 0-based position of the row within its sheet.
    pub row_index: usize,
    pub title: &'a str,
    pub mode: &'a str,
    pub year: &'a str,
    pub date: &'a str,
}

/// Builds the sanitized stem for one (row, column) pair.
///
/// Calendar rows without a parseable date fall back to `row{N}` (1-based) as
/// the prefix; chapter rows without a chapter number fall back to `N`.
pub fn generate_stem(
    layout: SheetLayout,
    fields: &StemFields<'_>,
    role: ColumnRole,
    max_len: usize,
) -> String {
    let row_number = fields.row_index + 1;
    let suffix = role.suffix();

    let raw = match layout {
        SheetLayout::Calendar => {
            let prefix = match parse_sheet_date(fields.year, fields.date) {
                Ok(date) => date.compact(),
                Err(e) => {
                    tracing::warn!(row = row_number, "{}; using row number as prefix", e);
                    format!("row{row_number}")
                }
            };
            join_parts(&[&prefix, fields.mode, fields.title, &suffix])
        }
        SheetLayout::Chapter => {
            let chapter =
                extract_chapter(fields.title).unwrap_or_else(|| row_number.to_string());
            let title = strip_leading_chapter(fields.title);
            join_parts(&[&chapter, title, &suffix])
        }
    };

    sanitize(&raw, max_len)
}

/// Relative path `{sheet}/{stem}` under the output root.
pub fn generate_path(
    sheet_name: &str,
    layout: SheetLayout,
    fields: &StemFields<'_>,
    role: ColumnRole,
    max_len: usize,
) -> PathBuf {
    PathBuf::from(sanitize(sheet_name, max_len)).join(generate_stem(layout, fields, role, max_len))
}

fn artifact_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^.*_(?:video_view|video|document-\d+)((?:\..*)?|_folder)$").expect("static regex")
    })
}

/// What a fetcher appended to a generated stem (`.ja.srt`, `.pdf`,
/// `_folder`, or empty), recognized by the trailing role tag.
///
/// Falls back to the last extension for names that do not end in a role tag.
pub fn artifact_suffix(file_name: &str) -> String {
    if let Some(caps) = artifact_name_re().captures(file_name) {
        return caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default();
    }
    match file_name.rfind('.') {
        Some(i) if i > 0 => file_name[i..].to_string(),
        _ => String::new(),
    }
}

fn join_parts(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}
