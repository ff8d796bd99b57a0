//! Chapter numbers embedded in content titles (`1-1.Overview`, `3 Intro`).

use regex::Regex;
use std::sync::OnceLock;

fn chapter_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+-\d+|\d+)").expect("static regex"))
}

fn leading_chapter_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:\d+-\d+|\d+)\.?").expect("static regex"))
}

/// First `<int>-<int>` or bare `<int>` anywhere in the title.
pub fn extract_chapter(title: &str) -> Option<String> {
    chapter_re()
        .find(title)
        .map(|m| m.as_str().to_string())
}

/// Title with a leading chapter number (and its trailing dot) removed.
pub fn strip_leading_chapter(title: &str) -> &str {
    match leading_chapter_re().find(title) {
        Some(m) => title[m.end()..].trim(),
        None => title.trim(),
    }
}
