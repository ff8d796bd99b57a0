//! Path-safe filename sanitization.

/// Default upper bound on sanitized names, in characters.
pub const DEFAULT_MAX_LEN: usize = 200;

/// Path-unsafe characters and their full-width look-alikes.
///
/// Each unsafe character maps to a distinct substitute so two names that only
/// differed in an unsafe character stay different after sanitizing.
const SUBSTITUTES: [(char, char); 9] = [
    ('/', '／'),
    ('\\', '＼'),
    (':', '：'),
    ('*', '＊'),
    ('?', '？'),
    ('"', '＂'),
    ('<', '＜'),
    ('>', '＞'),
    ('|', '｜'),
];

fn substitute(c: char) -> char {
    SUBSTITUTES
        .iter()
        .find(|(unsafe_char, _)| *unsafe_char == c)
        .map(|(_, replacement)| *replacement)
        .unwrap_or(c)
}

/// Sanitizes a candidate file name.
///
/// - Maps `/ \ : * ? " < > |` to full-width substitutes (never dropped)
/// - Removes newlines, carriage returns and tabs
/// - Collapses every other whitespace run to a single space and trims
/// - Truncates to `max_len` characters without splitting a code point
///
/// The result is a fixed point: `sanitize(&sanitize(x, n), n) == sanitize(x, n)`.
pub fn sanitize(raw: &str, max_len: usize) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;

    for c in raw.chars() {
        if matches!(c, '\n' | '\r' | '\t') {
            continue;
        }
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(substitute(c));
    }

    match out.char_indices().nth(max_len) {
        Some((cut, _)) => out[..cut].trim_end().to_string(),
        None => out,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_unsafe_chars_to_full_width() {
        assert_eq!(sanitize("a/b\\c:d", 200), "a／b＼c：d");
        assert_eq!(sanitize("q?*\"<>|", 200), "q？＊＂＜＞｜");
    }

    #[test]
    fn distinct_unsafe_chars_stay_distinct() {
        assert_ne!(sanitize("a/b", 200), sanitize("a\\b", 200));
        assert_ne!(sanitize("a:b", 200), sanitize("a|b", 200));
    }

    #[test]
    fn strips_newlines_and_tabs() {
        assert_eq!(sanitize("line1\nline2\ttab", 200), "line1line2tab");
        assert_eq!(sanitize("crlf\r\nend", 200), "crlfend");
    }

    #[test]
    fn collapses_whitespace_and_trims() {
        assert_eq!(sanitize("  many    spaces  here ", 200), "many spaces here");
        assert_eq!(sanitize("全角\u{3000}\u{3000}空白", 200), "全角 空白");
    }

    #[test]
    fn truncates_on_char_boundary() {
        let s = "講義".repeat(150);
        let out = sanitize(&s, 200);
        assert_eq!(out.chars().count(), 200);
        assert!(out.starts_with("講義講義"));
    }

    #[test]
    fn truncation_does_not_leave_trailing_space() {
        assert_eq!(sanitize("abc def", 4), "abc");
    }

    #[test]
    fn sanitize_is_idempotent() {
        let inputs = vec![
            "plain".to_string(),
            "  a / b : c  ".to_string(),
            "tab\tand\nnewline".to_string(),
            "x".repeat(250) + " tail",
            "abc def".to_string(),
            "\u{3000}lead and trail\u{3000}".to_string(),
            "1-1.Overview?".to_string(),
        ];
        for input in &inputs {
            for max in [4usize, 10, 200] {
                let once = sanitize(input, max);
                assert_eq!(sanitize(&once, max), once, "input {input:?} max {max}");
            }
        }
    }
}
