//! Classify HTTP status and fetcher errors into retry policy error kinds.

use regex::Regex;
use std::sync::OnceLock;

use super::error::FetchError;
use super::policy::ErrorKind;

/// Classify an HTTP status code for retry decisions.
pub fn classify_http_status(code: u16) -> ErrorKind {
    match code {
        429 | 503 => ErrorKind::Throttled,
        500..=599 => ErrorKind::Http5xx(code),
        _ => ErrorKind::Other,
    }
}

fn http_status_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)http(?: error)?\s*:?\s*([1-5]\d\d)").expect("static regex"))
}

/// Classify free-form tool output (stderr) for retry decisions.
pub fn classify_message(message: &str) -> ErrorKind {
    if let Some(caps) = http_status_re().captures(message) {
        if let Ok(code) = caps[1].parse::<u16>() {
            let kind = classify_http_status(code);
            if kind != ErrorKind::Other {
                return kind;
            }
        }
    }
    let lower = message.to_ascii_lowercase();
    if lower.contains("timed out") || lower.contains("timeout") {
        return ErrorKind::Timeout;
    }
    if lower.contains("too many requests") || lower.contains("rate limit") {
        return ErrorKind::Throttled;
    }
    const CONNECTION_HINTS: &[&str] = &[
        "connection reset",
        "connection refused",
        "connection aborted",
        "temporary failure in name resolution",
        "name or service not known",
        "network is unreachable",
        "remote end closed connection",
    ];
    if CONNECTION_HINTS.iter().any(|h| lower.contains(h)) {
        return ErrorKind::Connection;
    }
    ErrorKind::Other
}

/// Classify a fetch error into an ErrorKind.
pub fn classify(e: &FetchError) -> ErrorKind {
    match e {
        FetchError::Timeout(_) => ErrorKind::Timeout,
        FetchError::Http(code) => classify_http_status(*code),
        FetchError::Connection(_) => ErrorKind::Connection,
        FetchError::Command { stderr, .. } => classify_message(stderr),
        FetchError::NoArtifact(_) | FetchError::Io(_) => ErrorKind::Other,
    }
}
