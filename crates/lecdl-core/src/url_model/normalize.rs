//! URL normalization and dedup keys.

use sha2::{Digest, Sha256};

/// Normalizes a URL down to `scheme://host[:port]/path` without query,
/// fragment, or trailing `/`, so cosmetic variants of one resource collide.
///
/// Input that does not parse as a URL is used verbatim (minus a trailing `/`)
/// so it still gets a stable key.
pub fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();
    let normalized = match url::Url::parse(trimmed) {
        Ok(parsed) => {
            let mut out = format!("{}://", parsed.scheme());
            if let Some(host) = parsed.host_str() {
                out.push_str(host);
            }
            if let Some(port) = parsed.port() {
                out.push_str(&format!(":{port}"));
            }
            out.push_str(parsed.path());
            out
        }
        Err(_) => trimmed.to_string(),
    };
    normalized.trim_end_matches('/').to_string()
}

/// Lowercase hex SHA-256 of the normalized URL.
pub fn dedup_key(url: &str) -> String {
    let digest = Sha256::digest(normalize_url(url).as_bytes());
    hex::encode(digest)
}
