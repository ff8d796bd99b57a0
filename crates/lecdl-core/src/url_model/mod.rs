//! URL modeling: resource classification and dedup normalization.

mod classify;
mod normalize;

pub use classify::{classify_url, UrlType};
pub use normalize::{dedup_key, normalize_url};
