//! Logical path normalization.
//!
//! Maps a request URL onto the manifest's logical path space. The origin is
//! always passed explicitly; nothing here consults ambient state. The
//! normalized path is also the cache key, so cache-busting `?v=` suffixes
//! and root aliases all collapse onto one entry.

use crate::manifest::ROOT_PATH;
use crate::types::LogicalPath;

/// Normalize a request URL against an origin.
///
/// Returns `None` for URLs outside the origin. The origin itself, the origin
/// with an in-page fragment navigation, and an empty remainder all normalize
/// to the reserved root path.
pub fn normalize_request_path(url: &str, origin: &str) -> Option<LogicalPath> {
    let origin = origin.trim_end_matches('/');
    if url == origin {
        return Some(ROOT_PATH.to_string());
    }

    let rest = url.strip_prefix(origin)?;
    // Requires the separator slash, so "https://a.com" never claims
    // "https://a.common/x".
    let rest = rest.strip_prefix('/')?;

    if rest.starts_with('#') {
        return Some(ROOT_PATH.to_string());
    }

    let rest = match rest.find("?v=") {
        Some(idx) => &rest[..idx],
        None => rest,
    };

    if rest.is_empty() {
        return Some(ROOT_PATH.to_string());
    }

    Some(rest.to_string())
}
