//! Share links: canonical, cache-busted hash routes pointing back at this page.
//!
//! A share link has the form `<page origin+path>#<prefix>/<id>&_t=<millis>`.
//! Every call mints a fresh timestamp, so two links for the same file differ
//! in their `_t` suffix; that keeps QR images and link previews from being
//! served stale.

use url::Url;

use crate::api::TIMESTAMP_PARAM;
use crate::env::{Environment, page_base};

const DOWNLOAD_PATH_MARKER: &str = "/api/files/";
const DOWNLOAD_PATH_SUFFIX: &str = "/download";

/// Normalize a backend share reference into a share link.
///
/// * empty input gives an empty string
/// * a backend download URL (`.../api/files/<id>/download`) is rewritten to
///   the hash route for `<id>`
/// * any other `http...` input, or one that fails to parse, is returned
///   untouched
/// * everything else is taken as a bare file id
pub fn build_share_link(env: &dyn Environment, prefix: &str, share_url: &str) -> String {
    if share_url.is_empty() {
        return String::new();
    }
    if !share_url.starts_with("http") {
        return build_full_share(env, prefix, share_url);
    }
    let id = Url::parse(share_url)
        .ok()
        .and_then(|url| download_id(url.path()));
    match id {
        Some(id) => build_full_share(env, prefix, &id),
        None => share_url.to_string(),
    }
}

/// Share link for a known file id.
pub fn build_full_share(env: &dyn Environment, prefix: &str, file_id: &str) -> String {
    format!(
        "{}#{}/{}&{}={}",
        page_base(&env.href()),
        prefix,
        file_id,
        TIMESTAMP_PARAM,
        env.now_millis()
    )
}

/// Text to put on the clipboard for a record's share reference. References
/// that are already hash routes are copied verbatim.
pub fn copy_text_for(env: &dyn Environment, prefix: &str, share_url: &str) -> String {
    if share_url.starts_with('#') || share_url.contains(&format!("#{prefix}/")) {
        return share_url.to_string();
    }
    build_share_link(env, prefix, share_url)
}

/// Id embedded in a backend download path, first match wins.
fn download_id(path: &str) -> Option<String> {
    let mut rest = path;
    while let Some(pos) = rest.find(DOWNLOAD_PATH_MARKER) {
        let after = &rest[pos + DOWNLOAD_PATH_MARKER.len()..];
        if let Some(slash) = after.find('/') {
            let id = &after[..slash];
            if !id.is_empty() && after[slash..].starts_with(DOWNLOAD_PATH_SUFFIX) {
                return Some(id.to_string());
            }
        }
        rest = &rest[pos + 1..];
    }
    None
}
