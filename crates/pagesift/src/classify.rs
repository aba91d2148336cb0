//! Network-response classification.
//!
//! Maps an observed CDP response (request category + content type + URL +
//! frame position) to a semantic [`ResourceType`]. Responses that fit no
//! category return `None` and are dropped.

use crate::types::ResourceType;
use chromiumoxide::cdp::browser_protocol::network::ResourceType as NetworkKind;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static FAVICON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|/)(?:favicon[^/]*|apple-touch-icon[^/]*)$").expect("valid regex")
});

/// True when the URL's final path segment looks like a favicon or
/// apple-touch-icon.
fn is_favicon_url(raw: &str) -> bool {
    let path = match Url::parse(raw) {
        Ok(url) => url.path().to_owned(),
        Err(_) => raw.to_owned(),
    };
    FAVICON_RE.is_match(&path)
}

/// Classify one observed network response.
///
/// `is_subframe` is true when the response belongs to a frame other than
/// the page's main frame. `data:` URLs are dropped unconditionally.
pub fn classify_response(
    kind: &NetworkKind,
    url: &str,
    mime: &str,
    is_subframe: bool,
) -> Option<ResourceType> {
    if url.starts_with("data:") {
        return None;
    }
    match kind {
        NetworkKind::Stylesheet => Some(ResourceType::Stylesheet),
        NetworkKind::Script => Some(ResourceType::Script),
        NetworkKind::Font => Some(ResourceType::Font),
        NetworkKind::Manifest => Some(ResourceType::Manifest),
        NetworkKind::Image => Some(if is_favicon_url(url) {
            ResourceType::Favicon
        } else {
            ResourceType::Image
        }),
        NetworkKind::Media => {
            if mime.starts_with("audio/") {
                Some(ResourceType::Audio)
            } else if mime.starts_with("video/") {
                Some(ResourceType::Video)
            } else {
                None
            }
        }
        NetworkKind::Document => {
            if mime.starts_with("image/svg") {
                Some(ResourceType::Image)
            } else if is_subframe {
                Some(ResourceType::Iframe)
            } else {
                None
            }
        }
        NetworkKind::Other => {
            if mime.starts_with("application/pdf") || mime == "application/octet-stream" {
                Some(ResourceType::Object)
            } else {
                None
            }
        }
        // XHR, fetch, websockets, pings etc. are not page sub-resources.
        _ => None,
    }
}
