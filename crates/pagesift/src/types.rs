//! Core data types: discovered resources, their categories, and errors.

use serde::{Deserialize, Serialize};

/// A single sub-resource discovered on a page.
///
/// Immutable value object: created once per discovered reference, never
/// mutated. The `url` is always fully resolved (absolute).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Semantic category of the resource.
    pub kind: ResourceType,
    /// Absolute URL of the resource.
    pub url: String,
}

impl Resource {
    pub fn new(kind: ResourceType, url: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.into(),
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind, self.url)
    }
}

/// Closed enumeration of resource categories.
///
/// Exhaustive by design: references that fit none of these categories are
/// silently dropped during collection rather than represented by an
/// "unknown" variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Stylesheet,
    Script,
    Image,
    Favicon,
    Video,
    Audio,
    Object,
    Iframe,
    Link,
    Font,
    Manifest,
}

impl ResourceType {
    /// The snake_case wire name of the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Stylesheet => "stylesheet",
            ResourceType::Script => "script",
            ResourceType::Image => "image",
            ResourceType::Favicon => "favicon",
            ResourceType::Video => "video",
            ResourceType::Audio => "audio",
            ResourceType::Object => "object",
            ResourceType::Iframe => "iframe",
            ResourceType::Link => "link",
            ResourceType::Font => "font",
            ResourceType::Manifest => "manifest",
        }
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can end a collection run.
///
/// Per-item extraction failures (malformed attributes, cross-origin
/// stylesheets, unparseable URLs) are not represented here: the offending
/// item is skipped and the run continues.
#[derive(Debug, thiserror::Error)]
pub enum SiftError {
    /// The browser engine could not be started.
    #[error("failed to launch browser: {0}")]
    Launch(String),

    /// The navigation target is not an absolute URL.
    #[error("invalid target URL `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Navigation failed before any response was committed.
    #[error("navigation to {url} failed: {source}")]
    Navigation {
        url: String,
        #[source]
        source: chromiumoxide::error::CdpError,
    },

    /// Navigation produced no observable document response.
    #[error("navigation to {url} produced no response")]
    NoResponse { url: String },

    /// The final document response carried a non-2xx/3xx status.
    #[error("navigation to {url} failed with HTTP status {status}")]
    NavigationStatus { url: String, status: i64 },

    /// A browser round trip (page open, DOM evaluation) failed mid-run.
    #[error("browser session error: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),

    /// The DOM snapshot could not be deserialized.
    #[error("malformed DOM snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// Convenience result type.
pub type SiftResult<T> = Result<T, SiftError>;
