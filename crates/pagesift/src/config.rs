//! Collection run and browser launch options.

use std::path::PathBuf;
use std::time::Duration;

/// Options for a single collection run.
#[derive(Debug, Clone)]
pub struct CollectOptions {
    /// Additionally emit outbound hyperlink targets (type `link`), after
    /// every other resource type.
    pub links: bool,
    /// Classify network responses observed during navigation. The
    /// main-document status check runs either way; disabling this only
    /// turns off response-derived resource emission.
    pub observe_network: bool,
    /// Run the DOM extraction passes after the page has loaded.
    pub query_dom: bool,
    /// Quiescence window: the network is considered idle once no response
    /// arrives for this long after the load event.
    pub idle_window: Duration,
    /// Browser launch configuration, passed through to the engine.
    pub launch: LaunchOptions,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            links: false,
            observe_network: true,
            query_dom: true,
            idle_window: Duration::from_millis(500),
            launch: LaunchOptions::default(),
        }
    }
}

/// Browser launch configuration.
///
/// Forwarded opaquely to the embedded engine on top of the standard
/// headless hardening arguments.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Explicit Chromium binary. When unset, discovery falls back to the
    /// `PAGESIFT_CHROMIUM_PATH` env var, `~/.pagesift/chromium/`, the
    /// system PATH, and common install locations.
    pub executable: Option<PathBuf>,
    /// Run headless (the default).
    pub headless: bool,
    /// Extra command-line arguments for the browser process.
    pub args: Vec<String>,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            executable: None,
            headless: true,
            args: Vec::new(),
        }
    }
}
