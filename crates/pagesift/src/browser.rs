//! Chromium discovery and launch via chromiumoxide.

use crate::config::LaunchOptions;
use crate::types::{SiftError, SiftResult};
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use std::path::PathBuf;
use tracing::{debug, info};

/// Names probed on the system PATH, most specific first.
const PATH_BINARIES: &[&str] = &["google-chrome", "chromium", "chromium-browser"];

/// Find the Chromium binary, trying the `PAGESIFT_CHROMIUM_PATH` env var,
/// then a `~/.pagesift/chromium/` install, then the system PATH, then
/// well-known application locations.
pub fn find_chromium() -> Option<PathBuf> {
    env_override()
        .or_else(home_install)
        .or_else(path_lookup)
        .or_else(well_known_locations)
}

fn env_override() -> Option<PathBuf> {
    let raw = std::env::var("PAGESIFT_CHROMIUM_PATH").ok()?;
    Some(PathBuf::from(raw)).filter(|p| p.exists())
}

fn home_install() -> Option<PathBuf> {
    let root = dirs::home_dir()?.join(".pagesift/chromium");
    let layouts: &[&str] = if cfg!(target_os = "macos") {
        &[
            "Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing",
            "chrome",
        ]
    } else {
        &["chrome-linux64/chrome", "chrome"]
    };
    layouts.iter().map(|l| root.join(l)).find(|p| p.exists())
}

fn path_lookup() -> Option<PathBuf> {
    PATH_BINARIES
        .iter()
        .find_map(|name| which::which(name).ok())
}

fn well_known_locations() -> Option<PathBuf> {
    if !cfg!(target_os = "macos") {
        return None;
    }
    Some(PathBuf::from(
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    ))
    .filter(|p| p.exists())
}

/// Launch a scoped headless Chromium instance and spawn its CDP handler task.
///
/// The returned [`Browser`] kills the spawned process when dropped, so a
/// consumer abandoning a run mid-way still releases the instance.
pub async fn launch(options: &LaunchOptions) -> SiftResult<Browser> {
    let executable = options
        .executable
        .clone()
        .or_else(find_chromium)
        .ok_or_else(|| {
            SiftError::Launch(
                "Chromium not found. Set PAGESIFT_CHROMIUM_PATH or install Chrome.".into(),
            )
        })?;
    debug!(path = %executable.display(), "using Chromium binary");

    let mut builder = BrowserConfig::builder()
        .chrome_executable(executable)
        .arg("--disable-gpu")
        .arg("--no-sandbox")
        .arg("--disable-dev-shm-usage")
        .arg("--disable-extensions")
        .arg("--disable-background-networking");
    if options.headless {
        builder = builder.arg("--headless=new");
    } else {
        builder = builder.with_head();
    }
    for arg in &options.args {
        builder = builder.arg(arg);
    }
    let config = builder.build().map_err(SiftError::Launch)?;

    let (browser, mut handler) = Browser::launch(config)
        .await
        .map_err(|e| SiftError::Launch(e.to_string()))?;

    // Drive the CDP connection until the browser goes away.
    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            let _ = event;
        }
    });

    info!("browser instance launched");
    Ok(browser)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_override_requires_existing_path() {
        // One test owns the env var: tests run in parallel threads.
        std::env::set_var("PAGESIFT_CHROMIUM_PATH", "/nonexistent/pagesift-chrome");
        // A bogus path in the env var must not be returned.
        assert_eq!(env_override(), None);
        let found = find_chromium();
        if let Some(path) = found {
            assert_ne!(path, PathBuf::from("/nonexistent/pagesift-chrome"));
        }

        // Any existing path is taken verbatim, before every other source.
        std::env::set_var("PAGESIFT_CHROMIUM_PATH", "/");
        assert_eq!(env_override(), Some(PathBuf::from("/")));
        assert_eq!(find_chromium(), Some(PathBuf::from("/")));
        std::env::remove_var("PAGESIFT_CHROMIUM_PATH");
    }
}
