// Copyright 2026 Pagesift Contributors
// SPDX-License-Identifier: Apache-2.0

//! Pagesift — enumerate the sub-resources of a rendered web page.
//!
//! Drives a headless Chromium instance, observes network responses, and
//! queries the live DOM to produce a lazy, de-duplicated stream of typed
//! resources (stylesheets, scripts, images, fonts, media, iframes,
//! manifests, favicons, and optionally outbound links). Rendering,
//! fetching, and CSS/DOM parsing are delegated entirely to the browser;
//! this crate only classifies what the browser reports.
//!
//! ```no_run
//! use futures::StreamExt;
//! use pagesift::{collect, CollectOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut resources = collect("https://example.com", CollectOptions::default());
//!     while let Some(resource) = resources.next().await {
//!         let resource = resource?;
//!         println!("{} {}", resource.kind, resource.url);
//!     }
//!     Ok(())
//! }
//! ```

pub mod browser;
pub mod classify;
pub mod collect;
pub mod config;
pub mod extract;
pub mod snapshot;
pub mod types;

pub use collect::{collect, ResourceStream};
pub use config::{CollectOptions, LaunchOptions};
pub use types::{Resource, ResourceType, SiftError, SiftResult};
