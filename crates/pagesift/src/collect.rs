// Copyright 2026 Pagesift Contributors
// SPDX-License-Identifier: Apache-2.0

//! The resource collector: one browser run as a lazy stream.
//!
//! [`collect`] returns a finite, non-restartable stream of de-duplicated
//! [`Resource`] values. Nothing happens until the first poll. Emission
//! order is: network-observed resources (arrival order), then DOM-queried
//! resources (fixed pass order), then outbound links when enabled.
//!
//! The network observer is registered before navigation so that every
//! response during the load is visible. It is the sole producer into a
//! bounded ordered channel of already-classified candidates; the stream
//! body is the sole consumer. The browser instance is released on every
//! exit path — a pending fatal error is surfaced only after teardown, and
//! dropping the stream early kills the spawned browser process.

use crate::browser;
use crate::classify::classify_response;
use crate::config::CollectOptions;
use crate::extract;
use crate::snapshot::{DomSnapshot, SNAPSHOT_JS};
use crate::types::{Resource, SiftError, SiftResult};
use async_stream::try_stream;
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, EventResponseReceived, ResourceType as NetworkKind,
};
use chromiumoxide::page::Page;
use futures::{Stream, StreamExt};
use std::collections::HashSet;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use url::Url;

/// Capacity of the observer channel. The producer blocks (rather than
/// drops) if a page somehow produces more unconsumed responses than this.
const OBSERVER_QUEUE: usize = 1024;

/// The single-producer network observer attached to a page.
///
/// Always carries the main-document status probe; the candidate channel
/// is only populated when network-response classification is enabled.
struct NetworkObserver {
    candidates: Option<mpsc::Receiver<Resource>>,
    /// Status of the first main-frame document response.
    status: Option<oneshot::Receiver<i64>>,
    task: JoinHandle<()>,
}

/// Register the response listener and spawn the observer task.
///
/// Must be called before navigation begins; events arriving earlier than
/// registration would be lost. When `emit` is false the task only feeds
/// the status probe and exits once the document response is seen.
async fn spawn_observer(page: &Page, emit: bool) -> SiftResult<NetworkObserver> {
    page.execute(EnableParams::default()).await?;
    let main_frame = page.mainframe().await?;
    let mut events = page.event_listener::<EventResponseReceived>().await?;
    let (tx, rx) = mpsc::channel(OBSERVER_QUEUE);
    let (status_tx, status_rx) = oneshot::channel();

    let task = tokio::spawn(async move {
        let mut status_tx = Some(status_tx);
        while let Some(event) = events.next().await {
            if event.r#type == NetworkKind::Document && event.frame_id == main_frame {
                if let Some(tx) = status_tx.take() {
                    let _ = tx.send(event.response.status);
                }
            }
            if !emit {
                if status_tx.is_none() {
                    break;
                }
                continue;
            }
            let is_subframe = event.frame_id.is_some() && event.frame_id != main_frame;
            if let Some(kind) = classify_response(
                &event.r#type,
                &event.response.url,
                &event.response.mime_type,
                is_subframe,
            ) {
                if tx
                    .send(Resource::new(kind, event.response.url.clone()))
                    .await
                    .is_err()
                {
                    break;
                }
            }
        }
    });

    Ok(NetworkObserver {
        candidates: emit.then_some(rx),
        status: Some(status_rx),
        task,
    })
}

/// Release the browser instance. Always best-effort: close failures are
/// logged and never surfaced over a pending run error.
async fn teardown(mut browser: Browser, page: Option<Page>, observer: Option<JoinHandle<()>>) {
    if let Some(task) = observer {
        task.abort();
    }
    if let Some(page) = page {
        if let Err(e) = page.close().await {
            debug!("page close failed: {e}");
        }
    }
    if let Err(e) = browser.close().await {
        debug!("browser close failed: {e}");
    }
    if let Err(e) = browser.wait().await {
        debug!("browser wait failed: {e}");
    }
    debug!("browser instance released");
}

/// Emit a resource only on first sight of its URL.
fn first_seen(seen: &mut HashSet<String>, resource: Resource) -> Option<Resource> {
    seen.insert(resource.url.clone()).then_some(resource)
}

/// Collect the sub-resources of `target`.
///
/// Lazy: the browser launches and navigation happens on first poll. The
/// stream ends abnormally (a final `Err` item) on launch or navigation
/// failure; per-item extraction failures are skipped silently.
pub fn collect(target: &str, options: CollectOptions) -> ResourceStream {
    let target = target.to_string();
    let stream = try_stream! {
        let doc_base = Url::parse(&target).map_err(|source| SiftError::InvalidUrl {
            url: target.clone(),
            source,
        })?;
        info!(url = %doc_base, "starting resource collection");

        let mut seen: HashSet<String> = HashSet::new();
        let browser = browser::launch(&options.launch).await?;

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                teardown(browser, None, None).await;
                Err(SiftError::Browser(e))?;
                unreachable!()
            }
        };

        // The observer must exist before navigation starts: it carries
        // the document status gate in every variant, plus the candidate
        // channel when network classification is enabled.
        let mut observer = match spawn_observer(&page, options.observe_network).await {
            Ok(observer) => observer,
            Err(e) => {
                teardown(browser, Some(page), None).await;
                Err(e)?;
                unreachable!()
            }
        };

        let nav = page.goto(target.clone()).await.map(|_| ());
        if let Err(source) = nav {
            let url = target.clone();
            teardown(browser, Some(page), Some(observer.task)).await;
            Err(SiftError::Navigation { url, source })?;
            unreachable!()
        }
        let _ = page.wait_for_navigation().await;

        // Final status of the main document. Outside 2xx/3xx the run is
        // fatal and nothing is emitted, in both variants.
        if let Some(status_rx) = observer.status.take() {
            let status = tokio::time::timeout(options.idle_window, status_rx)
                .await
                .ok()
                .and_then(|received| received.ok());
            match status {
                Some(status) if (200..400).contains(&status) => {
                    debug!(status, "document response ok");
                }
                Some(status) => {
                    let url = target.clone();
                    teardown(browser, Some(page), Some(observer.task)).await;
                    Err(SiftError::NavigationStatus { url, status })?;
                    unreachable!()
                }
                None => {
                    let url = target.clone();
                    teardown(browser, Some(page), Some(observer.task)).await;
                    Err(SiftError::NoResponse { url })?;
                    unreachable!()
                }
            }
        }

        // Drain network-observed candidates in arrival order until the
        // quiescence window elapses with nothing new.
        if let Some(candidates) = observer.candidates.as_mut() {
            loop {
                match tokio::time::timeout(options.idle_window, candidates.recv()).await {
                    Ok(Some(candidate)) => {
                        if let Some(resource) = first_seen(&mut seen, candidate) {
                            yield resource;
                        }
                    }
                    Ok(None) => break,
                    Err(_) => break,
                }
            }
            debug!(emitted = seen.len(), "network observation quiesced");
        }

        let snapshot = if options.query_dom || options.links {
            let result: SiftResult<DomSnapshot> = async {
                let evaluated = page.evaluate(SNAPSHOT_JS).await?;
                Ok(evaluated.into_value::<DomSnapshot>()?)
            }
            .await;
            match result {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    teardown(browser, Some(page), Some(observer.task)).await;
                    Err(e)?;
                    unreachable!()
                }
            }
        } else {
            None
        };

        if let Some(snapshot) = snapshot {
            // The rendered document's own base handles <base href>.
            let dom_base = Url::parse(&snapshot.base_url).unwrap_or_else(|_| doc_base.clone());

            if options.query_dom {
                let found = extract::dom_resources(&snapshot, &dom_base);
                debug!(candidates = found.len(), "dom extraction complete");
                for candidate in found {
                    if let Some(resource) = first_seen(&mut seen, candidate) {
                        yield resource;
                    }
                }
            }

            // Outbound links are always last.
            if options.links {
                let found = extract::anchors(&snapshot.anchors, &dom_base);
                debug!(candidates = found.len(), "link extraction complete");
                for candidate in found {
                    if let Some(resource) = first_seen(&mut seen, candidate) {
                        yield resource;
                    }
                }
            }
        }

        info!(resources = seen.len(), "collection complete");
        teardown(browser, Some(page), Some(observer.task)).await;
    };

    let inner: Pin<Box<dyn Stream<Item = SiftResult<Resource>> + Send>> = Box::pin(stream);
    ResourceStream { inner }
}

/// A lazy, finite, non-restartable sequence of discovered resources.
///
/// Dropping the stream at any point — before the first poll, mid-run, or
/// after a partial read — is the cancel operation: the in-flight run is
/// abandoned and the spawned browser process is killed.
pub struct ResourceStream {
    inner: Pin<Box<dyn Stream<Item = SiftResult<Resource>> + Send>>,
}

impl Stream for ResourceStream {
    type Item = SiftResult<Resource>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl ResourceStream {
    /// Drain the whole stream, failing fast on the first fatal error.
    pub async fn collect_all(mut self) -> SiftResult<Vec<Resource>> {
        let mut out = Vec::new();
        while let Some(item) = self.next().await {
            out.push(item?);
        }
        Ok(out)
    }
}
