//! In-memory collaborators for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::services::Notifier;
use crate::utils::http::Fetcher;

/// Serves canned pages and images, recording every URL requested.
#[derive(Default)]
pub struct FakeFetcher {
    pages: HashMap<String, String>,
    images: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<String>>,
    latency: Option<Duration>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl FakeFetcher {
    pub fn page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    /// Drop a page so fetching it fails with a 404.
    pub fn without_page(mut self, url: &str) -> Self {
        self.pages.remove(url);
        self
    }

    /// Hold every response for `latency` so overlapping requests are visible.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Highest number of requests that were in flight at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn image(mut self, url: &str, bytes: &[u8]) -> Self {
        self.images.insert(url.to_string(), bytes.to_vec());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn was_requested(&self, url: &str) -> bool {
        self.requests.lock().unwrap().iter().any(|u| u == url)
    }

    async fn record(&self, url: &str) {
        self.requests.lock().unwrap().push(url.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        self.record(url).await;
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::fetch(url, "HTTP 404"))
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        self.record(url).await;
        self.images
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::fetch(url, "HTTP 404"))
    }
}

/// Captures sent messages, optionally failing every send.
#[derive(Default)]
pub struct FakeNotifier {
    pub fail: bool,
    sent: Mutex<Vec<(String, String)>>,
}

impl FakeNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn send(&self, recipient: &str, message: &str) -> Result<()> {
        if self.fail {
            return Err(AppError::notify("connection refused"));
        }
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), message.to_string()));
        Ok(())
    }
}

/// Listing page with the given thumbnails and description.
pub fn listing_html<S: AsRef<str>>(images: &[S], body: &str) -> String {
    let imgs: String = images
        .iter()
        .map(|src| format!("<a href=\"#\"><img src=\"{}\"></a>", src.as_ref()))
        .collect();
    format!(
        "<html><body><div id=\"thumbs\">{imgs}</div>\
         <section id=\"postingbody\">{body}</section></body></html>"
    )
}

/// Search page listing the given (title, href) results.
pub fn search_html(results: &[(&str, &str)]) -> String {
    let items: String = results
        .iter()
        .map(|(title, href)| {
            format!("<li><a href=\"{href}\"><span id=\"titletextonly\">{title}</span></a></li>")
        })
        .collect();
    format!("<html><body><ul>{items}</ul></body></html>")
}
