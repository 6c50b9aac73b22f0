//! Listing fingerprint service.
//!
//! Fetches a listing's detail page, hashes every image in its thumbnails
//! container and folds the sorted image digests into one fingerprint.

use futures::stream::{self, StreamExt, TryStreamExt};
use tokio::sync::{Semaphore, SemaphorePermit};

use crate::error::{AppError, Result};
use crate::models::Digest;
use crate::services::PageParser;
use crate::utils::http::Fetcher;

/// What the pipeline learns from a listing's detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingProbe {
    pub fingerprint: Digest,
    /// Whether the fingerprint came from real images rather than a sentinel
    pub reproducible: bool,
    /// Description text, used for content exclusion
    pub text: String,
}

/// Computes order-independent fingerprints for listings.
///
/// At most `concurrency` requests are in flight at once across every
/// listing sharing this fingerprinter, page and image fetches alike.
pub struct Fingerprinter<'a> {
    fetcher: &'a dyn Fetcher,
    parser: &'a dyn PageParser,
    concurrency: usize,
    permits: Semaphore,
}

impl<'a> Fingerprinter<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, parser: &'a dyn PageParser, concurrency: usize) -> Self {
        let concurrency = concurrency.max(1);
        Self {
            fetcher,
            parser,
            concurrency,
            permits: Semaphore::new(concurrency),
        }
    }

    /// Fingerprint the listing at `url`.
    pub async fn fingerprint(&self, url: &str) -> Result<Digest> {
        Ok(self.inspect(url).await?.fingerprint)
    }

    /// Fetch the detail page, fingerprint its images and keep its text.
    ///
    /// Errors are returned as-is; the caller decides how to isolate them.
    pub async fn inspect(&self, url: &str) -> Result<ListingProbe> {
        let html = {
            let _permit = self.permit(url).await?;
            self.fetcher.fetch_text(url).await?
        };
        let sources = self.parser.thumbnail_sources(url, &html)?;
        let text = self.parser.listing_text(&html);

        let (fingerprint, reproducible) = match sources {
            Some(sources) => (self.fingerprint_images(&sources).await?, true),
            None => {
                log::debug!("No thumbnails container at {}, using sentinel", url);
                (Digest::sentinel(), false)
            }
        };

        Ok(ListingProbe {
            fingerprint,
            reproducible,
            text,
        })
    }

    /// Hash each image and combine the sorted digests.
    pub async fn fingerprint_images(&self, sources: &[String]) -> Result<Digest> {
        let digests: Vec<Digest> = stream::iter(sources)
            .map(|src| async move {
                let _permit = self.permit(src).await?;
                let bytes = self.fetcher.fetch_bytes(src).await?;
                Ok::<_, AppError>(Digest::of(&bytes))
            })
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        Ok(Digest::combine(&digests))
    }

    async fn permit(&self, url: &str) -> Result<SemaphorePermit<'_>> {
        self.permits
            .acquire()
            .await
            .map_err(|e| AppError::fetch(url, e))
    }
}
