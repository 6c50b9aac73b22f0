//! Page parsing service.
//!
//! Extracts search results, thumbnail sources and listing text from fetched
//! HTML. The pipeline only sees the [`PageParser`] capability, never markup.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Candidate, ParserConfig};
use crate::utils::resolve_url;

/// DOM queries the pipeline needs from a fetched page.
pub trait PageParser: Send + Sync {
    /// Candidate (title, absolute URL) pairs on a search page, in page order.
    fn search_results(&self, page_url: &str, html: &str) -> Result<Vec<Candidate>>;

    /// Image URLs inside the thumbnails container, in page order.
    ///
    /// `None` when the page has no thumbnails container at all.
    fn thumbnail_sources(&self, page_url: &str, html: &str) -> Result<Option<Vec<String>>>;

    /// Human-readable text of a listing page.
    fn listing_text(&self, html: &str) -> String;
}

/// [`PageParser`] for craigslist-style markup, using `scraper`.
#[derive(Debug, Clone)]
pub struct HtmlParser {
    config: ParserConfig,
}

impl HtmlParser {
    /// Create a parser looking for the given element ids.
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    fn parse_selector(s: &str) -> Result<Selector> {
        Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
    }

    fn id_selector(tag: &str, id: &str) -> Result<Selector> {
        Self::parse_selector(&format!("{tag}[id=\"{id}\"]"))
    }

    fn base_url(page_url: &str) -> Result<Url> {
        Url::parse(page_url).map_err(|e| AppError::parse(page_url, e))
    }

    fn collect_text(element: ElementRef<'_>) -> String {
        element
            .text()
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new(ParserConfig::default())
    }
}

impl PageParser for HtmlParser {
    fn search_results(&self, page_url: &str, html: &str) -> Result<Vec<Candidate>> {
        let base = Self::base_url(page_url)?;
        let document = Html::parse_document(html);
        let link_sel = Self::parse_selector("a")?;
        let span_sel = Self::parse_selector("span")?;

        let mut candidates = Vec::new();
        for link in document.select(&link_sel) {
            // Only the first span inside the link marks a result.
            let Some(span) = link.select(&span_sel).next() else {
                continue;
            };
            if span.value().id() != Some(self.config.result_title_id.as_str()) {
                continue;
            }

            let title = Self::collect_text(span);
            let Some(href) = link.value().attr("href") else {
                log::debug!("Result '{}' has no href, skipping", title);
                continue;
            };
            if title.is_empty() {
                continue;
            }

            candidates.push(Candidate::new(title, resolve_url(&base, href)));
        }
        Ok(candidates)
    }

    fn thumbnail_sources(&self, page_url: &str, html: &str) -> Result<Option<Vec<String>>> {
        let base = Self::base_url(page_url)?;
        let document = Html::parse_document(html);
        let thumbs_sel = Self::id_selector("div", &self.config.thumbs_id)?;
        let img_sel = Self::parse_selector("img[src]")?;

        let Some(thumbs) = document.select(&thumbs_sel).next() else {
            return Ok(None);
        };

        let sources = thumbs
            .select(&img_sel)
            .filter_map(|img| img.value().attr("src"))
            .map(|src| resolve_url(&base, src))
            .collect();
        Ok(Some(sources))
    }

    fn listing_text(&self, html: &str) -> String {
        let document = Html::parse_document(html);

        let body = Self::id_selector("*", &self.config.body_id)
            .ok()
            .and_then(|sel| document.select(&sel).next().map(Self::collect_text));

        body.unwrap_or_else(|| Self::collect_text(document.root_element()))
    }
}
