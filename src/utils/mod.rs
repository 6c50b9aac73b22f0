//! Utility functions and helpers.

pub mod http;
#[cfg(test)]
pub(crate) mod testing;

use url::Url;

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_url() {
        let base = Url::parse("https://sfbay.craigslist.org/search/zip").unwrap();
        assert_eq!(
            resolve_url(&base, "/sfc/zip/123.html"),
            "https://sfbay.craigslist.org/sfc/zip/123.html"
        );
        assert_eq!(
            resolve_url(&base, "https://images.craigslist.org/a_600x450.jpg"),
            "https://images.craigslist.org/a_600x450.jpg"
        );
    }
}
