//! Feed list file: one search-results URL per line.

use std::fs;
use std::path::Path;

use crate::error::Result;

/// Ordered list of feed URLs configured for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedList {
    pub urls: Vec<String>,
}

impl FeedList {
    /// Parse feed-list text. Blank lines are ignored.
    pub fn parse(content: &str) -> Self {
        let urls = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Self { urls }
    }

    /// Load a feed list from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_blank_lines() {
        let text = "https://a.example/search/zip\n\n   \nhttps://b.example/search/zip\r\n";
        let feeds = FeedList::parse(text);
        assert_eq!(
            feeds.urls,
            vec![
                "https://a.example/search/zip".to_string(),
                "https://b.example/search/zip".to_string(),
            ]
        );
    }

    #[test]
    fn test_load_missing_file_fails() {
        let tmp = tempfile::TempDir::new().unwrap();
        assert!(FeedList::load(tmp.path().join("feeds.txt")).is_err());
    }
}
