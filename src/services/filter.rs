//! Content exclusion by date marker.

use regex::Regex;

use crate::error::{AppError, Result};
use crate::models::FilterConfig;

/// Rejects listings whose text mentions one of a fixed set of dates.
///
/// Text and markers are both normalized: every character outside
/// `[A-Za-z0-9/]` is dropped and the rest lowercased, so "Sep. 1st" and
/// "SEP-01" both reduce to something containing a marker.
#[derive(Debug, Clone)]
pub struct DateFilter {
    markers: Vec<String>,
    strip: Regex,
}

impl DateFilter {
    pub fn new<I, S>(markers: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let strip = Regex::new(r"[^A-Za-z0-9/]").map_err(|e| AppError::config(e.to_string()))?;
        let markers: Vec<String> = markers
            .into_iter()
            .map(|m| Self::normalize_with(&strip, m.as_ref()))
            .filter(|m| !m.is_empty())
            .collect();

        if markers.is_empty() {
            return Err(AppError::config("date filter needs at least one marker"));
        }
        Ok(Self { markers, strip })
    }

    /// Build the filter if it is enabled in config.
    pub fn from_config(config: &FilterConfig) -> Result<Option<Self>> {
        if !config.date_filter {
            return Ok(None);
        }
        Self::new(&config.markers).map(Some)
    }

    pub fn is_excluded(&self, text: &str) -> bool {
        let normalized = self.normalize(text);
        self.markers.iter().any(|m| normalized.contains(m.as_str()))
    }

    pub fn normalize(&self, text: &str) -> String {
        Self::normalize_with(&self.strip, text)
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    fn normalize_with(strip: &Regex, text: &str) -> String {
        strip.replace_all(text, "").to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_filter() -> DateFilter {
        DateFilter::new(FilterConfig::default().markers).unwrap()
    }

    #[test]
    fn test_excludes_every_marker_form() {
        let filter = default_filter();
        for text in [
            "Available Sep 1",
            "pickup SEP-01 only",
            "gone by 9/1",
            "Moving out 09/01!",
            "Free until September",
            "sep.1st, first come",
        ] {
            assert!(filter.is_excluded(text), "{text} should be excluded");
        }
    }

    #[test]
    fn test_keeps_unrelated_text() {
        let filter = default_filter();
        for text in ["Free couch", "Available Sept 15", "Oct 1 pickup", "8/31"] {
            assert!(!filter.is_excluded(text), "{text} should be kept");
        }
    }

    #[test]
    fn test_normalize_strips_punctuation_and_case() {
        let filter = default_filter();
        assert_eq!(filter.normalize("Sep. 01, (9/1)!"), "sep019/1");
    }

    #[test]
    fn test_custom_markers_are_normalized() {
        let filter = DateFilter::new(["Oct 31"]).unwrap();
        assert_eq!(filter.markers(), ["oct31"]);
        assert!(filter.is_excluded("Halloween: OCT-31"));
        assert!(!filter.is_excluded("Available September"));
    }

    #[test]
    fn test_rejects_empty_marker_set() {
        assert!(DateFilter::new(["  ", "!!"]).is_err());
    }

    #[test]
    fn test_disabled_in_config() {
        let config = FilterConfig::default();
        assert!(DateFilter::from_config(&config).unwrap().is_none());

        let enabled = FilterConfig {
            date_filter: true,
            ..FilterConfig::default()
        };
        assert!(DateFilter::from_config(&enabled).unwrap().is_some());
    }
}
