//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Listing store location
    #[serde(default)]
    pub store: StoreConfig,

    /// Content exclusion rules
    #[serde(default)]
    pub filter: FilterConfig,

    /// Digest message settings
    #[serde(default)]
    pub notify: NotifyConfig,

    /// Markup identifiers used by the page parser
    #[serde(default)]
    pub parser: ParserConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Load the config file at `path` if there is one.
    ///
    /// A missing file means defaults without a warning; a file that exists
    /// but cannot be read or parsed still warns.
    pub fn load_if_present(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("No config at {:?}, using defaults", path);
            return Self::default();
        }
        Self::load_or_default(path)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.max_concurrent == 0 {
            return Err(AppError::validation("crawler.max_concurrent must be > 0"));
        }
        if self.store.path.as_os_str().is_empty() {
            return Err(AppError::validation("store.path is empty"));
        }
        if self.filter.date_filter && self.filter.markers.is_empty() {
            return Err(AppError::validation(
                "filter.date_filter is enabled but no markers are defined",
            ));
        }
        if self.notify.sendmail.trim().is_empty() {
            return Err(AppError::validation("notify.sendmail is empty"));
        }
        if self.parser.thumbs_id.trim().is_empty() || self.parser.result_title_id.trim().is_empty()
        {
            return Err(AppError::validation("parser ids must not be empty"));
        }
        Ok(())
    }
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between feeds in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Maximum listings fingerprinted at once
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Listing store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path of the listing history file
    #[serde(default = "defaults::store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: defaults::store_path(),
        }
    }
}

/// Content exclusion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Reject listings whose text mentions a marker date
    #[serde(default)]
    pub date_filter: bool,

    /// Canonical markers, compared against normalized listing text
    #[serde(default = "defaults::markers")]
    pub markers: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            date_filter: false,
            markers: defaults::markers(),
        }
    }
}

/// Digest message settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Sender address for the `From:` header
    #[serde(default = "defaults::from")]
    pub from: String,

    /// Subject line; `{count}` is replaced with the number of listings
    #[serde(default = "defaults::subject")]
    pub subject: String,

    /// First line of the message body
    #[serde(default = "defaults::intro")]
    pub intro: String,

    /// Sendmail-compatible transport command
    #[serde(default = "defaults::sendmail")]
    pub sendmail: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            from: defaults::from(),
            subject: defaults::subject(),
            intro: defaults::intro(),
            sendmail: defaults::sendmail(),
        }
    }
}

/// Element ids the page parser looks for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Id of the `<span>` holding a search result's title
    #[serde(default = "defaults::result_title_id")]
    pub result_title_id: String,

    /// Id of the `<div>` holding a listing's thumbnails
    #[serde(default = "defaults::thumbs_id")]
    pub thumbs_id: String,

    /// Id of the element holding a listing's description
    #[serde(default = "defaults::body_id")]
    pub body_id: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            result_title_id: defaults::result_title_id(),
            thumbs_id: defaults::thumbs_id(),
            body_id: defaults::body_id(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; craigwatch/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn request_delay() -> u64 {
        500
    }
    pub fn max_concurrent() -> usize {
        4
    }

    // Store defaults
    pub fn store_path() -> PathBuf {
        PathBuf::from("craig.db")
    }

    // Filter defaults
    pub fn markers() -> Vec<String> {
        ["sep1", "sep01", "9/1", "09/01", "september"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    // Notify defaults
    pub fn from() -> String {
        "craigwatch@localhost".into()
    }
    pub fn subject() -> String {
        "{count} new listings".into()
    }
    pub fn intro() -> String {
        "New listings found:".into()
    }
    pub fn sendmail() -> String {
        "/usr/sbin/sendmail".into()
    }

    // Parser defaults
    pub fn result_title_id() -> String {
        "titletextonly".into()
    }
    pub fn thumbs_id() -> String {
        "thumbs".into()
    }
    pub fn body_id() -> String {
        "postingbody".into()
    }
}
