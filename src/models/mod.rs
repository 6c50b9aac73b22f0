// src/models/mod.rs

//! Domain models for the watcher.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod digest;
mod feed;
mod listing;

// Re-export all public types
pub use config::{Config, CrawlerConfig, FilterConfig, NotifyConfig, ParserConfig, StoreConfig};
pub use digest::Digest;
pub use feed::FeedList;
pub use listing::{Candidate, History, Listing};
