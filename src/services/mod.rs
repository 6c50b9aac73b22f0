//! Service layer for the watcher.
//!
//! This module contains the business logic for:
//! - Page parsing (`HtmlParser`)
//! - Listing fingerprints (`Fingerprinter`)
//! - Known-listing lookups (`DedupStore`)
//! - Date-marker exclusion (`DateFilter`)
//! - Digest messages (`NotificationComposer`, `SendmailNotifier`)

mod dedup;
mod filter;
mod fingerprint;
mod notify;
mod parser;

pub use dedup::DedupStore;
pub use filter::DateFilter;
pub use fingerprint::{Fingerprinter, ListingProbe};
pub use notify::{NotificationComposer, Notifier, SendmailNotifier, to_ascii};
pub use parser::{HtmlParser, PageParser};
