//! Known-listing index.
//!
//! Holds the history plus the set of every title and fingerprint it
//! contains. Listings are only ever added.

use std::collections::HashSet;

use crate::models::{Digest, History, Listing};

/// Answers novelty queries against accumulated history.
#[derive(Debug, Default)]
pub struct DedupStore {
    history: History,
    titles: HashSet<String>,
    fingerprints: HashSet<Digest>,
}

impl DedupStore {
    /// Index an existing history.
    pub fn new(history: History) -> Self {
        let titles = history.iter().map(|l| l.title.clone()).collect();
        let fingerprints = history.iter().map(|l| l.fingerprint).collect();
        Self {
            history,
            titles,
            fingerprints,
        }
    }

    pub fn is_novel_title(&self, title: &str) -> bool {
        !self.titles.contains(title)
    }

    pub fn is_novel_fingerprint(&self, fingerprint: &Digest) -> bool {
        !self.fingerprints.contains(fingerprint)
    }

    /// Record an accepted listing.
    ///
    /// Callers must have checked both title and fingerprint novelty first.
    pub fn commit(&mut self, listing: Listing) {
        debug_assert!(self.is_novel_title(&listing.title));
        self.titles.insert(listing.title.clone());
        self.fingerprints.insert(listing.fingerprint);
        self.history.push(listing);
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn into_history(self) -> History {
        self.history
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }
}
