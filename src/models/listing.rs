//! Listing records and the persisted history.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Digest;

/// A (title, URL) pair extracted from a search page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub title: String,
    /// Absolute URL of the listing detail page
    pub url: String,
}

impl Candidate {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

/// On-disk form of a listing: `[title, fingerprint-hex, url, isoDate]`.
type ListingRecord = (String, Digest, String, NaiveDate);

/// An accepted listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ListingRecord", into = "ListingRecord")]
pub struct Listing {
    pub title: String,
    pub fingerprint: Digest,
    pub url: String,
    pub first_seen: NaiveDate,
}

impl Listing {
    pub fn new(candidate: Candidate, fingerprint: Digest, first_seen: NaiveDate) -> Self {
        Self {
            title: candidate.title,
            fingerprint,
            url: candidate.url,
            first_seen,
        }
    }
}

impl From<ListingRecord> for Listing {
    fn from((title, fingerprint, url, first_seen): ListingRecord) -> Self {
        Self {
            title,
            fingerprint,
            url,
            first_seen,
        }
    }
}

impl From<Listing> for ListingRecord {
    fn from(listing: Listing) -> Self {
        (
            listing.title,
            listing.fingerprint,
            listing.url,
            listing.first_seen,
        )
    }
}

/// Append-only sequence of every listing ever accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    listings: Vec<Listing>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, listing: Listing) {
        self.listings.push(listing);
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Listing> {
        self.listings.iter()
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }
}

impl From<Vec<Listing>> for History {
    fn from(listings: Vec<Listing>) -> Self {
        Self { listings }
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a Listing;
    type IntoIter = std::slice::Iter<'a, Listing>;

    fn into_iter(self) -> Self::IntoIter {
        self.listings.iter()
    }
}
