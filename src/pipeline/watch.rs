// src/pipeline/watch.rs

//! Listing watch pipeline.
//!
//! One run loads the history, walks every feed, decides each candidate in
//! extraction order, optionally mails a digest and rewrites the store.

use std::time::Duration;

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};

use crate::error::{AppError, Result};
use crate::models::{Candidate, Config, FeedList, Listing};
use crate::services::{
    DateFilter, DedupStore, Fingerprinter, ListingProbe, NotificationComposer, Notifier,
    PageParser,
};
use crate::storage::HistoryStore;
use crate::utils::http::Fetcher;

/// Why a candidate was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    DuplicateTitle,
    DuplicateImage,
    DateExcluded,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::DuplicateTitle => "duplicate title",
            RejectReason::DuplicateImage => "duplicate images",
            RejectReason::DateExcluded => "date excluded",
        }
    }
}

/// Terminal state of one candidate.
#[derive(Debug)]
pub enum CandidateOutcome {
    Accepted(Listing),
    Rejected(RejectReason),
    /// Processing failed; the candidate was left for a later run.
    Skipped(AppError),
}

impl CandidateOutcome {
    pub fn reject_reason(&self) -> Option<RejectReason> {
        match self {
            CandidateOutcome::Rejected(reason) => Some(*reason),
            _ => None,
        }
    }
}

/// Where the digest goes, if anywhere.
#[derive(Clone, Copy)]
pub struct NotifyTarget<'a> {
    pub notifier: &'a dyn Notifier,
    pub recipient: &'a str,
}

/// What happened to the digest message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NotificationStatus {
    #[default]
    NotConfigured,
    NothingToSend,
    Sent,
    Failed(String),
}

/// Collaborators and settings for one run.
pub struct WatchContext<'a> {
    pub config: &'a Config,
    pub fetcher: &'a dyn Fetcher,
    pub parser: &'a dyn PageParser,
    pub store: &'a dyn HistoryStore,
    pub notify: Option<NotifyTarget<'a>>,
    /// Stamped on every listing accepted in this run
    pub today: NaiveDate,
}

/// Summary of a watch run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Every candidate seen, in processing order
    pub outcomes: Vec<(Candidate, CandidateOutcome)>,
    pub feed_total: usize,
    pub feed_failures: usize,
    /// History size after the run
    pub history_len: usize,
    pub notification: NotificationStatus,
}

impl RunSummary {
    /// Listings accepted this run, in order.
    pub fn accepted(&self) -> Vec<&Listing> {
        self.outcomes
            .iter()
            .filter_map(|(_, outcome)| match outcome {
                CandidateOutcome::Accepted(listing) => Some(listing),
                _ => None,
            })
            .collect()
    }

    pub fn rejected(&self, reason: RejectReason) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| outcome.reject_reason() == Some(reason))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, CandidateOutcome::Skipped(_)))
            .count()
    }
}

/// Run the watcher once over every feed.
///
/// Only a failed store save (or an invalid filter configuration) is
/// returned as an error; candidate, feed and notification failures are
/// logged and recorded in the summary.
pub async fn run_watch(ctx: &WatchContext<'_>, feeds: &FeedList) -> Result<RunSummary> {
    let date_filter = DateFilter::from_config(&ctx.config.filter)?;
    let delay = Duration::from_millis(ctx.config.crawler.request_delay_ms);
    let concurrency = ctx.config.crawler.max_concurrent.max(1);

    log::info!("Loading database from {}", ctx.store.location());
    let history = ctx.store.load().await;
    log::info!("Loaded {} known listings", history.len());
    let legacy = history.iter().filter(|l| l.fingerprint.is_legacy()).count();
    if legacy > 0 {
        log::info!("{} known listings carry MD5 fingerprints, matched by title only", legacy);
    }
    let mut known = DedupStore::new(history);

    let fingerprinter = Fingerprinter::new(ctx.fetcher, ctx.parser, concurrency);
    let mut summary = RunSummary {
        feed_total: feeds.len(),
        ..RunSummary::default()
    };

    for (index, feed) in feeds.urls.iter().enumerate() {
        if index > 0 && delay.as_millis() > 0 {
            tokio::time::sleep(delay).await;
        }

        log::info!("Querying {}", feed);
        let candidates = match fetch_candidates(ctx, feed).await {
            Ok(candidates) => candidates,
            Err(error) => {
                summary.feed_failures += 1;
                log::warn!("Failed to fetch search results {}: {}", feed, error);
                continue;
            }
        };

        log::info!("Processing {} results from {}", candidates.len(), feed);
        process_feed(
            &fingerprinter,
            &mut known,
            date_filter.as_ref(),
            candidates,
            concurrency,
            ctx.today,
            &mut summary,
        )
        .await;
    }

    summary.notification = send_digest(ctx, &summary).await;

    log::info!("Writing (potentially) updated db back to {}", ctx.store.location());
    ctx.store.save(known.history()).await?;
    summary.history_len = known.len();

    log::info!(
        "Store rewritten: {} accepted, {} duplicate titles, {} duplicate images, {} date excluded, {} skipped",
        summary.accepted().len(),
        summary.rejected(RejectReason::DuplicateTitle),
        summary.rejected(RejectReason::DuplicateImage),
        summary.rejected(RejectReason::DateExcluded),
        summary.skipped()
    );

    Ok(summary)
}

/// Fetch one search page and extract its candidates.
async fn fetch_candidates(ctx: &WatchContext<'_>, feed: &str) -> Result<Vec<Candidate>> {
    let html = ctx.fetcher.fetch_text(feed).await?;
    ctx.parser.search_results(feed, &html)
}

/// Decide every candidate of one feed.
///
/// Detail pages are fetched concurrently, but outcomes are consumed in
/// extraction order by this single writer, which re-checks novelty and
/// commits in one step.
async fn process_feed(
    fingerprinter: &Fingerprinter<'_>,
    known: &mut DedupStore,
    date_filter: Option<&DateFilter>,
    candidates: Vec<Candidate>,
    concurrency: usize,
    today: NaiveDate,
    summary: &mut RunSummary,
) {
    // Known titles never need their detail page fetched.
    let plan: Vec<(Candidate, bool)> = candidates
        .into_iter()
        .map(|candidate| {
            let novel = known.is_novel_title(&candidate.title);
            (candidate, novel)
        })
        .collect();

    let mut probes = stream::iter(plan)
        .map(|(candidate, novel)| async move {
            let probe = if novel {
                Some(fingerprinter.inspect(&candidate.url).await)
            } else {
                None
            };
            (candidate, probe)
        })
        .buffered(concurrency);

    while let Some((candidate, probe)) = probes.next().await {
        let outcome = decide(known, date_filter, &candidate, probe, today);
        report(&candidate, &outcome);
        summary.outcomes.push((candidate, outcome));
    }
}

/// Accept/reject one candidate and commit it if accepted.
fn decide(
    known: &mut DedupStore,
    date_filter: Option<&DateFilter>,
    candidate: &Candidate,
    probe: Option<Result<ListingProbe>>,
    today: NaiveDate,
) -> CandidateOutcome {
    if !known.is_novel_title(&candidate.title) {
        return CandidateOutcome::Rejected(RejectReason::DuplicateTitle);
    }

    let probe = match probe {
        Some(Ok(probe)) => probe,
        Some(Err(error)) => return CandidateOutcome::Skipped(error),
        None => return CandidateOutcome::Rejected(RejectReason::DuplicateTitle),
    };

    if !known.is_novel_fingerprint(&probe.fingerprint) {
        return CandidateOutcome::Rejected(RejectReason::DuplicateImage);
    }

    if let Some(filter) = date_filter {
        let text = format!("{} {}", candidate.title, probe.text);
        if filter.is_excluded(&text) {
            return CandidateOutcome::Rejected(RejectReason::DateExcluded);
        }
    }

    let listing = Listing::new(candidate.clone(), probe.fingerprint, today);
    known.commit(listing.clone());
    CandidateOutcome::Accepted(listing)
}

fn report(candidate: &Candidate, outcome: &CandidateOutcome) {
    match outcome {
        CandidateOutcome::Accepted(listing) => {
            log::info!("New unique listing! {} {}", listing.title, listing.url)
        }
        CandidateOutcome::Rejected(reason) => {
            log::info!("Rejected ({}): {}", reason.as_str(), candidate.title)
        }
        CandidateOutcome::Skipped(error) => log::warn!(
            "Failed to process '{}' ({}), skipping: {}",
            candidate.title,
            candidate.url,
            error
        ),
    }
}

/// Mail the digest of accepted listings; failures never abort the run.
async fn send_digest(ctx: &WatchContext<'_>, summary: &RunSummary) -> NotificationStatus {
    let Some(target) = ctx.notify else {
        return NotificationStatus::NotConfigured;
    };

    let accepted: Vec<Listing> = summary.accepted().into_iter().cloned().collect();
    if accepted.is_empty() {
        return NotificationStatus::NothingToSend;
    }

    let composer = NotificationComposer::new(&ctx.config.notify);
    let message = composer.compose(target.recipient, &accepted);

    match target.notifier.send(target.recipient, &message).await {
        Ok(()) => {
            log::info!(
                "Sent {} new listings to {}",
                accepted.len(),
                target.recipient
            );
            NotificationStatus::Sent
        }
        Err(error) => {
            log::error!("Failed to notify {}: {}", target.recipient, error);
            NotificationStatus::Failed(error.to_string())
        }
    }
}
