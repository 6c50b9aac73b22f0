//! Pipeline entry points.
//!
//! - `run_watch`: Poll every feed once and record never-seen listings

pub mod watch;

pub use watch::{
    CandidateOutcome, NotificationStatus, NotifyTarget, RejectReason, RunSummary, WatchContext,
    run_watch,
};
