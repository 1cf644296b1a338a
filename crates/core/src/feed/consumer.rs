//! Cursor-driven feed drain loop
//!
//! Pulls pages from a [`FeedSource`] until one comes back empty, dispatching
//! every item in server order. Page N is fully dispatched (or stopped) before
//! page N+1 is requested. The drain stops early when:
//! - a handler returns [`FeedControl::Stop`]
//! - the cancellation token fires (checked before each fetch)
//! - the optional page budget is used up
//!
//! Fetch errors abort the drain. Nothing is retried here; the server keeps
//! its own delivery offset, so re-running the drain re-delivers whatever was
//! not acknowledged.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};
use twikey_domain::{FeedControl, Result};

use super::handlers::FeedHandler;
use super::ports::FeedSource;

/// Why a drain returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedOutcome {
    /// An empty page was returned; nothing more is available right now.
    Exhausted,
    /// A handler asked to stop.
    StoppedByCallback,
    /// The cancellation token fired before a fetch.
    Cancelled,
    /// `max_pages` fetches were issued without reaching the end.
    PageBudgetReached,
}

#[derive(Debug, Clone, Default)]
pub struct FeedOptions {
    /// Position to resume after; sent on the first fetch only.
    pub resume_after: Option<String>,
    /// Upper bound on page fetches, including the final empty one.
    pub max_pages: Option<usize>,
    pub cancel: Option<CancellationToken>,
}

impl FeedOptions {
    pub fn resume_after(mut self, cursor: impl Into<String>) -> Self {
        self.resume_after = Some(cursor.into());
        self
    }

    pub fn max_pages(mut self, pages: usize) -> Self {
        self.max_pages = Some(pages);
        self
    }

    pub fn cancel_on(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Summary of a finished drain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedReport {
    pub outcome: FeedOutcome,
    /// Non-empty pages handed to the handler.
    pub pages: usize,
    /// Items dispatched, including the one that requested a stop.
    pub events: usize,
    /// Page requests issued.
    pub fetches: usize,
    /// Cursor of the last page received, if the server sent one.
    pub last_cursor: Option<String>,
}

impl FeedReport {
    fn new() -> Self {
        Self {
            outcome: FeedOutcome::Exhausted,
            pages: 0,
            events: 0,
            fetches: 0,
            last_cursor: None,
        }
    }

    fn finish(mut self, outcome: FeedOutcome) -> Self {
        self.outcome = outcome;
        self
    }

    /// Whether the feed was read to its current end.
    pub fn is_exhausted(&self) -> bool {
        self.outcome == FeedOutcome::Exhausted
    }
}

/// Generic feed drain.
pub struct FeedConsumer;

impl FeedConsumer {
    /// Drain `source` into `handler`.
    ///
    /// # Errors
    /// Returns the first fetch error. Items already dispatched stay
    /// dispatched; the caller decides whether to drain again.
    #[instrument(skip_all, fields(feed = source.name()))]
    pub async fn drain<S, H>(
        source: &S,
        handler: &mut H,
        options: FeedOptions,
    ) -> Result<FeedReport>
    where
        S: FeedSource + ?Sized,
        H: FeedHandler<S::Item> + ?Sized,
    {
        let FeedOptions { resume_after, max_pages, cancel } = options;
        let mut resume_after = resume_after;
        let mut report = FeedReport::new();

        loop {
            if cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
                info!(pages = report.pages, events = report.events, "feed drain cancelled");
                return Ok(report.finish(FeedOutcome::Cancelled));
            }
            if max_pages.is_some_and(|budget| report.fetches >= budget) {
                info!(fetches = report.fetches, "feed page budget reached");
                return Ok(report.finish(FeedOutcome::PageBudgetReached));
            }

            let page = source.fetch_page(resume_after.take().as_deref()).await?;
            report.fetches += 1;

            if page.is_empty() {
                debug!(fetches = report.fetches, events = report.events, "feed exhausted");
                return Ok(report.finish(FeedOutcome::Exhausted));
            }

            report.pages += 1;
            if page.cursor.is_some() {
                report.last_cursor.clone_from(&page.cursor);
            }
            debug!(count = page.len(), cursor = ?page.cursor, "dispatching feed page");
            handler.start(page.cursor.as_deref(), page.len());

            for item in page.items {
                report.events += 1;
                if handler.dispatch(item) == FeedControl::Stop {
                    info!(events = report.events, "feed drain stopped by handler");
                    return Ok(report.finish(FeedOutcome::StoppedByCallback));
                }
            }
        }
    }
}
