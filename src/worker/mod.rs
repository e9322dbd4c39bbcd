//! The background end of a fetch: runs the page sequence off the interactive
//! context and publishes [`FetchEvent`]s
//!
//! The worker never touches the filter model or the cache. It only sends
//! immutable values down the feedback channel; the interactive context drains
//! them and applies them (see [`Provider::apply`](crate::Provider::apply)), so
//! there is a single writer per model regardless of how many fetches a session
//! runs.

pub mod progress;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::category::CategoryMap;
use crate::fetcher::PageFetcher;
use crate::traits::EventSource;
use progress::{feedback_channel, FeedbackReceiver, FeedbackSender, FetchEvent, FetchProgress};

/// Cooperative cancellation for a running fetch.
///
/// Cancellation is advisory: the worker polls it between two pages, never
/// mid-request, so the page in flight still completes.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the fetch to stop after the page currently in flight
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// A handle on a spawned fetch run
pub struct WorkerHandle {
    cancel: CancelHandle,
    join: tokio::task::JoinHandle<()>,
}

impl WorkerHandle {
    /// Ask the run to stop. It will emit a `Cancelled` terminal event instead
    /// of `Completed`.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the run has emitted its terminal event and ended
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

/// Runs one fetch: the category lookup, then every page in order.
pub struct FetchWorker<S: EventSource + 'static> {
    source: Arc<S>,
    cancel: CancelHandle,
}

impl<S: EventSource + 'static> FetchWorker<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self::with_cancel_handle(source, CancelHandle::new())
    }

    /// Create a worker cancellable through an already existing handle
    pub fn with_cancel_handle(source: Arc<S>, cancel: CancelHandle) -> Self {
        Self { source, cancel }
    }

    /// The handle this run can be cancelled through
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Spawn the run on the tokio runtime and return its handle plus the
    /// receiving end of its feedback channel.
    pub fn spawn(self) -> (WorkerHandle, FeedbackReceiver) {
        let (sender, receiver) = feedback_channel();
        let cancel = self.cancel.clone();
        let join = tokio::spawn(self.run(sender));
        (WorkerHandle { cancel, join }, receiver)
    }

    /// Run the fetch to its terminal event. Usually called through [`Self::spawn`];
    /// tests can drive it directly.
    pub async fn run(self, feedback: FeedbackSender) {
        let progress = FetchProgress::new(feedback);

        // Category lookup first, so page events can already be displayed with
        // resolved names. Best-effort: a failure here never fails the fetch.
        progress.debug("Resolving categories...");
        match self.source.fetch_categories().await {
            Ok(categories) => {
                progress.feedback(FetchEvent::CategoriesResolved(CategoryMap::from_categories(
                    categories,
                )));
            }
            Err(err) => {
                progress.warn(&format!(
                    "Category lookup failed, raw ids will be displayed instead: {}",
                    err
                ));
            }
        }

        let mut fetcher = PageFetcher::new(self.source.as_ref());
        loop {
            if self.cancel.is_cancelled() {
                progress.info("Fetch cancelled, not requesting any further page");
                progress.feedback(FetchEvent::Cancelled {
                    pages_done: fetcher.pages_done(),
                });
                return;
            }

            match fetcher.next_page().await {
                Ok(Some(page)) => {
                    progress.debug(&format!("Retrieved page {}/{}", page.page, page.total_pages));
                    let pages_total = page.total_pages;
                    progress.feedback(FetchEvent::PageCompleted {
                        page: page.page,
                        total_pages: page.total_pages,
                        events: page.events,
                    });
                    progress.feedback(FetchEvent::Progress {
                        pages_done: fetcher.pages_done(),
                        pages_total,
                    });
                }
                Ok(None) => {
                    let pages_total = fetcher.total_pages().unwrap_or(0);
                    progress.info(&format!("Fetch finished ({} pages)", pages_total));
                    progress.feedback(FetchEvent::Completed { pages_total });
                    return;
                }
                Err(error) => {
                    progress.warn(&format!(
                        "Fetch failed after {} pages: {}",
                        fetcher.pages_done(),
                        error
                    ));
                    progress.feedback(FetchEvent::Failed {
                        error,
                        pages_done: fetcher.pages_done(),
                    });
                    return;
                }
            }
        }
    }
}
