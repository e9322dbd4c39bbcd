//! Utilities to track the progression of a fetch

use std::fmt::{Display, Error, Formatter};

use crate::category::CategoryMap;
use crate::event::Event;

/// An event that happens during a background fetch.
///
/// Exactly one of the terminal variants (`Completed`, `Failed`, `Cancelled`)
/// ends every run.
#[derive(Clone, Debug)]
pub enum FetchEvent {
    /// The category lookup finished. Absent from a run when the lookup failed;
    /// the run carries on with raw numeric ids in that case.
    CategoriesResolved(CategoryMap),
    /// One page has been retrieved
    PageCompleted {
        page: u32,
        total_pages: u32,
        events: Vec<Event>,
    },
    /// Cumulative progress, emitted after each page
    Progress { pages_done: u32, pages_total: u32 },
    /// Every page has been retrieved
    Completed { pages_total: u32 },
    /// The fetch gave up partway through
    Failed {
        error: crate::error::Error,
        pages_done: u32,
    },
    /// The fetch was cancelled between two pages
    Cancelled { pages_done: u32 },
}

impl FetchEvent {
    /// Whether this event ends a fetch run
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FetchEvent::Completed { .. } | FetchEvent::Failed { .. } | FetchEvent::Cancelled { .. }
        )
    }
}

impl Display for FetchEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match self {
            FetchEvent::CategoriesResolved(map) => write!(f, "{} categories resolved", map.len()),
            FetchEvent::PageCompleted { page, total_pages, events } => {
                write!(f, "Page {}/{} retrieved ({} events)", page, total_pages, events.len())
            }
            FetchEvent::Progress { pages_done, pages_total } => {
                write!(f, "{}/{}", pages_done, pages_total)
            }
            FetchEvent::Completed { pages_total } => {
                write!(f, "Fetch finished ({} pages)", pages_total)
            }
            FetchEvent::Failed { error, pages_done } => {
                write!(f, "Fetch failed after {} pages: {}", pages_done, error)
            }
            FetchEvent::Cancelled { pages_done } => {
                write!(f, "Fetch cancelled after {} pages", pages_done)
            }
        }
    }
}

/// See [`feedback_channel`]
pub type FeedbackSender = tokio::sync::mpsc::UnboundedSender<FetchEvent>;
/// See [`feedback_channel`]
pub type FeedbackReceiver = tokio::sync::mpsc::UnboundedReceiver<FetchEvent>;

/// Create a feedback channel, over which a background fetch reports its pages
/// and its progress.
///
/// The channel is unbounded so the background end never blocks on a slow
/// consumer; the sent values are immutable, the receiving end owns all mutation.
pub fn feedback_channel() -> (FeedbackSender, FeedbackReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// A structure that logs and forwards the feedback of a running fetch
pub struct FetchProgress {
    feedback_channel: FeedbackSender,
}

impl FetchProgress {
    pub fn new(feedback_channel: FeedbackSender) -> Self {
        Self { feedback_channel }
    }

    /// Log a warning
    pub fn warn(&self, text: &str) {
        log::warn!("{}", text);
    }
    /// Log an info
    pub fn info(&self, text: &str) {
        log::info!("{}", text);
    }
    /// Log a debug message
    pub fn debug(&self, text: &str) {
        log::debug!("{}", text);
    }

    /// Send an event to the listener. A closed channel only means the listener
    /// went away; the fetch itself carries on.
    pub fn feedback(&self, event: FetchEvent) {
        let _ = self.feedback_channel.send(event);
    }
}
