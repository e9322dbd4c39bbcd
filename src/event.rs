//! Calendar events

use std::fmt::{Display, Formatter};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::category::CategoryId;

/// The identifier the remote assigns to an event. Stable across fetches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventId(pub u64);

impl EventId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for EventId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl Display for EventId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.0)
    }
}

/// One calendar entry, as fetched from the remote.
///
/// Events are immutable once fetched: a later fetch for the same id replaces the
/// whole record, fields are never merged one by one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    id: EventId,
    title: String,
    /// The feed carries plain dates (no clock time) for events
    start: NaiveDate,
    end: Option<NaiveDate>,
    location: String,
    categories: Vec<CategoryId>,
    /// Permalink of the event's page on the remote site
    link: Option<String>,
}

impl Event {
    pub fn new(
        id: EventId,
        title: String,
        start: NaiveDate,
        end: Option<NaiveDate>,
        location: String,
        categories: Vec<CategoryId>,
        link: Option<String>,
    ) -> Self {
        Self {
            id,
            title,
            start,
            end,
            location,
            categories,
            link,
        }
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.end
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn categories(&self) -> &[CategoryId] {
        &self.categories
    }

    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }
}
