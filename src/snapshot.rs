//! The dataset snapshot, the unit of caching

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::{Event, EventId};

/// The full ordered collection of events as last known, plus fetch metadata.
///
/// This is what gets persisted to and restored from the [`Cache`](crate::cache::Cache).
/// Events keep their fetch order. There is never more than one event per id: a
/// later page's record for an id already present replaces the earlier one
/// wholesale, keeping its position.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetSnapshot {
    events: Vec<Event>,
    total_pages: u32,
    pages_fetched: u32,
    fetched_at: Option<DateTime<Utc>>,
}

impl DatasetSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    /// When the snapshot was last completely fetched, or `None` if it only ever
    /// came from appended pages
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    /// Merge one page of events into the snapshot.
    ///
    /// Known ids are replaced in place, new ids are appended in the order given.
    /// Merging the same page twice leaves the snapshot unchanged.
    pub fn merge_page(&mut self, events: Vec<Event>) {
        let mut positions: HashMap<EventId, usize> = self
            .events
            .iter()
            .enumerate()
            .map(|(pos, event)| (event.id(), pos))
            .collect();

        for event in events {
            match positions.get(&event.id()) {
                Some(&pos) => self.events[pos] = event,
                None => {
                    positions.insert(event.id(), self.events.len());
                    self.events.push(event);
                }
            }
        }
    }

    /// Record how far a fetch has progressed
    pub fn record_progress(&mut self, pages_fetched: u32, total_pages: u32) {
        self.pages_fetched = pages_fetched;
        self.total_pages = total_pages;
    }

    /// Stamp the snapshot as the result of a completed fetch
    pub fn mark_fetched(&mut self, at: DateTime<Utc>) {
        self.fetched_at = Some(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn event(id: u64, categories: Vec<u64>) -> Event {
        Event::new(
            EventId(id),
            format!("Event {}", id),
            NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
            None,
            String::new(),
            categories,
            None,
        )
    }

    #[test]
    fn later_record_replaces_earlier_one_wholesale() {
        let mut snapshot = DatasetSnapshot::new();
        snapshot.merge_page(vec![event(1, vec![5])]);
        snapshot.merge_page(vec![event(1, vec![5, 6])]);

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.events()[0].categories(), &[5, 6]);
    }

    #[test]
    fn merge_page_is_idempotent() {
        let page = vec![event(1, vec![]), event(2, vec![])];

        let mut once = DatasetSnapshot::new();
        once.merge_page(page.clone());

        let mut twice = DatasetSnapshot::new();
        twice.merge_page(page.clone());
        twice.merge_page(page);

        assert_eq!(once, twice);
    }

    #[test]
    fn replaced_events_keep_their_position() {
        let mut snapshot = DatasetSnapshot::new();
        snapshot.merge_page(vec![event(1, vec![]), event(2, vec![])]);
        snapshot.merge_page(vec![event(1, vec![9]), event(3, vec![])]);

        let ids: Vec<u64> = snapshot.events().iter().map(|e| e.id().as_u64()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(snapshot.events()[0].categories(), &[9]);
    }

    #[test]
    fn serde_roundtrip_is_lossless() {
        let mut snapshot = DatasetSnapshot::new();
        snapshot.merge_page(vec![Event::new(
            EventId(7),
            "Szüreti fesztivál".to_string(),
            NaiveDate::from_ymd_opt(2026, 9, 12).unwrap(),
            Some(NaiveDate::from_ymd_opt(2026, 9, 14).unwrap()),
            "Tokaj".to_string(),
            vec![5, 6],
            Some("https://example.org/szureti".to_string()),
        )]);
        snapshot.record_progress(3, 3);
        snapshot.mark_fetched(Utc::now());

        let json = serde_json::to_string(&snapshot).unwrap();
        let back: DatasetSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot, back);
    }
}
