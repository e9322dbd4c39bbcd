//! The in-memory working set of events and its filtered view

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::category::CategoryId;
use crate::event::Event;
use crate::snapshot::DatasetSnapshot;

/// What the user wants to see. Never mutates events, only selects them.
///
/// The three clauses are ANDed together; an unset clause accepts everything.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Inclusive lower bound on the start date
    pub start_from: Option<NaiveDate>,
    /// Inclusive upper bound on the start date
    pub start_until: Option<NaiveDate>,
    /// Accepted categories. Empty means no category restriction.
    pub categories: HashSet<CategoryId>,
    /// Case-insensitive substring looked for in the title and the location
    pub text: String,
}

impl FilterCriteria {
    /// Whether an event satisfies all three clauses
    pub fn matches(&self, event: &Event) -> bool {
        if let Some(from) = self.start_from {
            if event.start() < from {
                return false;
            }
        }
        if let Some(until) = self.start_until {
            if event.start() > until {
                return false;
            }
        }

        if !self.categories.is_empty() {
            let has_accepted_category = event
                .categories()
                .iter()
                .any(|id| self.categories.contains(id));
            if !has_accepted_category {
                return false;
            }
        }

        if !self.text.is_empty() {
            let needle = self.text.to_lowercase();
            let in_title = event.title().to_lowercase().contains(&needle);
            let in_location = event.location().to_lowercase().contains(&needle);
            if !in_title && !in_location {
                return false;
            }
        }

        true
    }
}

/// Holds the working [`DatasetSnapshot`] and keeps a filtered, ordered view of
/// it up to date.
///
/// The view is recomputed once per appended page and once per filter change,
/// never per event: appends arrive in page-sized batches from the worker, so
/// that is the natural recomputation granularity.
#[derive(Clone, Debug, Default)]
pub struct FilterModel {
    snapshot: DatasetSnapshot,
    criteria: FilterCriteria,
    /// Positions into `snapshot.events()`, ordered by (start date, id)
    visible: Vec<usize>,
}

impl FilterModel {
    pub fn new(criteria: FilterCriteria) -> Self {
        Self {
            snapshot: DatasetSnapshot::new(),
            criteria,
            visible: Vec::new(),
        }
    }

    /// Adopt a snapshot restored from the cache
    pub fn from_snapshot(snapshot: DatasetSnapshot, criteria: FilterCriteria) -> Self {
        let mut model = Self {
            snapshot,
            criteria,
            visible: Vec::new(),
        };
        model.recompute();
        model
    }

    pub fn snapshot(&self) -> &DatasetSnapshot {
        &self.snapshot
    }

    pub fn snapshot_mut(&mut self) -> &mut DatasetSnapshot {
        &mut self.snapshot
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Merge one page of events into the snapshot and refresh the view
    pub fn append(&mut self, events: Vec<Event>) {
        self.snapshot.merge_page(events);
        self.recompute();
    }

    /// Replace the active criteria and refresh the view
    pub fn set_filter(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.recompute();
    }

    /// The events satisfying every active filter clause, ordered by start date,
    /// ties broken by id
    pub fn visible_rows(&self) -> impl Iterator<Item = &Event> {
        let events = self.snapshot.events();
        self.visible.iter().map(move |&pos| &events[pos])
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    fn recompute(&mut self) {
        let events = self.snapshot.events();
        let mut visible: Vec<usize> = events
            .iter()
            .enumerate()
            .filter(|(_, event)| self.criteria.matches(event))
            .map(|(pos, _)| pos)
            .collect();
        visible.sort_by_key(|&pos| (events[pos].start(), events[pos].id()));
        self.visible = visible;
    }
}
