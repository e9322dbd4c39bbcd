//! This module ties the remote source, the local cache and the filter model
//! together
//!
//! A [`Provider`] lives on the interactive side of the pipeline and is the
//! single writer of the model, the category map and the cache. The background
//! side (the [`FetchWorker`](crate::worker::FetchWorker) it spawns) only ever
//! publishes immutable [`FetchEvent`]s; the interactive side drains them and
//! feeds each one to [`Provider::apply`].

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;

use crate::cache::Cache;
use crate::config::Config;
use crate::error::{Error, PantryResult};
use crate::event::Event;
use crate::export;
use crate::model::{FilterCriteria, FilterModel};
use crate::category::CategoryMap;
use crate::traits::EventSource;
use crate::worker::progress::{FeedbackReceiver, FetchEvent};
use crate::worker::{FetchWorker, WorkerHandle};

/// How a finished fetch run ended
#[derive(Clone, Debug, PartialEq)]
pub enum FetchOutcome {
    Completed,
    Failed { detail: String, pages_done: u32 },
    Cancelled { pages_done: u32 },
}

/// Combines an [`EventSource`] with a local [`Cache`] and a [`FilterModel`].
///
/// On startup, [`load_cached`](Self::load_cached) seeds the model so an app has
/// rows to show immediately; [`start_fetch`](Self::start_fetch) then refreshes
/// them from the remote, page by page. Only completed fetches are written back
/// to the cache, so the cache never holds a partially fetched snapshot.
pub struct Provider<S: EventSource + 'static> {
    source: Arc<S>,
    cache: Cache,
    model: FilterModel,
    categories: CategoryMap,
    worker: Option<WorkerHandle>,
    last_outcome: Option<FetchOutcome>,
}

impl<S: EventSource + 'static> Provider<S> {
    /// Create a provider around an already constructed source.
    ///
    /// `config` supplies the cache location, the dataset identity and the
    /// default filter; the source keeps whatever configuration it was built with.
    pub fn new(source: S, config: &Config) -> Self {
        Self {
            source: Arc::new(source),
            cache: Cache::new(&config.cache_folder, &config.dataset_id),
            model: FilterModel::new(config.default_filter.clone()),
            categories: CategoryMap::new(),
            worker: None,
            last_outcome: None,
        }
    }

    /// Returns the local cache
    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Returns the filter model
    pub fn model(&self) -> &FilterModel {
        &self.model
    }

    /// The category lookup as currently known
    pub fn categories(&self) -> &CategoryMap {
        &self.categories
    }

    /// How the last finished fetch run ended, if any has finished yet
    pub fn last_outcome(&self) -> Option<&FetchOutcome> {
        self.last_outcome.as_ref()
    }

    /// Seed the model and the category map from the cache files.
    ///
    /// Returns whether a cached snapshot was found. Failing to read the cache
    /// is the same as not having one.
    pub fn load_cached(&mut self) -> bool {
        if let Some(map) = self.cache.load_categories() {
            self.categories = map;
        }
        match self.cache.load() {
            Some(snapshot) => {
                log::info!(
                    "Loaded {} cached events (fetched at {:?})",
                    snapshot.len(),
                    snapshot.fetched_at()
                );
                let criteria = self.model.criteria().clone();
                self.model = FilterModel::from_snapshot(snapshot, criteria);
                true
            }
            None => false,
        }
    }

    /// Whether a background fetch is currently running
    pub fn fetch_in_progress(&self) -> bool {
        match &self.worker {
            Some(handle) => !handle.is_finished(),
            None => false,
        }
    }

    /// Start a background fetch and return the receiving end of its feedback
    /// channel. Feed every received event to [`apply`](Self::apply).
    ///
    /// At most one fetch runs at a time per provider: while one is running,
    /// further calls are rejected with [`Error::FetchInProgress`] (they do not
    /// cancel the running one).
    pub fn start_fetch(&mut self) -> PantryResult<FeedbackReceiver> {
        if self.fetch_in_progress() {
            return Err(Error::FetchInProgress);
        }

        let worker = FetchWorker::new(Arc::clone(&self.source));
        let (handle, receiver) = worker.spawn();
        self.worker = Some(handle);
        self.last_outcome = None;
        Ok(receiver)
    }

    /// Ask the running fetch (if any) to stop after the page in flight
    pub fn cancel_fetch(&self) {
        if let Some(handle) = &self.worker {
            handle.cancel();
        }
    }

    /// Apply one event drained from the feedback channel.
    ///
    /// Pages are merged into the model as they arrive, so the view grows while
    /// the fetch is still running. On `Completed` the snapshot is stamped and
    /// saved; a failed save is logged and swallowed, since the in-memory data
    /// stays perfectly usable. `Failed` and `Cancelled` leave the model as the
    /// last completed page left it.
    pub fn apply(&mut self, event: FetchEvent) {
        match event {
            FetchEvent::CategoriesResolved(map) => {
                self.categories = map;
            }
            FetchEvent::PageCompleted { page, total_pages, events } => {
                self.model.append(events);
                self.model.snapshot_mut().record_progress(page, total_pages);
            }
            FetchEvent::Progress { .. } => {
                // Display-only; the model already tracks its own page counts
            }
            FetchEvent::Completed { .. } => {
                self.model.snapshot_mut().mark_fetched(Utc::now());
                if let Err(err) = self.cache.save(self.model.snapshot()) {
                    log::warn!("The fetched data could not be cached: {}", err);
                }
                if !self.categories.is_empty() {
                    if let Err(err) = self.cache.save_categories(&self.categories) {
                        log::warn!("The category lookup could not be cached: {}", err);
                    }
                }
                self.worker = None;
                self.last_outcome = Some(FetchOutcome::Completed);
            }
            FetchEvent::Failed { error, pages_done } => {
                log::error!("Fetch failed after {} pages: {}", pages_done, error);
                self.worker = None;
                self.last_outcome = Some(FetchOutcome::Failed {
                    detail: error.to_string(),
                    pages_done,
                });
            }
            FetchEvent::Cancelled { pages_done } => {
                self.worker = None;
                self.last_outcome = Some(FetchOutcome::Cancelled { pages_done });
            }
        }
    }

    /// Replace the active filter criteria
    pub fn set_filter(&mut self, criteria: FilterCriteria) {
        self.model.set_filter(criteria);
    }

    /// The currently visible (filtered, ordered) events
    pub fn visible_rows(&self) -> impl Iterator<Item = &Event> {
        self.model.visible_rows()
    }

    /// Export exactly the currently visible rows to an xlsx workbook
    pub fn export_filtered(&self, destination: &Path) -> PantryResult<()> {
        export::export_events(self.model.visible_rows(), &self.categories, destination)
    }
}
