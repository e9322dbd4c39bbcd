//! The lazy, in-order page sequence over an [`EventSource`]

use crate::error::PantryResult;
use crate::event::Event;
use crate::traits::EventSource;

/// One page, as yielded by [`PageFetcher::next_page`]
#[derive(Clone, Debug)]
pub struct FetchedPage {
    /// 1-based page number
    pub page: u32,
    /// The total page count of the whole listing (latched from page 1)
    pub total_pages: u32,
    pub events: Vec<Event>,
}

/// Produces the pages `1..=total` of a listing, strictly in page order.
///
/// The total page count is read from the first page's response and kept for the
/// rest of the run: if the remote reports a different value on a later page
/// (the data changed server-side mid-fetch), the discrepancy is logged and the
/// original total stays authoritative rather than restarting the fetch.
pub struct PageFetcher<'a, S: EventSource + ?Sized> {
    source: &'a S,
    /// Total as latched from page 1; `None` until page 1 has been fetched
    total_pages: Option<u32>,
    next_page: u32,
    pages_done: u32,
    exhausted: bool,
}

impl<'a, S: EventSource + ?Sized> PageFetcher<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            total_pages: None,
            next_page: 1,
            pages_done: 0,
            exhausted: false,
        }
    }

    /// The total page count, once known
    pub fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }

    /// How many pages have been yielded so far.
    /// This is the last-known good progress when a fetch fails partway.
    pub fn pages_done(&self) -> u32 {
        self.pages_done
    }

    /// Fetch and yield the next page.
    ///
    /// Returns `Ok(None)` once every page has been yielded. A reported total of
    /// zero yields no pages at all. An `Err` ends the sequence: the source has
    /// already exhausted its retries by the time it surfaces here.
    pub async fn next_page(&mut self) -> PantryResult<Option<FetchedPage>> {
        if self.exhausted {
            return Ok(None);
        }
        if let Some(total) = self.total_pages {
            if self.next_page > total {
                self.exhausted = true;
                return Ok(None);
            }
        }

        let page = self.next_page;
        let remote_page = self.source.fetch_events_page(page).await?;

        let total = match self.total_pages {
            None => {
                // First page: latch the total
                self.total_pages = Some(remote_page.total_pages);
                if remote_page.total_pages == 0 {
                    log::debug!("The listing reports zero pages, nothing to fetch");
                    self.exhausted = true;
                    return Ok(None);
                }
                remote_page.total_pages
            }
            Some(total) => {
                if remote_page.total_pages != total {
                    log::warn!(
                        "Total page count changed mid-fetch ({} -> {}), keeping the original",
                        total,
                        remote_page.total_pages
                    );
                }
                total
            }
        };

        self.next_page += 1;
        self.pages_done += 1;
        if self.next_page > total {
            self.exhausted = true;
        }

        Ok(Some(FetchedPage {
            page,
            total_pages: total,
            events: remote_page.events,
        }))
    }
}
