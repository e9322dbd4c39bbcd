use async_trait::async_trait;

use crate::category::Category;
use crate::error::PantryResult;
use crate::event::Event;

/// One page of the remote's paginated event listing
#[derive(Clone, Debug)]
pub struct RemotePage {
    /// The events of this page, already converted from the wire schema
    pub events: Vec<Event>,
    /// The total page count the remote reported alongside this page
    pub total_pages: u32,
}

/// Something events can be fetched from.
///
/// The real implementation is [`Client`](crate::client::Client); integration
/// tests substitute an in-memory mock, which is also how the whole pipeline can
/// be exercised without a server.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Fetch one page of the event listing.
    ///
    /// Implementations retry transient failures themselves; an `Err` means the
    /// page is definitely not coming.
    async fn fetch_events_page(&self, page: u32) -> PantryResult<RemotePage>;

    /// Fetch the full category lookup.
    /// This can be a long process on large sites, as the lookup itself is paginated.
    async fn fetch_categories(&self) -> PantryResult<Vec<Category>>;
}
