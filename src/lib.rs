//! This crate retrieves paginated event data from a WordPress REST API and
//! keeps it usable offline.
//!
//! It provides a REST client in the [`client`] module, that can be used as a
//! stand-alone module.
//!
//! Because the remote may be slow (large sites serve a hundred-plus pages), and
//! a user-friendly app wants to display something immediately on startup, this
//! crate also provides a local cache for the fetched data in the [`cache`]
//! module.
//!
//! These two are tied together by a [`Provider`](provider::Provider): it seeds
//! its in-memory [`FilterModel`] from the cache, refreshes it from the remote
//! page by page on a background task (reporting progress over a feedback
//! channel, see the [`worker`] module), and saves completed fetches back to the
//! cache. The filtered view can be written out as an Excel workbook through the
//! [`export`] module.

pub mod config;
pub use config::Config;
pub mod error;
pub use error::{Error, PantryResult};

mod event;
pub use event::{Event, EventId};
mod category;
pub use category::{Category, CategoryId, CategoryMap};
mod snapshot;
pub use snapshot::DatasetSnapshot;

pub mod traits;
pub mod wp;
pub mod client;
pub use client::Client;
pub mod fetcher;
pub mod worker;

pub mod model;
pub use model::{FilterCriteria, FilterModel};
pub mod cache;
pub mod export;
pub mod provider;
pub use provider::Provider;
