//! Market data: provider abstraction, Yahoo Finance client, snapshot fetcher.

pub mod fetcher;
pub mod provider;
pub mod yahoo;

pub use fetcher::{resolve_snapshot, SnapshotFetcher};
pub use provider::{DailyClose, DataError, FetchProgress, LogProgress, QuoteProvider};
pub use yahoo::YahooProvider;
