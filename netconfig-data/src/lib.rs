//! # Netconfig-Data
//! Daily time-series and listing-search providers consumed by the `netconfig` console.
//!
//! The console only ever talks to the two traits below:
//! * [`TimeSeriesProvider`]: ordered daily OHLCV [`DailyRow`]s for an entity code over a
//!   date range, or an empty sequence when there is no data.
//! * [`SearchProvider`]: up to [`SEARCH_LIMIT`] candidate [`Listing`]s whose display name
//!   contains a free-text term.
//!
//! [`ChartClient`](chart::ChartClient) implements both over HTTP.

use async_trait::async_trait;
use chrono::NaiveDate;

/// All [`Error`](std::error::Error)s generated in Netconfig-Data.
pub mod error;

/// Daily row and listing data types.
pub mod series;

/// HTTP chart & search adapter.
pub mod chart;

pub use chart::{Board, ChartClient, ChartConfig};
pub use error::DataError;
pub use series::{DailyRow, Listing, SEARCH_LIMIT, filter_listings};

/// Source of ordered daily OHLCV rows.
#[async_trait]
pub trait TimeSeriesProvider: Send + Sync {
    /// Fetch rows for `entity_code` dated within `[start, end]`, oldest first.
    ///
    /// An unknown entity or a range without sessions yields `Ok(vec![])`.
    async fn fetch(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        entity_code: &str,
    ) -> Result<Vec<DailyRow>, DataError>;
}

/// Free-text lookup of entity codes by display name.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, term: &str) -> Result<Vec<Listing>, DataError>;
}
