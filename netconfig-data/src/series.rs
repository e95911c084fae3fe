use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily OHLCV row as returned by a [`TimeSeriesProvider`](crate::TimeSeriesProvider).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DailyRow {
    /// Trading date in the entity's local market time
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl DailyRow {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// Candidate entity returned by a [`SearchProvider`](crate::SearchProvider).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Listing {
    /// Provider key, e.g. "005930"
    pub entity_code: String,
    pub display_name: String,
    /// Board the entity trades on, e.g. "KOSPI"
    pub group_tag: String,
}

/// Maximum number of [`Listing`]s a search may return.
pub const SEARCH_LIMIT: usize = 20;

/// Keep listings whose display name contains `term` (case-insensitive), capped at
/// [`SEARCH_LIMIT`]. Input order is preserved.
pub fn filter_listings<I>(term: &str, listings: I) -> Vec<Listing>
where
    I: IntoIterator<Item = Listing>,
{
    let needle = term.trim().to_lowercase();
    listings
        .into_iter()
        .filter(|listing| listing.display_name.to_lowercase().contains(&needle))
        .take(SEARCH_LIMIT)
        .collect()
}
