//! Wire formats of the chart and search endpoints.

use crate::series::{DailyRow, Listing};
use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

/// Top level chart response.
///
/// ```json
/// {"chart":{"result":[{"meta":{"gmtoffset":32400},"timestamp":[1760572800],
///   "indicators":{"quote":[{"open":[100.0],"high":[112.0],"low":[98.0],
///   "close":[110.0],"volume":[1200]}]}}],"error":null}}
/// ```
#[derive(Debug, Deserialize)]
pub struct ChartResponse {
    pub chart: ChartBody,
}

#[derive(Debug, Deserialize)]
pub struct ChartBody {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub error: Option<ChartErrorBody>,
}

#[derive(Debug, Deserialize)]
pub struct ChartErrorBody {
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    #[serde(default)]
    pub meta: ChartMeta,
    #[serde(default)]
    pub timestamp: Vec<i64>,
    #[serde(default)]
    pub indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChartMeta {
    /// Seconds east of UTC for the listing's market
    #[serde(default)]
    pub gmtoffset: i32,
}

#[derive(Debug, Default, Deserialize)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<QuoteColumns>,
}

/// Column-major OHLCV; individual cells are null on halted days.
#[derive(Debug, Default, Deserialize)]
pub struct QuoteColumns {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<u64>>,
}

impl ChartResponse {
    /// Flatten into date-ordered [`DailyRow`]s, dropping rows with any missing cell.
    pub fn into_rows(self) -> Vec<DailyRow> {
        let Some(result) = self
            .chart
            .result
            .and_then(|results| results.into_iter().next())
        else {
            return vec![];
        };
        let Some(quote) = result.indicators.quote.into_iter().next() else {
            return vec![];
        };
        let Some(offset) =
            FixedOffset::east_opt(result.meta.gmtoffset).or_else(|| FixedOffset::east_opt(0))
        else {
            return vec![];
        };

        let mut rows: Vec<DailyRow> = result
            .timestamp
            .iter()
            .enumerate()
            .filter_map(|(i, ts)| {
                let date = DateTime::from_timestamp(*ts, 0)?
                    .with_timezone(&offset)
                    .date_naive();
                Some(DailyRow {
                    date,
                    open: (*quote.open.get(i)?)?,
                    high: (*quote.high.get(i)?)?,
                    low: (*quote.low.get(i)?)?,
                    close: (*quote.close.get(i)?)?,
                    volume: (*quote.volume.get(i)?)?,
                })
            })
            .collect();

        rows.sort_by_key(|row| row.date);
        rows.dedup_by_key(|row| row.date);
        rows
    }
}

/// Top level search response.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub quotes: Vec<SearchQuote>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuote {
    pub symbol: String,
    #[serde(default)]
    pub shortname: Option<String>,
    #[serde(default)]
    pub longname: Option<String>,
}

impl SearchQuote {
    /// Map a quote onto a [`Listing`] when it trades on one of the two supported boards.
    pub fn into_listing(self) -> Option<Listing> {
        let (code, suffix) = self.symbol.rsplit_once('.')?;
        let group_tag = super::Board::from_suffix(suffix)?.group_tag();
        let display_name = self.longname.or(self.shortname)?;
        Some(Listing {
            entity_code: code.to_string(),
            display_name,
            group_tag: group_tag.to_string(),
        })
    }
}
