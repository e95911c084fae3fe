//! REST adapter for a chart-style daily OHLCV endpoint and its companion search endpoint.
//!
//! Six-digit entity codes are looked up on the primary board first and on the secondary
//! board when the primary answers with nothing.

use crate::{
    DataError, SearchProvider, TimeSeriesProvider,
    series::{DailyRow, Listing, SEARCH_LIMIT, filter_listings},
};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub mod response;

use response::{ChartResponse, SearchQuote, SearchResponse};

/// Default chart endpoint; the listing symbol is appended as a path segment.
pub const DEFAULT_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart/";

/// Default search endpoint.
pub const DEFAULT_SEARCH_URL: &str = "https://query1.finance.yahoo.com/v1/finance/search";

const USER_AGENT: &str = concat!("netconfig/", env!("CARGO_PKG_VERSION"));

/// Exchange boards an entity code can be listed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Board {
    Kospi,
    Kosdaq,
}

impl Board {
    pub const ALL: [Board; 2] = [Board::Kospi, Board::Kosdaq];

    /// Symbol suffix used by the chart endpoint.
    pub fn suffix(&self) -> &'static str {
        match self {
            Board::Kospi => "KS",
            Board::Kosdaq => "KQ",
        }
    }

    pub fn from_suffix(suffix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|board| board.suffix() == suffix)
    }

    pub fn group_tag(&self) -> &'static str {
        match self {
            Board::Kospi => "KOSPI",
            Board::Kosdaq => "KOSDAQ",
        }
    }

    pub fn symbol(&self, entity_code: &str) -> String {
        format!("{}.{}", entity_code, self.suffix())
    }
}

/// [`ChartClient`] endpoints and timeouts.
#[derive(Debug, Clone)]
pub struct ChartConfig {
    pub chart_url: String,
    pub search_url: String,
    pub timeout: Duration,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            chart_url: DEFAULT_CHART_URL.to_string(),
            search_url: DEFAULT_SEARCH_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl ChartConfig {
    pub fn with_chart_url(mut self, url: impl Into<String>) -> Self {
        self.chart_url = url.into();
        self
    }

    pub fn with_search_url(mut self, url: impl Into<String>) -> Self {
        self.search_url = url.into();
        self
    }
}

/// HTTP implementation of [`TimeSeriesProvider`] and [`SearchProvider`].
#[derive(Debug, Clone)]
pub struct ChartClient {
    client: Client,
    config: ChartConfig,
}

impl ChartClient {
    pub fn new(config: ChartConfig) -> Result<Self, DataError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, config })
    }

    /// Build the chart URL for one listing symbol over `[start, end]` inclusive.
    pub fn chart_url(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Url, DataError> {
        let mut base = self.config.chart_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let mut url = Url::parse(&base)?.join(symbol)?;

        let period1 = start.and_time(NaiveTime::MIN).and_utc().timestamp();
        // End of day so the last session is included
        let period2 = end
            .succ_opt()
            .unwrap_or(end)
            .and_time(NaiveTime::MIN)
            .and_utc()
            .timestamp();

        url.query_pairs_mut()
            .append_pair("period1", &period1.to_string())
            .append_pair("period2", &period2.to_string())
            .append_pair("interval", "1d");
        Ok(url)
    }

    pub fn search_url(&self, term: &str) -> Result<Url, DataError> {
        let count = SEARCH_LIMIT.to_string();
        Url::parse_with_params(
            &self.config.search_url,
            &[("q", term), ("quotesCount", count.as_str()), ("newsCount", "0")],
        )
        .map_err(DataError::from)
    }

    async fn fetch_symbol(&self, url: Url) -> Result<Vec<DailyRow>, DataError> {
        let response = self.client.get(url.clone()).send().await?;

        if !response.status().is_success() {
            return Err(DataError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let chart = response.json::<ChartResponse>().await?;
        if let Some(error) = &chart.chart.error {
            return Err(DataError::NoData(format!(
                "{}: {}",
                error.code,
                error.description.as_deref().unwrap_or("no description")
            )));
        }

        Ok(chart.into_rows())
    }
}

#[async_trait]
impl TimeSeriesProvider for ChartClient {
    async fn fetch(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        entity_code: &str,
    ) -> Result<Vec<DailyRow>, DataError> {
        let mut last_error = None;

        for board in Board::ALL {
            let symbol = board.symbol(entity_code);
            let url = self.chart_url(&symbol, start, end)?;
            debug!(%symbol, %url, "requesting daily rows");

            match self.fetch_symbol(url).await {
                Ok(rows) if !rows.is_empty() => return Ok(rows),
                Ok(_) => debug!(%symbol, "no rows on board"),
                Err(error) if error.is_empty_result() => {
                    debug!(%symbol, %error, "symbol unknown on board")
                }
                Err(error) => {
                    warn!(%symbol, %error, "daily row request failed");
                    last_error = Some(error);
                }
            }
        }

        match last_error {
            Some(error) => Err(error),
            None => Ok(vec![]),
        }
    }
}

#[async_trait]
impl SearchProvider for ChartClient {
    async fn search(&self, term: &str) -> Result<Vec<Listing>, DataError> {
        let url = self.search_url(term)?;
        let response = self.client.get(url.clone()).send().await?;

        if !response.status().is_success() {
            return Err(DataError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let listings = response
            .json::<SearchResponse>()
            .await?
            .quotes
            .into_iter()
            .filter_map(SearchQuote::into_listing);

        Ok(narrow_listings(term, listings))
    }
}

/// Endpoint names are romanised, so only an ASCII term is matched against them locally.
/// Any other term (e.g. Hangul) is left to the endpoint's own matching.
fn narrow_listings<I>(term: &str, listings: I) -> Vec<Listing>
where
    I: IntoIterator<Item = Listing>,
{
    if term.is_ascii() {
        filter_listings(term, listings)
    } else {
        listings.into_iter().take(SEARCH_LIMIT).collect()
    }
}
