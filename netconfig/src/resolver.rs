//! Status resolution: a short trailing window of daily rows reduced to one [`MetricsRecord`].

use crate::{
    allocator,
    error::{NetconfigError, Result},
    registry::Registry,
};
use chrono::{Days, Local, NaiveDate};
use futures::future::join_all;
use netconfig_data::{DailyRow, TimeSeriesProvider};
use std::fmt;
use tracing::{debug, error};

/// Calendar days of history requested per resolution.
pub const TRAILING_WINDOW_DAYS: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "UP",
            Direction::Down => "DOWN",
        }
    }

    pub fn is_up(&self) -> bool {
        matches!(self, Direction::Up)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Latest status of one entity. Computed fresh per query, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsRecord {
    pub identifier: String,
    pub display_name: String,
    pub entity_code: String,
    pub current_value: i64,
    pub delta: i64,
    /// Rounded to 2 decimals; 0 when the baseline is 0
    pub delta_percent: f64,
    pub period_high: i64,
    pub period_low: i64,
    pub volume: i64,
    pub direction: Direction,
    pub as_of_date: NaiveDate,
}

impl MetricsRecord {
    /// Position of the current value within the period range, 0 (low) to 100 (high).
    /// A flat range reports the midpoint.
    pub fn range_position(&self) -> f64 {
        if self.period_high == self.period_low {
            return 50.0;
        }
        (self.current_value - self.period_low) as f64
            / (self.period_high - self.period_low) as f64
            * 100.0
    }
}

/// Round to 2 decimal places, exact halves to the even digit (0.125 -> 0.12).
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Reduce ordered daily rows to a [`MetricsRecord`].
///
/// The latest row is current. Baseline is the previous row's close when there are at
/// least two rows, otherwise the current row's open. Returns `None` for no rows.
pub fn derive_metrics(
    identifier: &str,
    display_name: &str,
    rows: &[DailyRow],
) -> Option<MetricsRecord> {
    let (latest, earlier) = rows.split_last()?;
    let baseline = earlier.last().map(|prev| prev.close).unwrap_or(latest.open);

    let change = latest.close - baseline;
    let change_percent = if baseline != 0.0 {
        change / baseline * 100.0
    } else {
        0.0
    };

    Some(MetricsRecord {
        identifier: identifier.to_string(),
        display_name: display_name.to_string(),
        entity_code: allocator::entity_code(identifier).to_string(),
        current_value: latest.close as i64,
        delta: change as i64,
        delta_percent: round2(change_percent),
        period_high: latest.high as i64,
        period_low: latest.low as i64,
        volume: latest.volume as i64,
        direction: if change >= 0.0 {
            Direction::Up
        } else {
            Direction::Down
        },
        as_of_date: latest.date,
    })
}

/// Resolves identifiers against a [`TimeSeriesProvider`].
#[derive(Debug, Clone)]
pub struct StatusResolver<P> {
    provider: P,
    window_days: u64,
}

impl<P> StatusResolver<P>
where
    P: TimeSeriesProvider,
{
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            window_days: TRAILING_WINDOW_DAYS,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Resolve the window ending today (local time).
    pub async fn resolve(&self, identifier: &str, display_name: &str) -> Result<MetricsRecord> {
        self.resolve_at(identifier, display_name, Local::now().date_naive())
            .await
    }

    /// Resolve the window `[today - window, today]`. Provider failures are logged and
    /// reported as [`NetconfigError::NoData`].
    pub async fn resolve_at(
        &self,
        identifier: &str,
        display_name: &str,
        today: NaiveDate,
    ) -> Result<MetricsRecord> {
        let code = allocator::entity_code(identifier);
        let start = today
            .checked_sub_days(Days::new(self.window_days))
            .unwrap_or(today);

        let rows = match self.provider.fetch(start, today, code).await {
            Ok(rows) => rows,
            Err(e) => {
                error!("Interface {} check failed: {}", identifier, e);
                return Err(NetconfigError::NoData(identifier.to_string()));
            }
        };
        debug!(identifier, rows = rows.len(), "fetched trailing window");

        derive_metrics(identifier, display_name, &rows)
            .ok_or_else(|| NetconfigError::NoData(identifier.to_string()))
    }

    /// Resolve a registered identifier, naming unknown ones `Unknown_<code>`.
    pub async fn resolve_registered(
        &self,
        registry: &Registry,
        identifier: &str,
    ) -> Result<MetricsRecord> {
        let display_name = registry
            .display_name(identifier)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Unknown_{}", allocator::entity_code(identifier)));
        self.resolve(identifier, &display_name).await
    }

    /// Resolve every registered identifier concurrently; results are in registry order.
    pub async fn resolve_all(&self, registry: &Registry) -> Vec<(String, Result<MetricsRecord>)> {
        self.resolve_all_at(registry, Local::now().date_naive()).await
    }

    pub async fn resolve_all_at(
        &self,
        registry: &Registry,
        today: NaiveDate,
    ) -> Vec<(String, Result<MetricsRecord>)> {
        let lookups = registry.iter().map(|(identifier, name)| async move {
            let result = self.resolve_at(identifier, name, today).await;
            (identifier.to_string(), result)
        });
        join_all(lookups).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use netconfig_data::{DataError, Listing, SearchProvider, filter_listings};
    use std::{
        collections::HashMap,
        sync::{Arc, Mutex},
    };

    pub(crate) fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, day).unwrap()
    }

    pub(crate) fn row(day: u32, open: f64, close: f64) -> DailyRow {
        DailyRow::new(date(day), open, close.max(open) + 5.0, close.min(open) - 5.0, close, 1_000)
    }

    /// In-memory provider; codes mapped to `None` fail like a broken connection.
    #[derive(Debug, Clone, Default)]
    pub(crate) struct FakeProvider {
        pub rows: Arc<Mutex<HashMap<String, Option<Vec<DailyRow>>>>>,
        pub requests: Arc<Mutex<Vec<(NaiveDate, NaiveDate, String)>>>,
        pub listings: Arc<Mutex<Vec<Listing>>>,
    }

    impl FakeProvider {
        pub(crate) fn with(self, code: &str, rows: Option<Vec<DailyRow>>) -> Self {
            self.rows.lock().unwrap().insert(code.to_string(), rows);
            self
        }

        pub(crate) fn with_listing(self, code: &str, name: &str, group: &str) -> Self {
            self.listings.lock().unwrap().push(Listing {
                entity_code: code.to_string(),
                display_name: name.to_string(),
                group_tag: group.to_string(),
            });
            self
        }
    }

    #[async_trait]
    impl SearchProvider for FakeProvider {
        async fn search(&self, term: &str) -> std::result::Result<Vec<Listing>, DataError> {
            let listings = self.listings.lock().unwrap().clone();
            Ok(filter_listings(term, listings))
        }
    }

    #[async_trait]
    impl TimeSeriesProvider for FakeProvider {
        async fn fetch(
            &self,
            start: NaiveDate,
            end: NaiveDate,
            entity_code: &str,
        ) -> std::result::Result<Vec<DailyRow>, DataError> {
            self.requests
                .lock()
                .unwrap()
                .push((start, end, entity_code.to_string()));
            match self.rows.lock().unwrap().get(entity_code) {
                Some(Some(rows)) => Ok(rows.clone()),
                Some(None) => Err(DataError::Http("connection reset".to_string())),
                None => Ok(vec![]),
            }
        }
    }

    #[test]
    fn test_derive_metrics_two_rows() {
        let rows = vec![row(14, 98.0, 100.0), row(15, 101.0, 110.0)];

        let record = derive_metrics("eth0_005930", "삼성전자", &rows).unwrap();

        assert_eq!(record.entity_code, "005930");
        assert_eq!(record.current_value, 110);
        assert_eq!(record.delta, 10);
        assert_eq!(record.delta_percent, 10.0);
        assert_eq!(record.direction, Direction::Up);
        assert_eq!(record.period_high, 115);
        assert_eq!(record.period_low, 96);
        assert_eq!(record.as_of_date, date(15));
    }

    #[test]
    fn test_derive_metrics_single_row_uses_open() {
        let rows = vec![row(15, 120.0, 110.0)];

        let record = derive_metrics("eth0_005930", "삼성전자", &rows).unwrap();

        assert_eq!(record.delta, -10);
        assert_eq!(record.delta_percent, -8.33);
        assert_eq!(record.direction, Direction::Down);
    }

    #[test]
    fn test_derive_metrics_zero_baseline() {
        let rows = vec![row(14, 0.0, 0.0), row(15, 0.0, 50.0)];

        let record = derive_metrics("eth0_005930", "삼성전자", &rows).unwrap();

        assert_eq!(record.delta, 50);
        assert_eq!(record.delta_percent, 0.0);
        assert_eq!(record.direction, Direction::Up);
    }

    #[test]
    fn test_derive_metrics_uses_last_two_rows() {
        let rows = vec![row(13, 50.0, 50.0), row(14, 98.0, 200.0), row(15, 190.0, 190.0)];

        let record = derive_metrics("eth0_005930", "삼성전자", &rows).unwrap();

        assert_eq!(record.delta, -10);
        assert_eq!(record.delta_percent, -5.0);
    }

    #[test]
    fn test_derive_metrics_truncates_toward_zero() {
        let rows = vec![row(14, 100.0, 100.9), row(15, 100.0, 100.2)];

        let record = derive_metrics("eth0_005930", "삼성전자", &rows).unwrap();

        assert_eq!(record.current_value, 100);
        // -0.7 truncates to 0 but the direction follows the raw change
        assert_eq!(record.delta, 0);
        assert_eq!(record.direction, Direction::Down);
        assert_eq!(record.delta_percent, -0.69);
    }

    #[test]
    fn test_derive_metrics_flat_change_is_up() {
        let rows = vec![row(14, 100.0, 100.0), row(15, 100.0, 100.0)];

        let record = derive_metrics("eth0_005930", "삼성전자", &rows).unwrap();

        assert_eq!(record.delta, 0);
        assert_eq!(record.direction, Direction::Up);
    }

    #[test]
    fn test_round2_ties_to_even() {
        struct TestCase {
            input: f64,
            expected: f64,
        }

        let tests = vec![
            TestCase {
                // TC0: one tick up on 80,000
                input: 100.0 / 80_000.0 * 100.0,
                expected: 0.12,
            },
            TestCase {
                // TC1: one tick down on 80,000
                input: -100.0 / 80_000.0 * 100.0,
                expected: -0.12,
            },
            TestCase {
                // TC2: half rounds up to the even digit
                input: 3.0 / 800.0 * 100.0,
                expected: 0.38,
            },
            TestCase {
                // TC3: above half
                input: 1.716,
                expected: 1.72,
            },
            TestCase {
                // TC4: below half
                input: -1.714,
                expected: -1.71,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = round2(test.input);
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_derive_metrics_half_percent_ties_to_even() {
        let up = derive_metrics(
            "eth0_005930",
            "삼성전자",
            &[row(14, 80_000.0, 80_000.0), row(15, 80_000.0, 80_100.0)],
        )
        .unwrap();
        let down = derive_metrics(
            "eth0_005930",
            "삼성전자",
            &[row(14, 80_000.0, 80_000.0), row(15, 80_000.0, 79_900.0)],
        )
        .unwrap();

        assert_eq!(up.delta_percent, 0.12);
        assert_eq!(down.delta_percent, -0.12);
        assert_eq!(down.direction, Direction::Down);
    }

    #[test]
    fn test_derive_metrics_empty() {
        assert!(derive_metrics("eth0_005930", "삼성전자", &[]).is_none());
    }

    #[test]
    fn test_range_position() {
        let mut record = derive_metrics("eth0_005930", "x", &[row(15, 100.0, 110.0)]).unwrap();
        record.period_high = 120;
        record.period_low = 100;
        assert_eq!(record.range_position(), 50.0);

        record.current_value = 115;
        assert_eq!(record.range_position(), 75.0);

        record.period_high = 100;
        assert_eq!(record.range_position(), 50.0);
    }

    #[tokio::test]
    async fn test_resolve_requests_trailing_window() {
        let provider = FakeProvider::default().with("005930", Some(vec![row(15, 100.0, 110.0)]));
        let resolver = StatusResolver::new(provider.clone());

        let record = resolver
            .resolve_at("eth0_005930", "삼성전자", date(16))
            .await
            .unwrap();

        assert_eq!(record.current_value, 110);
        assert_eq!(
            provider.requests.lock().unwrap().as_slice(),
            &[(date(11), date(16), "005930".to_string())]
        );
    }

    #[tokio::test]
    async fn test_resolve_bare_entity_code() {
        let provider = FakeProvider::default().with("000660", Some(vec![row(15, 100.0, 90.0)]));
        let resolver = StatusResolver::new(provider);

        let record = resolver.resolve_at("000660", "SK하이닉스", date(16)).await.unwrap();

        assert_eq!(record.entity_code, "000660");
        assert_eq!(record.direction, Direction::Down);
    }

    #[tokio::test]
    async fn test_resolve_empty_and_failed_are_no_data() {
        let provider = FakeProvider::default().with("000660", None);
        let resolver = StatusResolver::new(provider);

        for identifier in ["eth0_005930", "eth1_000660"] {
            let error = resolver.resolve_at(identifier, "x", date(16)).await.unwrap_err();
            assert!(matches!(error, NetconfigError::NoData(ref id) if id == identifier));
        }
    }

    #[tokio::test]
    async fn test_resolve_all_keeps_registry_order_and_skips_failures() {
        let provider = FakeProvider::default()
            .with("005930", Some(vec![row(14, 100.0, 100.0), row(15, 100.0, 110.0)]))
            .with("000660", None)
            .with("068270", Some(vec![row(15, 200.0, 190.0)]));
        let resolver = StatusResolver::new(provider);
        let registry: Registry = [
            ("lo_068270", "셀트리온"),
            ("eth1_000660", "SK하이닉스"),
            ("eth2_035420", "NAVER"),
            ("eth0_005930", "삼성전자"),
        ]
        .into_iter()
        .collect();

        let results = resolver.resolve_all_at(&registry, date(16)).await;

        let order: Vec<_> = results.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(order, vec!["lo_068270", "eth1_000660", "eth2_035420", "eth0_005930"]);
        assert_eq!(results[0].1.as_ref().unwrap().current_value, 190);
        assert!(results[1].1.is_err());
        assert!(results[2].1.is_err());
        assert_eq!(results[3].1.as_ref().unwrap().delta, 10);
    }
}
