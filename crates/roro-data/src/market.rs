use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use market_data_core::candle::Candle;
use market_data_providers::provider::CandleProvider;
use moka::future::Cache;
use rust_decimal::Decimal;
use tracing::{debug, info};

use roro_models::config::{MarketConfig, ProviderKind};

use crate::error::DataError;

/// The capitalization series is close × a fixed share count, matching the
/// dashboard's plotted series.
pub const ASSUMED_SHARES_OUTSTANDING: i64 = 1_000_000;

/// Create a market data provider based on the configured kind.
pub fn create_provider(kind: &ProviderKind) -> Result<Box<dyn CandleProvider>, DataError> {
    match kind {
        ProviderKind::Yahoo => Ok(Box::new(market_data_providers::yahoo::YahooProvider::new())),
        ProviderKind::Alpaca => {
            let provider = market_data_providers::alpaca::AlpacaProvider::from_env()
                .map_err(|e| DataError::Provider(format!("Alpaca provider: {e}")))?;
            Ok(Box::new(provider))
        }
    }
}

/// Candle access for the desk. Mockable for testing.
#[async_trait]
pub trait MarketData: Send + Sync {
    fn provider_name(&self) -> &str;

    /// Candles for a symbol over a date range, in timestamp order.
    async fn fetch_range(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Arc<Vec<Candle>>, DataError>;
}

/// Market data access for one interactive session: a provider plus a
/// session-lifetime cache of fetched ranges. Nothing touches disk.
pub struct MarketClient {
    provider: Box<dyn CandleProvider>,
    cache: Cache<String, Arc<Vec<Candle>>>,
}

impl MarketClient {
    pub fn new(provider: Box<dyn CandleProvider>, config: &MarketConfig) -> Self {
        Self {
            provider,
            cache: Cache::builder()
                .max_capacity(config.cache_max_entries)
                .time_to_live(Duration::from_secs(config.cache_ttl_seconds))
                .build(),
        }
    }

    pub fn from_config(config: &MarketConfig) -> Result<Self, DataError> {
        Ok(Self::new(create_provider(&config.provider)?, config))
    }

    pub fn cached_ranges(&self) -> u64 {
        self.cache.entry_count()
    }
}

#[async_trait]
impl MarketData for MarketClient {
    fn provider_name(&self) -> &str {
        self.provider.name()
    }

    async fn fetch_range(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Arc<Vec<Candle>>, DataError> {
        let key = format!("bars:{symbol}:{start}:{end}");
        if let Some(hit) = self.cache.get(&key).await {
            debug!(symbol, %start, %end, "Session cache hit");
            return Ok(hit);
        }

        let fetched = self
            .provider
            .fetch_candles_range(symbol, start, end)
            .await
            .map_err(|e| DataError::Provider(format!("{symbol}: {e}")))?;

        let mut candles: Vec<Candle> = Vec::new();
        for (_date, day) in &fetched {
            candles.extend(day.iter().cloned());
        }
        candles.sort_by_key(|c| c.timestamp);

        info!(
            symbol,
            count = candles.len(),
            provider = self.provider.name(),
            "Fetched market data"
        );

        let candles = Arc::new(candles);
        self.cache.insert(key, Arc::clone(&candles)).await;
        Ok(candles)
    }
}

/// One point of the capitalization series.
#[derive(Debug, Clone, PartialEq)]
pub struct CapPoint {
    pub timestamp: DateTime<Utc>,
    pub market_cap: Decimal,
}

/// Derive the capitalization series from candles, one point per candle,
/// in input order.
pub fn cap_series(candles: &[Candle]) -> Vec<CapPoint> {
    candles
        .iter()
        .map(|c| CapPoint {
            timestamp: c.timestamp,
            market_cap: c.close * Decimal::from(ASSUMED_SHARES_OUTSTANDING),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_data_providers::error::ProviderError;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;

    /// Mock provider that returns pre-configured candles per (symbol, date).
    /// The fetch counter is shared so tests can watch it after boxing.
    struct MockProvider {
        data: HashMap<(String, NaiveDate), Vec<Candle>>,
        fetch_count: Arc<StdMutex<usize>>,
    }

    impl MockProvider {
        fn new(data: HashMap<(String, NaiveDate), Vec<Candle>>) -> Self {
            Self {
                data,
                fetch_count: Arc::new(StdMutex::new(0)),
            }
        }

        fn counter(&self) -> Arc<StdMutex<usize>> {
            Arc::clone(&self.fetch_count)
        }
    }

    #[async_trait]
    impl CandleProvider for MockProvider {
        fn name(&self) -> &str {
            "mock"
        }

        async fn fetch_candles(
            &self,
            symbol: &str,
            date: NaiveDate,
        ) -> Result<Vec<Candle>, ProviderError> {
            *self.fetch_count.lock().unwrap_or_else(|e| e.into_inner()) += 1;
            Ok(self
                .data
                .get(&(symbol.to_string(), date))
                .cloned()
                .unwrap_or_default())
        }
    }

    fn candle_at(date: NaiveDate, close: Decimal) -> Candle {
        Candle {
            timestamp: date.and_hms_opt(14, 30, 0).unwrap().and_utc(),
            open: close - dec!(1.00),
            high: close + dec!(0.50),
            low: close - dec!(1.50),
            close,
            volume: 100_000,
        }
    }

    fn client_with(data: HashMap<(String, NaiveDate), Vec<Candle>>) -> MarketClient {
        MarketClient::new(Box::new(MockProvider::new(data)), &MarketConfig::default())
    }

    #[test]
    fn create_provider_yahoo_default() {
        let provider = create_provider(&ProviderKind::Yahoo).unwrap();
        assert_eq!(provider.name(), "yahoo");
    }

    #[test]
    fn create_provider_alpaca_fails_without_env() {
        // Alpaca requires ALPACA_API_KEY_ID and ALPACA_API_SECRET_KEY
        let result = create_provider(&ProviderKind::Alpaca);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn fetch_range_sorts_by_timestamp() {
        // Monday Jan 13 and Tuesday Jan 14, 2025 (both weekdays)
        let date1 = NaiveDate::from_ymd_opt(2025, 1, 13).unwrap();
        let date2 = NaiveDate::from_ymd_opt(2025, 1, 14).unwrap();

        let mut data = HashMap::new();
        data.insert(
            ("TEST".to_string(), date1),
            vec![candle_at(date1, dec!(150.00))],
        );
        data.insert(
            ("TEST".to_string(), date2),
            vec![candle_at(date2, dec!(152.00))],
        );

        let client = client_with(data);
        let candles = client.fetch_range("TEST", date1, date2).await.unwrap();

        assert_eq!(candles.len(), 2);
        assert!(candles[0].timestamp < candles[1].timestamp);
        assert_eq!(candles[1].close, dec!(152.00));
    }

    #[tokio::test]
    async fn second_fetch_is_served_from_session_cache() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 13).unwrap();
        let mut data = HashMap::new();
        data.insert(
            ("TEST".to_string(), date),
            vec![candle_at(date, dec!(150.00))],
        );

        let provider = MockProvider::new(data);
        let counter = provider.counter();
        let client = MarketClient::new(Box::new(provider), &MarketConfig::default());

        let first = client.fetch_range("TEST", date, date).await.unwrap();
        assert_eq!(first.len(), 1);
        let calls_after_first = *counter.lock().unwrap();
        assert!(calls_after_first > 0);

        let second = client.fetch_range("TEST", date, date).await.unwrap();
        assert_eq!(second.len(), 1);
        // Cache hit: the provider was not consulted again.
        assert_eq!(*counter.lock().unwrap(), calls_after_first);
    }

    #[tokio::test]
    async fn empty_range_yields_empty_candles() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 13).unwrap();
        let client = client_with(HashMap::new());

        let candles = client.fetch_range("TEST", date, date).await.unwrap();
        assert!(candles.is_empty());
    }

    #[test]
    fn cap_series_scales_close_by_share_count() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 13).unwrap();
        let candles = vec![
            candle_at(date, dec!(150.00)),
            candle_at(date.succ_opt().unwrap(), dec!(152.50)),
        ];

        let series = cap_series(&candles);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].market_cap, dec!(150000000.00));
        assert_eq!(series[1].market_cap, dec!(152500000.00));
    }

    #[test]
    fn cap_series_of_nothing_is_empty() {
        assert!(cap_series(&[]).is_empty());
    }
}
