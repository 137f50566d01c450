use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use roro_agents::{AgentInvoker, ChatSession};
use roro_data::{cap_series, CapPoint, MacroData, MacroReading, MarketData};
use roro_models::config::{DeskConfig, FredSeries, Theme};
use roro_models::{tickers, AgentProfile, ChatMessage};

use crate::error::DeskError;

/// A successfully fetched capitalization series and the selection it was
/// fetched for.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedSeries {
    pub symbol: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub points: Vec<CapPoint>,
}

/// All mutable state of one desk session, plus its data collaborators.
///
/// Every input handler is a method here; there is no ambient state. The
/// session lives exactly as long as the interactive run and nothing in it
/// is persisted.
pub struct DeskSession {
    theme: Theme,
    ticker: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    fetched: Option<FetchedSeries>,
    pub chat: ChatSession,
    agent: AgentProfile,
    market: Arc<dyn MarketData>,
    macro_data: Option<Arc<dyn MacroData>>,
    fred_series: Vec<FredSeries>,
}

impl DeskSession {
    /// Build a session from configuration. A configured ticker outside the
    /// reference list falls back to the first listed symbol.
    pub fn new(
        config: &DeskConfig,
        agent: AgentProfile,
        market: Arc<dyn MarketData>,
        macro_data: Option<Arc<dyn MacroData>>,
    ) -> Self {
        let ticker = if tickers::is_listed(&config.view.ticker) {
            config.view.ticker.clone()
        } else {
            warn!(ticker = %config.view.ticker, "Configured ticker is not in the reference list");
            tickers::UNIVERSE[0].to_string()
        };

        Self {
            theme: config.view.theme,
            ticker,
            start_date: config.view.start_date,
            end_date: config.view.end_date,
            fetched: None,
            chat: ChatSession::with_greeting(config.chat.greeting.clone()),
            agent,
            market,
            macro_data,
            fred_series: config.fred.series.clone(),
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn date_range(&self) -> (NaiveDate, NaiveDate) {
        (self.start_date, self.end_date)
    }

    /// Date ordering is deliberately not validated; an inverted range just
    /// yields an empty fetch from the provider.
    pub fn set_date_range(&mut self, start: NaiveDate, end: NaiveDate) {
        self.start_date = start;
        self.end_date = end;
    }

    pub fn agent(&self) -> &AgentProfile {
        &self.agent
    }

    /// Select a ticker. Symbols outside the reference list are rejected;
    /// no fetch is ever attempted for them through this control.
    pub fn select_ticker(&mut self, symbol: &str) -> Result<String, DeskError> {
        let normalized = symbol.trim().to_ascii_uppercase();
        if !tickers::is_listed(&normalized) {
            return Err(DeskError::UnknownTicker(normalized));
        }
        self.ticker = normalized.clone();
        Ok(normalized)
    }

    /// Fetch market data for the current selection and derive the
    /// capitalization series. On failure the previous successful fetch (if
    /// any) is left untouched.
    pub async fn fetch(&mut self) -> Result<usize, DeskError> {
        let candles = self
            .market
            .fetch_range(&self.ticker, self.start_date, self.end_date)
            .await?;

        let points = cap_series(&candles);
        let count = points.len();
        info!(ticker = %self.ticker, points = count, "Capitalization series ready");

        self.fetched = Some(FetchedSeries {
            symbol: self.ticker.clone(),
            start: self.start_date,
            end: self.end_date,
            points,
        });
        Ok(count)
    }

    /// The series backing the capitalization chart. An error until a fetch
    /// has succeeded this session.
    pub fn chart_series(&self) -> Result<&FetchedSeries, DeskError> {
        match &self.fetched {
            Some(series) if !series.points.is_empty() => Ok(series),
            _ => Err(DeskError::NoData),
        }
    }

    pub fn has_data(&self) -> bool {
        self.chart_series().is_ok()
    }

    /// Latest value of every configured macro series, with per-series
    /// degradation: a failed series yields `None` and the rest render.
    pub async fn macro_strip(&self) -> Result<Vec<(String, Option<MacroReading>)>, DeskError> {
        let client = self
            .macro_data
            .as_ref()
            .ok_or_else(|| DeskError::MacroUnavailable("no API key configured".to_string()))?;

        let mut rows = Vec::new();
        for series in &self.fred_series {
            match client.latest(series).await {
                Ok(reading) => rows.push((series.label.clone(), Some(reading))),
                Err(e) => {
                    warn!(series = %series.id, error = %e, "Failed to fetch FRED data");
                    rows.push((series.label.clone(), None));
                }
            }
        }
        Ok(rows)
    }

    /// One-shot AI analysis of the current selection (outside the chat
    /// history). The reply is folded through `on_progress` like a chat
    /// turn, but nothing is committed anywhere.
    pub async fn analyze(
        &self,
        invoker: &dyn AgentInvoker,
        on_progress: impl FnMut(&str) + Send,
    ) -> Result<String, DeskError> {
        let prompt = format!(
            "You are a stock analyst. Analyze the stock performance of {} based on historical \
             data and provide insights. Include recommendations for Buy/Hold/Sell.",
            self.ticker
        );
        let history = vec![ChatMessage::user(prompt)];

        let reply = invoker.invoke(&self.agent, &history).await?;
        Ok(reply.fold(on_progress).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use chrono::Utc;
    use market_data_core::candle::Candle;
    use roro_data::DataError;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    /// Scripted market data: pops one result per fetch call.
    struct ScriptedMarket {
        results: Mutex<Vec<Result<Vec<Candle>, DataError>>>,
    }

    impl ScriptedMarket {
        fn new(results: Vec<Result<Vec<Candle>, DataError>>) -> Self {
            Self {
                results: Mutex::new(results),
            }
        }
    }

    #[async_trait]
    impl MarketData for ScriptedMarket {
        fn provider_name(&self) -> &str {
            "scripted"
        }

        async fn fetch_range(
            &self,
            _symbol: &str,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<Arc<Vec<Candle>>, DataError> {
            let mut results = self.results.lock().unwrap();
            if results.is_empty() {
                return Err(DataError::Provider("script exhausted".to_string()));
            }
            results.remove(0).map(Arc::new)
        }
    }

    struct ScriptedMacro {
        fail_ids: Vec<String>,
    }

    #[async_trait]
    impl MacroData for ScriptedMacro {
        async fn latest(&self, series: &FredSeries) -> Result<MacroReading, DataError> {
            if self.fail_ids.iter().any(|id| id == &series.id) {
                return Err(DataError::Provider("FRED down".to_string()));
            }
            Ok(MacroReading {
                series_id: series.id.clone(),
                label: series.label.clone(),
                value: 4.1,
                observed_on: NaiveDate::from_ymd_opt(2024, 11, 1).unwrap(),
            })
        }
    }

    fn sample_candles() -> Vec<Candle> {
        vec![
            Candle {
                timestamp: Utc.with_ymd_and_hms(2024, 1, 15, 14, 30, 0).unwrap(),
                open: dec!(150.00),
                high: dec!(151.50),
                low: dec!(149.50),
                close: dec!(151.00),
                volume: 100_000,
            },
            Candle {
                timestamp: Utc.with_ymd_and_hms(2024, 1, 16, 14, 30, 0).unwrap(),
                open: dec!(151.00),
                high: dec!(152.00),
                low: dec!(150.50),
                close: dec!(151.75),
                volume: 85_000,
            },
        ]
    }

    fn session_with_market(market: ScriptedMarket) -> DeskSession {
        let config = DeskConfig::default();
        let agent = config.agent.to_profile(roro_models::config::DEFAULT_MODEL);
        DeskSession::new(&config, agent, Arc::new(market), None)
    }

    #[test]
    fn config_defaults_populate_the_session() {
        let session = session_with_market(ScriptedMarket::new(vec![]));
        assert_eq!(session.ticker(), "AAPL");
        assert_eq!(session.theme(), Theme::Light);
        assert_eq!(session.chat.messages().len(), 1);
        assert!(!session.has_data());
    }

    #[test]
    fn unlisted_configured_ticker_falls_back() {
        let mut config = DeskConfig::default();
        config.view.ticker = "NOTREAL".to_string();
        let agent = config.agent.to_profile(roro_models::config::DEFAULT_MODEL);
        let session = DeskSession::new(
            &config,
            agent,
            Arc::new(ScriptedMarket::new(vec![])),
            None,
        );
        assert_eq!(session.ticker(), tickers::UNIVERSE[0]);
    }

    #[test]
    fn select_ticker_rejects_symbols_outside_the_list() {
        let mut session = session_with_market(ScriptedMarket::new(vec![]));

        let result = session.select_ticker("NOTREAL");
        assert!(matches!(result, Err(DeskError::UnknownTicker(_))));
        // Selection is unchanged after the rejection
        assert_eq!(session.ticker(), "AAPL");
    }

    #[test]
    fn select_ticker_normalizes_case() {
        let mut session = session_with_market(ScriptedMarket::new(vec![]));
        assert_eq!(session.select_ticker(" tsla ").unwrap(), "TSLA");
        assert_eq!(session.ticker(), "TSLA");
    }

    #[tokio::test]
    async fn fetch_builds_the_capitalization_series() {
        let mut session =
            session_with_market(ScriptedMarket::new(vec![Ok(sample_candles())]));

        let count = session.fetch().await.unwrap();
        assert_eq!(count, 2);

        let series = session.chart_series().unwrap();
        assert_eq!(series.symbol, "AAPL");
        assert_eq!(series.points.len(), 2);
        // close × 1,000,000 assumed shares
        assert_eq!(series.points[0].market_cap, dec!(151000000.00));
    }

    #[tokio::test]
    async fn failed_fetch_leaves_no_chart_and_session_continues() {
        let mut session = session_with_market(ScriptedMarket::new(vec![Err(
            DataError::Provider("yahoo: rate limited".to_string()),
        )]));

        let result = session.fetch().await;
        assert!(result.is_err());
        // The chart stays unavailable, but the session is still usable.
        assert!(matches!(session.chart_series(), Err(DeskError::NoData)));
        assert_eq!(session.select_ticker("MSFT").unwrap(), "MSFT");
    }

    #[tokio::test]
    async fn failed_fetch_preserves_previous_series() {
        let mut session = session_with_market(ScriptedMarket::new(vec![
            Ok(sample_candles()),
            Err(DataError::Provider("yahoo: rate limited".to_string())),
        ]));

        session.fetch().await.unwrap();
        session.select_ticker("MSFT").unwrap();
        assert!(session.fetch().await.is_err());

        // The last successful fetch still backs the chart, labeled with
        // the symbol it was fetched for.
        let series = session.chart_series().unwrap();
        assert_eq!(series.symbol, "AAPL");
    }

    #[tokio::test]
    async fn empty_fetch_means_no_chart() {
        let mut session = session_with_market(ScriptedMarket::new(vec![Ok(vec![])]));

        let count = session.fetch().await.unwrap();
        assert_eq!(count, 0);
        assert!(matches!(session.chart_series(), Err(DeskError::NoData)));
    }

    #[tokio::test]
    async fn macro_strip_degrades_per_series() {
        let config = DeskConfig::default();
        let agent = config.agent.to_profile(roro_models::config::DEFAULT_MODEL);
        let session = DeskSession::new(
            &config,
            agent,
            Arc::new(ScriptedMarket::new(vec![])),
            Some(Arc::new(ScriptedMacro {
                fail_ids: vec!["UNRATE".to_string()],
            })),
        );

        let rows = session.macro_strip().await.unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].1.is_some()); // GDP
        assert!(rows[1].1.is_none()); // UNRATE failed
        assert!(rows[2].1.is_some()); // CPIAUCSL
    }

    #[tokio::test]
    async fn macro_strip_without_client_errors() {
        let session = session_with_market(ScriptedMarket::new(vec![]));
        assert!(matches!(
            session.macro_strip().await,
            Err(DeskError::MacroUnavailable(_))
        ));
    }

    #[test]
    fn theme_and_range_updates() {
        let mut session = session_with_market(ScriptedMarket::new(vec![]));
        session.set_theme(Theme::Dark);
        assert_eq!(session.theme(), Theme::Dark);

        let start = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        // Inverted on purpose; the session does not second-guess it.
        session.set_date_range(start, end);
        assert_eq!(session.date_range(), (start, end));
    }
}
