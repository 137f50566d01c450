use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::profile::AgentProfile;

/// Which market data provider the desk fetches candles from.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Yahoo,
    Alpaca,
}

/// Top-level configuration for the `roro` agent team binary.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RoroConfig {
    #[serde(default)]
    pub agents: AgentsConfig,
}

/// Configuration for the agent team layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentsConfig {
    /// Default model for member agents.
    #[serde(default = "default_member_model")]
    pub member_model: String,
    /// Model for the team lead (final synthesis).
    #[serde(default = "default_lead_model")]
    pub lead_model: String,
    /// Per-member timeout in seconds.
    #[serde(default = "default_member_timeout")]
    pub member_timeout_seconds: u64,
    /// Total wall-clock timeout for a full team run in seconds.
    #[serde(default = "default_total_timeout")]
    pub total_timeout_seconds: u64,
    /// Member agent profiles, fanned out in parallel.
    #[serde(default = "default_members")]
    pub members: Vec<ProfileConfig>,
    /// The team lead profile, run over the member reports.
    #[serde(default = "default_lead")]
    pub lead: ProfileConfig,
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            member_model: default_member_model(),
            lead_model: default_lead_model(),
            member_timeout_seconds: default_member_timeout(),
            total_timeout_seconds: default_total_timeout(),
            members: default_members(),
            lead: default_lead(),
        }
    }
}

/// Configuration for a single agent profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileConfig {
    pub name: String,
    /// Override model for this agent. Falls back to the layer default.
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_tools")]
    pub tools: Vec<String>,
    pub instructions: Vec<String>,
    pub description: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl ProfileConfig {
    /// Resolve into an immutable `AgentProfile`, applying the model fallback.
    pub fn to_profile(&self, fallback_model: &str) -> AgentProfile {
        AgentProfile {
            name: self.name.clone(),
            model: self
                .model
                .clone()
                .unwrap_or_else(|| fallback_model.to_string()),
            tools: self.tools.clone(),
            instructions: self.instructions.clone(),
            description: self.description.clone(),
        }
    }
}

/// Top-level configuration for the `roro-desk` dashboard binary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeskConfig {
    #[serde(default)]
    pub market: MarketConfig,
    #[serde(default)]
    pub fred: FredConfig,
    #[serde(default = "default_desk_agent")]
    pub agent: ProfileConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub view: ViewConfig,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            market: MarketConfig::default(),
            fred: FredConfig::default(),
            agent: default_desk_agent(),
            chat: ChatConfig::default(),
            view: ViewConfig::default(),
        }
    }
}

/// Market data fetch settings for the desk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarketConfig {
    #[serde(default)]
    pub provider: ProviderKind,
    /// Maximum number of fetched ranges kept in the session cache.
    #[serde(default = "default_cache_capacity")]
    pub cache_max_entries: u64,
    /// TTL in seconds for session-cached market data.
    #[serde(default = "default_market_ttl")]
    pub cache_ttl_seconds: u64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            cache_max_entries: default_cache_capacity(),
            cache_ttl_seconds: default_market_ttl(),
        }
    }
}

/// One macroeconomic series shown in the indicator strip.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FredSeries {
    pub label: String,
    pub id: String,
}

/// FRED (macroeconomic data) client settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FredConfig {
    #[serde(default = "default_fred_base_url")]
    pub base_url: String,
    /// API key. Falls back to the FRED_API_KEY environment variable.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_fred_series")]
    pub series: Vec<FredSeries>,
    #[serde(default = "default_fred_timeout")]
    pub timeout_seconds: u64,
}

impl Default for FredConfig {
    fn default() -> Self {
        Self {
            base_url: default_fred_base_url(),
            api_key: None,
            series: default_fred_series(),
            timeout_seconds: default_fred_timeout(),
        }
    }
}

/// Chat panel settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatConfig {
    /// Timeout in seconds applied per agent call (and per streamed fragment).
    #[serde(default = "default_chat_timeout")]
    pub timeout_seconds: u64,
    /// Opening assistant message of a fresh conversation.
    #[serde(default = "default_greeting")]
    pub greeting: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_chat_timeout(),
            greeting: default_greeting(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Initial view state of the desk: theme, selected ticker, date range.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViewConfig {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default = "default_ticker")]
    pub ticker: String,
    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,
    #[serde(default = "default_end_date")]
    pub end_date: NaiveDate,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            ticker: default_ticker(),
            start_date: default_start_date(),
            end_date: default_end_date(),
        }
    }
}

/// Default model binding for agents that don't specify one.
pub const DEFAULT_MODEL: &str = "claude-3-5-haiku-latest";

fn default_member_model() -> String {
    DEFAULT_MODEL.to_string()
}
fn default_lead_model() -> String {
    "claude-sonnet-4-5-20250929".to_string()
}
fn default_member_timeout() -> u64 {
    120
}
fn default_total_timeout() -> u64 {
    600
}
fn default_tools() -> Vec<String> {
    vec!["WebSearch".to_string(), "WebFetch".to_string()]
}
fn default_true() -> bool {
    true
}
fn default_cache_capacity() -> u64 {
    64
}
fn default_market_ttl() -> u64 {
    600
}
fn default_fred_base_url() -> String {
    "https://api.stlouisfed.org/fred".to_string()
}
fn default_fred_series() -> Vec<FredSeries> {
    vec![
        FredSeries {
            label: "GDP".to_string(),
            id: "GDP".to_string(),
        },
        FredSeries {
            label: "Unemployment Rate".to_string(),
            id: "UNRATE".to_string(),
        },
        FredSeries {
            label: "Consumer Price Index".to_string(),
            id: "CPIAUCSL".to_string(),
        },
    ]
}
fn default_fred_timeout() -> u64 {
    10
}
fn default_chat_timeout() -> u64 {
    120
}
fn default_greeting() -> String {
    "How can I help you?".to_string()
}
fn default_ticker() -> String {
    "AAPL".to_string()
}
fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 1).expect("valid date")
}
fn default_end_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 31).expect("valid date")
}

fn default_members() -> Vec<ProfileConfig> {
    vec![
        ProfileConfig {
            name: "macro-data".to_string(),
            model: None,
            tools: default_tools(),
            instructions: vec![
                "Analyze global macroeconomic indicators to determine if the environment is \
                 Risk On or Risk Off."
                    .to_string(),
                "Consider the rate of change (acceleration or deceleration) of these indicators."
                    .to_string(),
                "Use web search to gather relevant data releases and headlines.".to_string(),
                "Project the data 1 week and 2 weeks ahead to establish relevant timeframes."
                    .to_string(),
                "Weight the impact of each indicator, with growth and inflation data points \
                 weighted heavier as they trigger heavier trading flows."
                    .to_string(),
                "Assess the strength of the US Dollar: a strengthening dollar tends toward \
                 Risk Off as investors sell into the dollar; a weakening dollar tends toward \
                 Risk On as investors sell dollars to buy assets."
                    .to_string(),
                "Output the probabilities for Risk On and Risk Off environments in percentages \
                 down to two decimal places."
                    .to_string(),
                "Provide a summary of daily headlines regarding macroeconomic data.".to_string(),
            ],
            description: "Determines the current market environment as Risk On or Risk Off \
                          based on global macroeconomic indicators, their rate of change, and \
                          the strength of the US Dollar."
                .to_string(),
            enabled: true,
        },
        ProfileConfig {
            name: "macro-data-senior".to_string(),
            model: None,
            tools: default_tools(),
            instructions: vec![
                "Perform advanced analysis on macroeconomic indicators to validate Risk On \
                 and Risk Off probabilities."
                    .to_string(),
                "Backtest Risk On and Risk Off scores against historical data to ensure \
                 accuracy and consistency."
                    .to_string(),
                "Analyze the rate of change in indicators and the strength of the US Dollar \
                 to identify historical patterns of Risk On and Risk Off environments."
                    .to_string(),
                "Provide insights and adjustments to the Risk On and Risk Off models based on \
                 historical performance."
                    .to_string(),
            ],
            description: "Performs advanced analysis and backtesting on macroeconomic \
                          indicators to validate and enhance Risk On and Risk Off probability \
                          models."
                .to_string(),
            enabled: true,
        },
    ]
}

fn default_lead() -> ProfileConfig {
    ProfileConfig {
        name: "macro-analyst-team".to_string(),
        model: None,
        tools: Vec::new(),
        instructions: vec![
            "Coordinate the macro analyst reports into a comprehensive and accurate market \
             environment assessment."
                .to_string(),
            "Integrate findings from all analysts into a robust final assessment of Risk On \
             and Risk Off probabilities."
                .to_string(),
            "Document the team judgment and rationale based on data-driven insights.".to_string(),
            "Present the final Risk On and Risk Off probabilities along with the likelihood \
             of acceleration within the next 1 week and 2 week timeframes."
                .to_string(),
            "Provide a summary of daily macroeconomic headlines to support the risk assessment."
                .to_string(),
        ],
        description: "Leads the macro analyst team to provide a comprehensive assessment of \
                      market environments as Risk On or Risk Off."
            .to_string(),
        enabled: true,
    }
}

fn default_desk_agent() -> ProfileConfig {
    ProfileConfig {
        name: "desk-analyst".to_string(),
        model: Some(default_member_model()),
        tools: default_tools(),
        instructions: vec![
            "Analyze analyst recommendations and RSI to determine if the stock should be \
             bought, sold, or held, and provide a target price."
                .to_string(),
            "Provide a simple and easy-to-digest analysis from a stock and ETF perspective, \
             including target price, timeframe, and probability."
                .to_string(),
        ],
        description: "Market analyst for the trading desk: assesses the market environment \
                      as Risk On or Risk Off and analyzes analyst recommendations and RSI \
                      for stock advice."
            .to_string(),
        enabled: true,
    }
}
