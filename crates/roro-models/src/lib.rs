pub mod chat;
pub mod config;
pub mod profile;
pub mod tickers;

pub use chat::{ChatMessage, Role};
pub use config::{
    AgentsConfig, ChatConfig, DeskConfig, FredConfig, FredSeries, MarketConfig, ProfileConfig,
    ProviderKind, RoroConfig, Theme, ViewConfig,
};
pub use profile::AgentProfile;
