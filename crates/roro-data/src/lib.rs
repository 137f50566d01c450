pub mod error;
pub mod fred;
pub mod market;

pub use error::DataError;
pub use fred::{FredClient, MacroData, MacroReading};
pub use market::{
    cap_series, create_provider, CapPoint, MarketClient, MarketData, ASSUMED_SHARES_OUTSTANDING,
};
