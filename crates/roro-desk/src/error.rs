use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeskError {
    #[error("Unknown ticker: {0} is not in the reference list (try /tickers)")]
    UnknownTicker(String),

    #[error("No market data fetched yet; select a ticker and run /fetch")]
    NoData,

    #[error("Macro data unavailable: {0}")]
    MacroUnavailable(String),

    #[error(transparent)]
    Data(#[from] roro_data::DataError),

    #[error(transparent)]
    Agent(#[from] roro_agents::AgentError),
}
