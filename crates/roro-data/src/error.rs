use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No numeric observation for series: {0}")]
    MissingValue(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
