use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Claude CLI error: {0}")]
    Cli(String),

    #[error("Unrecognized response shape: {0}")]
    Shape(String),

    #[error("Agent timed out after {0} seconds")]
    Timeout(u64),

    #[error("Invalid session state: {0}")]
    State(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
