//! RORO - Risk On / Risk Off macro analyst team.
//!
//! Configures a team of prompt-driven macro analyst agents backed by the
//! Claude CLI, fans one top-level query out to the members, and has the
//! team lead synthesize their reports into a final assessment.
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use roro::models::config::RoroConfig;
//!
//! # async fn run() -> Result<(), roro::agents::AgentError> {
//! let config = RoroConfig::default();
//! let report = roro::run_query(&config, roro::DEFAULT_QUERY).await?;
//! println!("{}", report.answer);
//! # Ok(())
//! # }
//! ```

pub use roro_agents as agents;
pub use roro_models as models;

use std::sync::Arc;
use std::time::Duration;

use roro_agents::{AgentError, AgentInvoker, ClaudeCliInvoker, InvocationMode, Team, TeamReport};
use roro_models::config::RoroConfig;

/// The standing weekly question the team is asked when none is given.
pub const DEFAULT_QUERY: &str =
    "What is the Risk On and Risk Off probability for this week and next week?";

/// Build the agent team from configuration.
pub fn build_team(config: &RoroConfig) -> Team {
    Team::from_config(&config.agents)
}

/// Build the CLI-backed invoker the team runs on.
pub fn build_invoker(config: &RoroConfig) -> Arc<dyn AgentInvoker> {
    Arc::new(ClaudeCliInvoker::new(
        InvocationMode::Complete,
        Duration::from_secs(config.agents.member_timeout_seconds),
    ))
}

/// Run one top-level query through a team on a given invoker, bounded by
/// a total wall-clock timeout.
pub async fn run_query_with(
    team: &Team,
    invoker: Arc<dyn AgentInvoker>,
    question: &str,
    total_timeout: Duration,
) -> Result<TeamReport, AgentError> {
    tokio::time::timeout(total_timeout, team.run(invoker, question))
        .await
        .map_err(|_| AgentError::Timeout(total_timeout.as_secs()))?
}

/// Run one top-level query using the configured team and backend.
pub async fn run_query(config: &RoroConfig, question: &str) -> Result<TeamReport, AgentError> {
    let team = build_team(config);
    let invoker = build_invoker(config);
    let total_timeout = Duration::from_secs(config.agents.total_timeout_seconds);
    run_query_with(&team, invoker, question, total_timeout).await
}
