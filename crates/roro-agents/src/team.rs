use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use roro_models::config::AgentsConfig;
use roro_models::{AgentProfile, ChatMessage};

use crate::error::AgentError;
use crate::invoker::AgentInvoker;
use crate::prompts::synthesis_prompt;

/// Outcome of one member agent's run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemberReport {
    pub agent_name: String,
    pub answer: Option<String>,
    pub error: Option<String>,
    pub elapsed_ms: u64,
}

/// The team's synthesized answer plus the member reports it was built from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeamReport {
    pub id: Uuid,
    pub question: String,
    pub answer: String,
    pub members: Vec<MemberReport>,
    pub answered_at: DateTime<Utc>,
    pub processing_time_ms: u64,
}

/// A team: member agent profiles fanned out in parallel, and a lead
/// profile that synthesizes their reports.
pub struct Team {
    pub lead: AgentProfile,
    pub members: Vec<AgentProfile>,
}

impl Team {
    pub fn from_config(config: &AgentsConfig) -> Self {
        Self {
            lead: config.lead.to_profile(&config.lead_model),
            members: config
                .members
                .iter()
                .filter(|m| m.enabled)
                .map(|m| m.to_profile(&config.member_model))
                .collect(),
        }
    }

    /// Run one top-level query: fan out to members in parallel, then have
    /// the lead synthesize their reports. A failed member degrades to an
    /// error report; only a lead failure fails the run.
    pub async fn run(
        &self,
        invoker: Arc<dyn AgentInvoker>,
        question: &str,
    ) -> Result<TeamReport, AgentError> {
        let start = Instant::now();
        info!(team = %self.lead.name, members = self.members.len(), "Starting team run");

        let mut handles = Vec::new();
        for member in &self.members {
            let invoker = Arc::clone(&invoker);
            let member = member.clone();
            let history = vec![ChatMessage::user(question)];

            handles.push(tokio::spawn(async move {
                let member_start = Instant::now();
                let result = match invoker.invoke(&member, &history).await {
                    Ok(reply) => reply.collect().await,
                    Err(e) => Err(e),
                };
                (member.name, result, member_start.elapsed())
            }));
        }

        let mut reports: Vec<MemberReport> = Vec::new();
        for handle in handles {
            match handle.await {
                Ok((name, Ok(answer), elapsed)) => {
                    info!(agent = %name, elapsed_ms = elapsed.as_millis(), "Member succeeded");
                    reports.push(MemberReport {
                        agent_name: name,
                        answer: Some(answer),
                        error: None,
                        elapsed_ms: elapsed.as_millis() as u64,
                    });
                }
                Ok((name, Err(e), elapsed)) => {
                    warn!(agent = %name, error = %e, elapsed_ms = elapsed.as_millis(), "Member failed");
                    reports.push(MemberReport {
                        agent_name: name,
                        answer: None,
                        error: Some(e.to_string()),
                        elapsed_ms: elapsed.as_millis() as u64,
                    });
                }
                Err(e) => {
                    error!(error = %e, "Member task panicked");
                }
            }
        }

        let prompt = synthesis_prompt(question, &reports);
        let history = vec![ChatMessage::user(prompt)];
        let answer = invoker
            .invoke(&self.lead, &history)
            .await?
            .collect()
            .await?;

        info!(
            team = %self.lead.name,
            elapsed_ms = start.elapsed().as_millis(),
            "Team run complete"
        );

        Ok(TeamReport {
            id: Uuid::new_v4(),
            question: question.to_string(),
            answer,
            members: reports,
            answered_at: Utc::now(),
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}
