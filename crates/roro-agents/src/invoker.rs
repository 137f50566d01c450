use std::time::Duration;

use async_trait::async_trait;
use roro_models::{AgentProfile, ChatMessage};

use crate::claude_cli::{invoke_claude, spawn_claude_stream, ClaudeCliConfig};
use crate::error::AgentError;
use crate::prompts::{render_transcript, system_prompt};
use crate::reply::AgentReply;

/// How the backend should deliver its reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvocationMode {
    /// One complete response object.
    #[default]
    Complete,
    /// A lazy fragment sequence.
    Streaming,
}

/// Seam between conversation logic and the external agent backend.
/// Mockable for testing.
#[async_trait]
pub trait AgentInvoker: Send + Sync {
    async fn invoke(
        &self,
        profile: &AgentProfile,
        history: &[ChatMessage],
    ) -> Result<AgentReply, AgentError>;
}

/// An invoker backed by the `claude` CLI.
pub struct ClaudeCliInvoker {
    pub mode: InvocationMode,
    pub timeout: Duration,
}

impl ClaudeCliInvoker {
    pub fn new(mode: InvocationMode, timeout: Duration) -> Self {
        Self { mode, timeout }
    }

    fn cli_config(&self, profile: &AgentProfile) -> ClaudeCliConfig {
        ClaudeCliConfig {
            model: profile.model.clone(),
            timeout: self.timeout,
            tools: profile.tools.clone(),
        }
    }
}

#[async_trait]
impl AgentInvoker for ClaudeCliInvoker {
    async fn invoke(
        &self,
        profile: &AgentProfile,
        history: &[ChatMessage],
    ) -> Result<AgentReply, AgentError> {
        let system = system_prompt(profile);
        let prompt = render_transcript(history);
        let config = self.cli_config(profile);

        match self.mode {
            InvocationMode::Complete => Ok(AgentReply::Complete(
                invoke_claude(&system, &prompt, &config).await?,
            )),
            InvocationMode::Streaming => Ok(AgentReply::Stream(spawn_claude_stream(
                &system, &prompt, &config,
            )?)),
        }
    }
}
