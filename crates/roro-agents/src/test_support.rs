//! Test support: scripted invokers and fragment streams for exercising
//! conversation and team logic without the Claude CLI.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use roro_models::{AgentProfile, ChatMessage};

use crate::error::AgentError;
use crate::invoker::AgentInvoker;
use crate::reply::{AgentReply, FragmentStream};

/// What a scripted invoker should produce for one invocation.
pub enum ScriptedReply {
    /// A complete response object.
    Complete(String),
    /// A stream yielding these fragments, then a clean end of stream.
    Fragments(Vec<String>),
    /// A stream yielding these fragments, then failing mid-stream.
    BrokenStream(Vec<String>, String),
    /// The invocation itself fails.
    Fail(String),
}

/// An invoker that pops scripted replies in order and records every
/// request it sees.
pub struct ScriptedInvoker {
    replies: Mutex<VecDeque<ScriptedReply>>,
    requests: Mutex<Vec<(String, Vec<ChatMessage>)>>,
}

impl ScriptedInvoker {
    pub fn new(replies: Vec<ScriptedReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every (profile name, history) pair this invoker has served, in
    /// invocation order.
    pub async fn requests(&self) -> Vec<(String, Vec<ChatMessage>)> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl AgentInvoker for ScriptedInvoker {
    async fn invoke(
        &self,
        profile: &AgentProfile,
        history: &[ChatMessage],
    ) -> Result<AgentReply, AgentError> {
        self.requests
            .lock()
            .await
            .push((profile.name.clone(), history.to_vec()));

        let next = self
            .replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| ScriptedReply::Fail("script exhausted".to_string()));

        match next {
            ScriptedReply::Complete(text) => Ok(AgentReply::Complete(text)),
            ScriptedReply::Fragments(fragments) => {
                let mut steps: Vec<Result<Option<String>, AgentError>> =
                    fragments.into_iter().map(|f| Ok(Some(f))).collect();
                steps.push(Ok(None));
                Ok(AgentReply::Stream(FragmentStream::scripted(steps)))
            }
            ScriptedReply::BrokenStream(fragments, error) => {
                let mut steps: Vec<Result<Option<String>, AgentError>> =
                    fragments.into_iter().map(|f| Ok(Some(f))).collect();
                steps.push(Err(AgentError::Cli(error)));
                Ok(AgentReply::Stream(FragmentStream::scripted(steps)))
            }
            ScriptedReply::Fail(error) => Err(AgentError::Cli(error)),
        }
    }
}

/// A minimal profile for tests.
pub fn test_profile(name: &str) -> AgentProfile {
    AgentProfile {
        name: name.to_string(),
        model: "claude-3-5-haiku-latest".to_string(),
        tools: Vec::new(),
        instructions: vec!["Answer plainly.".to_string()],
        description: "Test agent.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_invoker_records_requests() {
        let invoker = ScriptedInvoker::new(vec![ScriptedReply::Complete("ok".to_string())]);
        let profile = test_profile("recorder");
        let history = vec![ChatMessage::user("hello")];

        let reply = invoker.invoke(&profile, &history).await.unwrap();
        assert_eq!(reply.collect().await.unwrap(), "ok");

        let requests = invoker.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, "recorder");
        assert_eq!(requests[0].1[0].content, "hello");
    }

    #[tokio::test]
    async fn exhausted_script_fails() {
        let invoker = ScriptedInvoker::new(vec![]);
        let result = invoker
            .invoke(&test_profile("x"), &[ChatMessage::user("hi")])
            .await;
        assert!(result.is_err());
    }
}
