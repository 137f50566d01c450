use tracing::debug;
use uuid::Uuid;

use roro_models::{AgentProfile, ChatMessage, Role};

use crate::error::AgentError;
use crate::invoker::AgentInvoker;

/// An interactive conversation with one agent.
///
/// The session owns the append-only message history and the per-turn
/// streaming accumulator. A turn appends the user message, invokes the
/// agent with the full history, folds the reply's fragments into one
/// assistant message, and appends that. A failed turn leaves the history
/// ending at the user message, so a retry re-invokes with the same
/// history.
pub struct ChatSession {
    id: Uuid,
    messages: Vec<ChatMessage>,
    greeting: Option<String>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            messages: Vec::new(),
            greeting: None,
        }
    }

    /// A session whose history opens with a canned assistant greeting.
    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        let greeting = greeting.into();
        Self {
            id: Uuid::new_v4(),
            messages: vec![ChatMessage::assistant(greeting.clone())],
            greeting: Some(greeting),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Whether the last turn is still awaiting a response (the previous
    /// invocation failed after the user message was appended).
    pub fn awaiting_response(&self) -> bool {
        matches!(self.messages.last(), Some(m) if m.role == Role::User)
    }

    /// Drop the conversation and start over (keeping the greeting, if any).
    pub fn reset(&mut self) {
        self.messages.clear();
        if let Some(greeting) = &self.greeting {
            self.messages.push(ChatMessage::assistant(greeting.clone()));
        }
    }

    /// Run one conversation turn.
    ///
    /// `on_progress` observes the accumulator's current value after every
    /// fragment, in arrival order, so the caller can repaint incrementally.
    /// On success the accumulated text has been committed to history as one
    /// assistant message and is returned. On failure nothing is committed
    /// beyond the user message.
    pub async fn run_turn(
        &mut self,
        invoker: &dyn AgentInvoker,
        profile: &AgentProfile,
        user_text: impl Into<String>,
        on_progress: impl FnMut(&str) + Send,
    ) -> Result<String, AgentError> {
        self.messages.push(ChatMessage::user(user_text));
        self.complete_turn(invoker, profile, on_progress).await
    }

    /// Re-invoke a turn whose previous invocation failed, without adding a
    /// new user message.
    pub async fn retry(
        &mut self,
        invoker: &dyn AgentInvoker,
        profile: &AgentProfile,
        on_progress: impl FnMut(&str) + Send,
    ) -> Result<String, AgentError> {
        if !self.awaiting_response() {
            return Err(AgentError::State(
                "nothing to retry: no user message awaiting a response".to_string(),
            ));
        }
        self.complete_turn(invoker, profile, on_progress).await
    }

    async fn complete_turn(
        &mut self,
        invoker: &dyn AgentInvoker,
        profile: &AgentProfile,
        on_progress: impl FnMut(&str) + Send,
    ) -> Result<String, AgentError> {
        let reply = invoker.invoke(profile, &self.messages).await?;
        let full = reply.fold(on_progress).await?;

        debug!(session = %self.id, chars = full.len(), "Turn committed");
        self.messages.push(ChatMessage::assistant(full.clone()));
        Ok(full)
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}
