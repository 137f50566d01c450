pub mod chat;
pub mod claude_cli;
pub mod error;
pub mod invoker;
pub mod parser;
pub mod prompts;
pub mod reply;
pub mod team;

pub mod test_support;

pub use chat::ChatSession;
pub use error::AgentError;
pub use invoker::{AgentInvoker, ClaudeCliInvoker, InvocationMode};
pub use reply::{AgentReply, FragmentStream};
pub use team::{MemberReport, Team, TeamReport};
