use serde::{Deserialize, Serialize};

/// An immutable agent configuration: a model binding, an ordered list of
/// tool capabilities, and a natural-language instruction list. Constructed
/// once at startup and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentProfile {
    pub name: String,
    pub model: String,
    /// Tool capabilities the agent may invoke autonomously. These are
    /// opaque to this system; they are handed to the backend verbatim.
    pub tools: Vec<String>,
    pub instructions: Vec<String>,
    pub description: String,
}
