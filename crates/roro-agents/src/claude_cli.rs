use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::AgentError;
use crate::reply::FragmentStream;

/// Configuration for a Claude CLI invocation.
#[derive(Debug, Clone)]
pub struct ClaudeCliConfig {
    pub model: String,
    /// Timeout for a complete invocation, or per fragment read in
    /// streaming mode.
    pub timeout: Duration,
    /// Tool capabilities the model may invoke. Passed through verbatim;
    /// the CLI executes them, never this system.
    pub tools: Vec<String>,
}

impl Default for ClaudeCliConfig {
    fn default() -> Self {
        Self {
            model: "claude-3-5-haiku-latest".to_string(),
            timeout: Duration::from_secs(120),
            tools: Vec::new(),
        }
    }
}

/// Shared argument list for both invocation modes.
fn base_args(system_prompt: &str, user_prompt: &str, config: &ClaudeCliConfig) -> Vec<String> {
    let mut args = vec![
        "-p".to_string(),
        user_prompt.to_string(),
        "--system-prompt".to_string(),
        system_prompt.to_string(),
        "--model".to_string(),
        config.model.clone(),
    ];
    if !config.tools.is_empty() {
        args.push("--allowed-tools".to_string());
        args.push(config.tools.join(","));
    }
    args
}

/// Invoke the `claude` CLI and wait for the complete response text.
pub async fn invoke_claude(
    system_prompt: &str,
    user_prompt: &str,
    config: &ClaudeCliConfig,
) -> Result<String, AgentError> {
    debug!(model = %config.model, "Invoking claude CLI");

    let mut args = base_args(system_prompt, user_prompt, config);
    args.push("--output-format".to_string());
    args.push("text".to_string());

    let result = tokio::time::timeout(config.timeout, async {
        Command::new("claude").args(&args).output().await
    })
    .await
    .map_err(|_| AgentError::Timeout(config.timeout.as_secs()))?
    .map_err(|e| AgentError::Cli(format!("Failed to spawn claude: {e}")))?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        warn!(status = %result.status, stderr = %stderr, "Claude CLI failed");
        return Err(AgentError::Cli(format!(
            "claude exited {}: {}",
            result.status, stderr
        )));
    }

    let stdout = String::from_utf8_lossy(&result.stdout).to_string();
    if stdout.trim().is_empty() {
        return Err(AgentError::Cli(
            "Claude returned empty response".to_string(),
        ));
    }

    Ok(stdout)
}

/// Spawn the `claude` CLI in stream-json mode and wrap its stdout as a
/// fragment sequence. The child is killed if the stream is dropped early.
pub fn spawn_claude_stream(
    system_prompt: &str,
    user_prompt: &str,
    config: &ClaudeCliConfig,
) -> Result<FragmentStream, AgentError> {
    debug!(model = %config.model, "Spawning claude CLI stream");

    let mut args = base_args(system_prompt, user_prompt, config);
    args.push("--output-format".to_string());
    args.push("stream-json".to_string());
    args.push("--verbose".to_string());

    let child = Command::new("claude")
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| AgentError::Cli(format!("Failed to spawn claude: {e}")))?;

    FragmentStream::from_child(child, config.timeout)
}

/// Check if the `claude` CLI is available on the system.
pub async fn check_cli_available() -> bool {
    match Command::new("claude").arg("--version").output().await {
        Ok(output) => output.status.success(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ClaudeCliConfig::default();
        assert_eq!(config.model, "claude-3-5-haiku-latest");
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert!(config.tools.is_empty());
    }

    #[test]
    fn args_without_tools_omit_allowed_tools() {
        let config = ClaudeCliConfig::default();
        let args = base_args("sys", "hello", &config);
        assert!(!args.iter().any(|a| a == "--allowed-tools"));
        assert_eq!(args[0], "-p");
        assert_eq!(args[1], "hello");
    }

    #[test]
    fn args_join_tool_names() {
        let config = ClaudeCliConfig {
            tools: vec!["WebSearch".to_string(), "WebFetch".to_string()],
            ..ClaudeCliConfig::default()
        };
        let args = base_args("sys", "hello", &config);
        let idx = args.iter().position(|a| a == "--allowed-tools").unwrap();
        assert_eq!(args[idx + 1], "WebSearch,WebFetch");
    }
}
