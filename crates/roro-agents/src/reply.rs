use std::collections::VecDeque;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStdout};

use crate::error::AgentError;
use crate::parser::{parse_stream_line, StreamEvent};

/// A reply from the agent backend: either one complete response text or a
/// lazy, finite, non-restartable fragment sequence.
pub enum AgentReply {
    Complete(String),
    Stream(FragmentStream),
}

impl AgentReply {
    /// Drain the reply into its full text, concatenating fragments in
    /// arrival order. `on_progress` observes the accumulated text after
    /// every fragment (once, for a complete reply).
    pub async fn fold(self, mut on_progress: impl FnMut(&str) + Send) -> Result<String, AgentError> {
        match self {
            AgentReply::Complete(text) => {
                on_progress(&text);
                Ok(text)
            }
            AgentReply::Stream(mut stream) => {
                // Fresh accumulator per reply; nothing carries over.
                let mut accumulator = String::new();
                while let Some(fragment) = stream.next().await? {
                    accumulator.push_str(&fragment);
                    on_progress(&accumulator);
                }
                Ok(accumulator)
            }
        }
    }

    /// Drain the reply without observing progress.
    pub async fn collect(self) -> Result<String, AgentError> {
        self.fold(|_| {}).await
    }
}

/// An explicit fragment sequence with a defined end-of-stream signal.
///
/// `next` yields fragments strictly in arrival order. `Ok(None)` marks a
/// legitimate end of stream; any error is terminal and the stream must be
/// discarded.
pub struct FragmentStream {
    source: Source,
}

enum Source {
    /// Stdout lines of a `claude --output-format stream-json` child.
    Cli {
        child: Child,
        lines: Lines<BufReader<ChildStdout>>,
        idle_timeout: Duration,
        finished: bool,
    },
    /// Pre-scripted steps for tests.
    Scripted(VecDeque<Result<Option<String>, AgentError>>),
}

impl FragmentStream {
    pub(crate) fn from_child(mut child: Child, idle_timeout: Duration) -> Result<Self, AgentError> {
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| AgentError::Cli("child stdout not captured".to_string()))?;
        Ok(Self {
            source: Source::Cli {
                child,
                lines: BufReader::new(stdout).lines(),
                idle_timeout,
                finished: false,
            },
        })
    }

    /// A stream that replays the given steps, then ends. Used by
    /// `test_support` and tests in dependent crates.
    pub fn scripted(steps: Vec<Result<Option<String>, AgentError>>) -> Self {
        Self {
            source: Source::Scripted(steps.into()),
        }
    }

    /// The next fragment, or `Ok(None)` at end of stream.
    pub async fn next(&mut self) -> Result<Option<String>, AgentError> {
        match &mut self.source {
            Source::Scripted(steps) => steps.pop_front().unwrap_or(Ok(None)),
            Source::Cli {
                child,
                lines,
                idle_timeout,
                finished,
            } => {
                if *finished {
                    return Ok(None);
                }
                loop {
                    let line = tokio::time::timeout(*idle_timeout, lines.next_line())
                        .await
                        .map_err(|_| AgentError::Timeout(idle_timeout.as_secs()))??;

                    match line {
                        None => {
                            // EOF before the terminal event: truncated stream.
                            *finished = true;
                            let status = child.wait().await?;
                            return Err(AgentError::Cli(format!(
                                "stream ended without result event (exit {status})"
                            )));
                        }
                        Some(line) if line.trim().is_empty() => continue,
                        Some(line) => match parse_stream_line(&line)? {
                            StreamEvent::Meta => continue,
                            StreamEvent::Fragment(text) => return Ok(Some(text)),
                            StreamEvent::Done => {
                                *finished = true;
                                let _ = child.wait().await;
                                return Ok(None);
                            }
                        },
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_stream_replays_in_order() {
        let mut stream = FragmentStream::scripted(vec![
            Ok(Some("a".to_string())),
            Ok(Some("b".to_string())),
            Ok(None),
        ]);

        assert_eq!(stream.next().await.unwrap(), Some("a".to_string()));
        assert_eq!(stream.next().await.unwrap(), Some("b".to_string()));
        assert_eq!(stream.next().await.unwrap(), None);
        // Exhausted scripts stay at end of stream
        assert_eq!(stream.next().await.unwrap(), None);
    }

    #[tokio::test]
    async fn collect_concatenates_stream() {
        let reply = AgentReply::Stream(FragmentStream::scripted(vec![
            Ok(Some("Risk ".to_string())),
            Ok(Some("On".to_string())),
            Ok(None),
        ]));

        assert_eq!(reply.collect().await.unwrap(), "Risk On");
    }

    #[tokio::test]
    async fn collect_passes_complete_through() {
        let reply = AgentReply::Complete("All quiet.".to_string());
        assert_eq!(reply.collect().await.unwrap(), "All quiet.");
    }

    #[tokio::test]
    async fn collect_propagates_stream_error() {
        let reply = AgentReply::Stream(FragmentStream::scripted(vec![
            Ok(Some("partial".to_string())),
            Err(AgentError::Cli("connection reset".to_string())),
        ]));

        assert!(reply.collect().await.is_err());
    }
}
