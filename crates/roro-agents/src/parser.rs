use crate::error::AgentError;

/// One decoded line of the CLI's stream-json output.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Incremental assistant text.
    Fragment(String),
    /// Terminal event; the fragment sequence is complete.
    Done,
    /// Bookkeeping events (session init, tool traffic) with no text payload.
    Meta,
}

/// Decode one stdout line of `claude --output-format stream-json`.
///
/// Recognized event types:
/// - `assistant` → a fragment (the message's text blocks, concatenated),
///   or metadata when the message carries no text (tool-use only)
/// - `result` → end of stream
/// - `system` / `user` → metadata
///
/// Anything else (a non-JSON line, a missing `type`, an unknown type)
/// is an unrecognized shape and fails the stream.
pub fn parse_stream_line(line: &str) -> Result<StreamEvent, AgentError> {
    let event: serde_json::Value = serde_json::from_str(line)
        .map_err(|e| AgentError::Shape(format!("not a JSON event: {e}")))?;

    match event.get("type").and_then(|t| t.as_str()) {
        Some("assistant") => Ok(fragment_text(&event)
            .map(StreamEvent::Fragment)
            .unwrap_or(StreamEvent::Meta)),
        Some("result") => Ok(StreamEvent::Done),
        Some("system") | Some("user") => Ok(StreamEvent::Meta),
        Some(other) => Err(AgentError::Shape(format!("unknown event type: {other}"))),
        None => Err(AgentError::Shape("event without a type field".to_string())),
    }
}

/// Concatenated text blocks of an assistant message event.
fn fragment_text(event: &serde_json::Value) -> Option<String> {
    let blocks = event.get("message")?.get("content")?.as_array()?;

    let mut text = String::new();
    for block in blocks {
        if block.get("type").and_then(|t| t.as_str()) == Some("text") {
            if let Some(chunk) = block.get("text").and_then(|t| t.as_str()) {
                text.push_str(chunk);
            }
        }
    }

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assistant_event_yields_fragment() {
        let line = r#"{"type":"assistant","message":{"content":[{"type":"text","text":"Risk On "}]}}"#;
        assert_eq!(
            parse_stream_line(line).unwrap(),
            StreamEvent::Fragment("Risk On ".to_string())
        );
    }

    #[test]
    fn assistant_text_blocks_are_concatenated() {
        let line = r#"{"type":"assistant","message":{"content":[
            {"type":"text","text":"62.50% "},
            {"type":"text","text":"this week"}
        ]}}"#;
        assert_eq!(
            parse_stream_line(line).unwrap(),
            StreamEvent::Fragment("62.50% this week".to_string())
        );
    }

    #[test]
    fn tool_use_only_message_is_meta() {
        let line = r#"{"type":"assistant","message":{"content":[{"type":"tool_use","name":"WebSearch","input":{}}]}}"#;
        assert_eq!(parse_stream_line(line).unwrap(), StreamEvent::Meta);
    }

    #[test]
    fn result_event_terminates() {
        let line = r#"{"type":"result","subtype":"success","result":"done"}"#;
        assert_eq!(parse_stream_line(line).unwrap(), StreamEvent::Done);
    }

    #[test]
    fn system_and_user_events_are_meta() {
        let init = r#"{"type":"system","subtype":"init","model":"claude-3-5-haiku-latest"}"#;
        let tool_result = r#"{"type":"user","message":{"content":[{"type":"tool_result"}]}}"#;
        assert_eq!(parse_stream_line(init).unwrap(), StreamEvent::Meta);
        assert_eq!(parse_stream_line(tool_result).unwrap(), StreamEvent::Meta);
    }

    #[test]
    fn plain_text_line_is_unrecognized_shape() {
        let result = parse_stream_line("not json at all");
        assert!(matches!(result, Err(AgentError::Shape(_))));
    }

    #[test]
    fn unknown_event_type_is_unrecognized_shape() {
        let result = parse_stream_line(r#"{"type":"surprise"}"#);
        assert!(matches!(result, Err(AgentError::Shape(_))));
    }

    #[test]
    fn event_without_type_is_unrecognized_shape() {
        let result = parse_stream_line(r#"{"message":"hello"}"#);
        assert!(matches!(result, Err(AgentError::Shape(_))));
    }
}
