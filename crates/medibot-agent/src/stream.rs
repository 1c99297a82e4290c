use base64::Engine;

/// Fixed reply substituted when the agent stream yields no content.
///
/// An empty agent reply is deliberately not escalated to the caller as an
/// error; only transport-level failures of the call itself propagate.
pub const NO_CONTENT_REPLY: &str = "El agente no devolvió contenido.";

/// A single decoded event on the agent's response stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkEvent {
    /// A decoded text fragment, to be concatenated in arrival order.
    Fragment(String),
    /// The stream has finished.
    Done,
}

/// Parses one SSE line from the agent stream.
///
/// The agent emits lines of the form `data: {"chunk":{"bytes":"<base64>"}}`
/// and terminates with `data: [DONE]`. Blank lines, comments, and malformed
/// payloads yield `None` and are skipped by the consumer.
pub fn parse_data_line(line: &str) -> Option<ChunkEvent> {
    let line = line.trim();
    if line.is_empty() || line.starts_with(':') {
        return None;
    }
    let data = line.strip_prefix("data: ")?;
    if data == "[DONE]" {
        return Some(ChunkEvent::Done);
    }

    let event: serde_json::Value = serde_json::from_str(data).ok()?;
    let encoded = event["chunk"]["bytes"].as_str()?;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .ok()?;
    Some(ChunkEvent::Fragment(
        String::from_utf8_lossy(&bytes).into_owned(),
    ))
}
