//! Message framing for newline-delimited JSON.

use crate::types::{Envelope, PluginEvent, PluginResult};

/// Parse a single line of text as a plugin event.
pub fn parse_event(line: &str) -> PluginResult<PluginEvent> {
    Ok(serde_json::from_str(line.trim())?)
}

/// Serialize an envelope to a JSON line (with trailing newline).
pub fn frame_envelope(envelope: &Envelope) -> PluginResult<String> {
    let mut json = serde_json::to_string(envelope)?;
    json.push('\n');
    Ok(json)
}
