//! Recorded input traces for offline replay.
//!
//! One JSON object per line: an `InputEvent` plus an optional `delay_ms`
//! (time since the previous line). Blank lines and `#` comments are skipped.

use std::io::BufRead;

use serde::{Deserialize, Serialize};
use vigil_common::{Result, VigilError};

use crate::event::InputEvent;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry {
    #[serde(default)]
    pub delay_ms: u64,
    #[serde(flatten)]
    pub event: InputEvent,
}

pub fn parse_trace(reader: impl BufRead) -> Result<Vec<TraceEntry>> {
    let mut entries = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.map_err(|e| VigilError::Trace {
            line: line_no,
            message: e.to_string(),
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let entry = serde_json::from_str(trimmed).map_err(|e| VigilError::Trace {
            line: line_no,
            message: e.to_string(),
        })?;
        entries.push(entry);
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trace() {
        let trace = r#"
# warm-up
{"type":"pointer_move","x":0,"y":0,"t":0}
{"delay_ms":16,"type":"pointer_move","x":4,"y":1,"t":16}

{"delay_ms":900,"type":"submit"}
"#;
        let entries = parse_trace(trace.as_bytes()).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].delay_ms, 0);
        assert_eq!(entries[1].delay_ms, 16);
        assert_eq!(entries[2].event, InputEvent::Submit);
    }

    #[test]
    fn test_parse_trace_reports_line() {
        let trace = "{\"type\":\"submit\"}\n{\"type\":\"teleport\"}\n";
        match parse_trace(trace.as_bytes()) {
            Err(VigilError::Trace { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected trace error, got {other:?}"),
        }
    }
}
