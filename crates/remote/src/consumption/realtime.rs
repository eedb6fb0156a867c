//! Realtime insert notifications delivered as server-sent events.
//!
//! The stream endpoint emits one `data:` payload per change:
//! `{"type":"INSERT","table":"consumption_logs","record":{...row...}}`.
//! Comment lines keep the connection alive and are skipped.

use givd_core::constants::CONSUMPTION_TABLE;
use givd_core::consumption::ConsumptionEvent;
use serde::Deserialize;

use super::model::ConsumptionRow;
use crate::errors::{RemoteError, Result};

/// Change notification envelope.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RealtimeMessage {
    #[serde(rename = "type")]
    pub kind: String,
    pub table: String,
    #[serde(default)]
    pub record: Option<serde_json::Value>,
}

/// Incremental `text/event-stream` decoder.
///
/// Chunks may split lines (and UTF-8 sequences) anywhere; only complete
/// events are returned.
#[derive(Debug, Default)]
pub struct SseDecoder {
    pending: Vec<u8>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one chunk and returns the data of every event it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut completed = Vec::new();
        while let Some(newline) = self.pending.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.pending.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&raw[..raw.len() - 1]);
            let line = line.strip_suffix('\r').unwrap_or(&*line);

            if line.is_empty() {
                if !self.data.is_empty() {
                    completed.push(self.data.join("\n"));
                    self.data.clear();
                }
            } else if let Some(value) = line.strip_prefix("data:") {
                self.data
                    .push(value.strip_prefix(' ').unwrap_or(value).to_string());
            }
            // Comments (`:`) and the event/id/retry fields carry nothing we use.
        }
        completed
    }
}

/// Decodes an event payload into a consumption event.
///
/// Returns `None` for anything other than an insert on the consumption table.
pub fn decode_insert(payload: &str) -> Result<Option<ConsumptionEvent>> {
    let message: RealtimeMessage = serde_json::from_str(payload)?;
    if !message.kind.eq_ignore_ascii_case("INSERT") || message.table != CONSUMPTION_TABLE {
        return Ok(None);
    }
    let record = message
        .record
        .ok_or_else(|| RemoteError::Stream("Insert notification without record".to_string()))?;
    let row: ConsumptionRow = serde_json::from_value(record)?;
    Ok(Some(ConsumptionEvent::from(row)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const INSERT: &str = r#"{"type":"INSERT","table":"consumption_logs","record":{"id":"c1","user_id":"u1","product_name":"Café","quantity_used":2,"timestamp":"2024-03-05T08:30:00+00:00"}}"#;

    #[test]
    fn test_decoder_handles_split_chunks_and_comments() {
        let stream = format!(": keep-alive\n\nevent: change\ndata: {}\n\n", INSERT);
        let bytes = stream.as_bytes();
        let mut decoder = SseDecoder::new();

        let mut payloads = Vec::new();
        // Split in the middle of the multi-byte 'é'.
        let split = stream.find("Caf").unwrap() + 4;
        payloads.extend(decoder.push(&bytes[..split]));
        assert!(payloads.is_empty());
        payloads.extend(decoder.push(&bytes[split..]));

        assert_eq!(payloads, vec![INSERT.to_string()]);
    }

    #[test]
    fn test_decoder_joins_multiline_data_and_crlf() {
        let mut decoder = SseDecoder::new();
        let payloads = decoder.push(b"data: first\r\ndata:second\r\n\r\n");
        assert_eq!(payloads, vec!["first\nsecond".to_string()]);
    }

    #[test]
    fn test_decode_insert() {
        let event = decode_insert(INSERT).unwrap().unwrap();
        assert_eq!(event.id, "c1");
        assert_eq!(event.user_id, "u1");
        assert_eq!(event.product_name, "Café");
        assert_eq!(event.quantity_used, 2.0);
    }

    #[test]
    fn test_other_notifications_are_ignored() {
        let update = INSERT.replace("\"INSERT\"", "\"UPDATE\"");
        assert_eq!(decode_insert(&update).unwrap(), None);

        let other_table = INSERT.replace("consumption_logs", "products");
        assert_eq!(decode_insert(&other_table).unwrap(), None);
    }

    #[test]
    fn test_malformed_payload_is_an_error() {
        assert!(decode_insert("not json").is_err());
        assert!(decode_insert(r#"{"type":"INSERT","table":"consumption_logs"}"#).is_err());
    }
}
