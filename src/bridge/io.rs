//! Newline-delimited JSON for the host link
//!
//! Parsing never panics on bad host traffic: every malformed line is
//! classified so the caller can log it and move on.

use tracing::warn;

use super::message::Message;

/// Longest slice of a raw line kept for logging
const MAX_RAW_PREVIEW: usize = 200;

fn preview(raw: &str) -> &str {
    &raw[..raw.len().min(MAX_RAW_PREVIEW)]
}

/// Outcome of parsing one line of host traffic
#[derive(Debug)]
pub enum ParseResult {
    Ok(Message),
    /// Valid JSON with no `type` field
    MissingType { raw: String },
    /// Valid JSON with a `type` outside the channel contract
    UnknownChannel { channel: String, raw: String },
    /// Known channel, payload does not match its shape
    InvalidPayload {
        channel: String,
        error: String,
        raw: String,
    },
    /// Not JSON at all
    ParseError(serde_json::Error),
}

/// Parse one line, classifying failures instead of propagating them.
pub fn parse_message_graceful(line: &str) -> ParseResult {
    let value: serde_json::Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(err) => return ParseResult::ParseError(err),
    };

    let channel = match value.get("type").and_then(|t| t.as_str()) {
        Some(t) => t.to_string(),
        None => {
            return ParseResult::MissingType {
                raw: preview(line).to_string(),
            }
        }
    };

    match serde_json::from_value::<Message>(value) {
        Ok(message) => ParseResult::Ok(message),
        Err(err) => {
            let error = err.to_string();
            if error.contains("unknown variant") {
                ParseResult::UnknownChannel {
                    channel,
                    raw: preview(line).to_string(),
                }
            } else {
                ParseResult::InvalidPayload {
                    channel,
                    error,
                    raw: preview(line).to_string(),
                }
            }
        }
    }
}

/// Strict parse for traffic we produced ourselves.
pub fn parse_message(line: &str) -> Result<Message, serde_json::Error> {
    serde_json::from_str(line).map_err(|err| {
        warn!(raw = preview(line), error = %err, "failed to parse host message");
        err
    })
}

/// Serialize a message to one JSONL line (no trailing newline).
pub fn serialize_message(message: &Message) -> Result<String, serde_json::Error> {
    serde_json::to_string(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_unknown_channel() {
        match parse_message_graceful(r#"{"type":"fromMain_modLookAt","record":{}}"#) {
            ParseResult::UnknownChannel { channel, .. } => {
                assert_eq!(channel, "fromMain_modLookAt");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn classifies_missing_type() {
        assert!(matches!(
            parse_message_graceful(r#"{"keys":["a"]}"#),
            ParseResult::MissingType { .. }
        ));
    }

    #[test]
    fn classifies_invalid_payload() {
        match parse_message_graceful(r#"{"type":"fromMain_getText_return","key":7}"#) {
            ParseResult::InvalidPayload { channel, .. } => {
                assert_eq!(channel, "fromMain_getText_return");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn classifies_syntax_error() {
        assert!(matches!(
            parse_message_graceful("not json"),
            ParseResult::ParseError(_)
        ));
    }

    #[test]
    fn serialize_then_parse() {
        let msg = Message::GetTextSend {
            keys: vec!["savegame_badge_unused".to_string()],
        };
        let line = serialize_message(&msg).unwrap();
        assert_eq!(parse_message(&line).unwrap(), msg);
    }
}
