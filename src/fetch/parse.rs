//! Payload parse pipeline
//!
//! Feeds are frequently served with junk around the JSON document (BOMs, HTML wrappers, stray
//! log lines). Parsing runs an ordered list of attempts and reports which one succeeded
//! instead of using errors for control flow.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value as JsonValue;

/// First `{` through last `}`, or first `[` through last `]`, whichever opens first
static EMBEDDED_JSON: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}|\[.*\]").ok());

/// Parser attempts, in the order they are tried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStrategy {
    /// The whole body is a JSON document
    Strict,
    /// The body contains a JSON object or array surrounded by other text
    BracketExtract,
}

pub const PIPELINE: &[ParseStrategy] = &[ParseStrategy::Strict, ParseStrategy::BracketExtract];

#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Parsed {
        value: JsonValue,
        strategy: ParseStrategy,
    },
    Failed {
        reason: String,
    },
}

impl ParseStrategy {
    fn attempt(self, text: &str) -> std::result::Result<JsonValue, String> {
        match self {
            ParseStrategy::Strict => serde_json::from_str(text).map_err(|e| e.to_string()),
            ParseStrategy::BracketExtract => {
                let pattern = EMBEDDED_JSON
                    .as_ref()
                    .ok_or_else(|| "extraction pattern unavailable".to_string())?;
                let found = pattern
                    .find(text)
                    .ok_or_else(|| "no JSON object or array found".to_string())?;
                serde_json::from_str(found.as_str()).map_err(|e| e.to_string())
            }
        }
    }
}

/// Parse a raw feed body
///
/// The reported failure reason is the one from the last attempt.
pub fn parse_payload(text: &str) -> ParseOutcome {
    let mut reason = String::from("empty parse pipeline");

    for &strategy in PIPELINE {
        match strategy.attempt(text) {
            Ok(value) => {
                if strategy != ParseStrategy::Strict {
                    tracing::debug!(?strategy, "recovered embedded JSON payload");
                }
                return ParseOutcome::Parsed { value, strategy };
            }
            Err(e) => reason = e,
        }
    }

    ParseOutcome::Failed { reason }
}
