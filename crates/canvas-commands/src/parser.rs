//! Command parsing
//!
//! Turns the model's full response text into actions. A JSON object is a
//! single action; a JSON array is a batch decoded entry by entry, where one
//! bad entry does not spoil the others.

use serde_json::Value;

use crate::action::Action;
use crate::error::CommandError;

/// Decoded model output
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedCommand {
    /// The response was one action object
    Single(Result<Action, CommandError>),
    /// The response was an array; one entry per element, in order
    Batch(Vec<Result<Action, CommandError>>),
}

impl ParsedCommand {
    /// Number of actions the model asked for (including rejected ones)
    pub fn len(&self) -> usize {
        match self {
            ParsedCommand::Single(_) => 1,
            ParsedCommand::Batch(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Parse raw model text.
///
/// Only text that is not JSON at all (or JSON that is neither an object nor
/// an array) fails here, as [`CommandError::MalformedResponse`]. Everything
/// else is reported per action inside the returned [`ParsedCommand`].
pub fn parse(text: &str) -> Result<ParsedCommand, CommandError> {
    let body = strip_code_fence(text);
    let value: Value = serde_json::from_str(body).map_err(|e| {
        log::warn!("Model response is not valid JSON ({}): {}", e, text);
        CommandError::MalformedResponse {
            raw: text.to_string(),
        }
    })?;

    parse_value(&value).map_err(|err| match err {
        CommandError::MalformedResponse { .. } => CommandError::MalformedResponse {
            raw: text.to_string(),
        },
        other => other,
    })
}

/// Parse an already-decoded JSON value
pub fn parse_value(value: &Value) -> Result<ParsedCommand, CommandError> {
    match value {
        Value::Object(_) => Ok(ParsedCommand::Single(decode_action(value))),
        Value::Array(entries) => {
            let decoded: Vec<_> = entries.iter().map(decode_action).collect();
            log::debug!(
                "Parsed batch of {} actions ({} rejected)",
                decoded.len(),
                decoded.iter().filter(|entry| entry.is_err()).count()
            );
            Ok(ParsedCommand::Batch(decoded))
        }
        other => Err(CommandError::MalformedResponse {
            raw: other.to_string(),
        }),
    }
}

/// Decode one batch entry or single action value
pub fn decode_action(value: &Value) -> Result<Action, CommandError> {
    match value {
        Value::Object(map) => Action::from_map(map),
        _ => Err(CommandError::MissingActionTag),
    }
}

/// Remove one surrounding Markdown code fence, if present.
///
/// Local models often answer with ```` ```json ... ``` ```` even when told
/// not to.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };

    match body.find('\n') {
        // Anything on the opening line is a language hint
        Some(newline) => body[newline + 1..].trim(),
        None => body.trim(),
    }
}
