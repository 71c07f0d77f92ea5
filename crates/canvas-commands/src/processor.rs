//! Parser + dispatcher in one call
//!
//! This is the entry point the transport layer uses: raw model text in,
//! result payload out.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::dispatcher::Dispatcher;
use crate::error::CommandError;
use crate::parser::{self, ParsedCommand};
use crate::recorder::ActionRecorder;
use crate::result::ActionResult;

/// Results of one model response, mirroring its shape
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CommandResponse {
    Single(ActionResult),
    Batch(Vec<ActionResult>),
}

impl CommandResponse {
    pub fn results(&self) -> &[ActionResult] {
        match self {
            CommandResponse::Single(result) => std::slice::from_ref(result),
            CommandResponse::Batch(results) => results,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            CommandResponse::Single(result) => result.to_json(),
            CommandResponse::Batch(results) => {
                Value::Array(results.iter().map(ActionResult::to_json).collect())
            }
        }
    }
}

#[derive(Clone, Default)]
pub struct CommandProcessor {
    dispatcher: Dispatcher,
}

impl CommandProcessor {
    pub fn new() -> Self {
        Self {
            dispatcher: Dispatcher::new(),
        }
    }

    pub fn with_recorder(recorder: Arc<dyn ActionRecorder>) -> Self {
        Self {
            dispatcher: Dispatcher::with_recorder(recorder),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Parse and execute raw model text.
    ///
    /// Returns `Err` only for [`CommandError::MalformedResponse`]; there is
    /// no partial result in that case.
    pub fn process(&self, text: &str) -> Result<CommandResponse, CommandError> {
        parser::parse(text).map(|parsed| self.run(parsed))
    }

    /// Same as [`Self::process`] for input that is already JSON
    pub fn process_value(&self, value: &Value) -> Result<CommandResponse, CommandError> {
        parser::parse_value(value).map(|parsed| self.run(parsed))
    }

    pub fn run(&self, parsed: ParsedCommand) -> CommandResponse {
        match parsed {
            ParsedCommand::Single(Ok(action)) => {
                CommandResponse::Single(self.dispatcher.execute(&action))
            }
            ParsedCommand::Single(Err(err)) => {
                log::warn!("Rejected model action: {}", err);
                CommandResponse::Single(ActionResult::from(err))
            }
            ParsedCommand::Batch(entries) => {
                CommandResponse::Batch(self.dispatcher.execute_entries(&entries))
            }
        }
    }
}
