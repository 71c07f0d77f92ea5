use thiserror::Error;

/// Everything that can go wrong between raw model text and a dispatched action.
///
/// These are reported as data (error results), never as panics.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("Invalid JSON response from the assistant: {raw}")]
    MalformedResponse { raw: String },

    #[error("Action is missing the 'action' field")]
    MissingActionTag,

    #[error("Unsupported command '{tag}'")]
    UnsupportedAction { tag: String },

    #[error("Invalid value for field '{name}'")]
    InvalidField { name: String },

    #[error("Shape needs a radius or both width and height")]
    MissingDimensions,

    #[error("Property '{property}' cannot be modified")]
    UnknownProperty { property: String },
}

impl CommandError {
    pub fn invalid_field(name: impl Into<String>) -> Self {
        CommandError::InvalidField { name: name.into() }
    }

    /// Stable snake_case name of the failure kind, used in result payloads
    pub fn kind(&self) -> &'static str {
        match self {
            CommandError::MalformedResponse { .. } => "malformed_response",
            CommandError::MissingActionTag => "missing_action_tag",
            CommandError::UnsupportedAction { .. } => "unsupported_action",
            CommandError::InvalidField { .. } => "invalid_field",
            CommandError::MissingDimensions => "missing_dimensions",
            CommandError::UnknownProperty { .. } => "unknown_property",
        }
    }
}
