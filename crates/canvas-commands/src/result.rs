//! Result payloads returned to the transport layer
//!
//! Every result serializes to a JSON object with a `status` of `success` or
//! `error`, followed by the action-specific fields.

use serde::Serialize;
use serde_json::Value;

use crate::error::CommandError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

/// What a successful action did
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ActionOutcome {
    ShapeCreated {
        shape_type: String,
        position: Position,
        dimensions: Dimensions,
        color: String,
    },
    ShapesConnected {
        shape1_id: String,
        shape2_id: String,
        connection_type: String,
    },
    ShapeModified {
        shape_id: String,
        property_name: String,
        new_value: Value,
    },
    ShapeDeleted {
        shape_id: String,
    },
}

/// Why an action was not carried out
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionFailure {
    /// Snake-case failure kind, see [`CommandError::kind`]
    pub error_kind: String,
    /// Human-readable message suitable for showing to the user
    pub message: String,
    /// Rejected property name, for `unknown_property` failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ActionResult {
    Success(ActionOutcome),
    Error(ActionFailure),
}

impl ActionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ActionResult::Success(_))
    }

    pub fn is_error(&self) -> bool {
        !self.is_success()
    }

    /// JSON form of this result
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            log::error!("Failed to serialize action result: {}", e);
            serde_json::json!({"status": "error", "message": e.to_string()})
        })
    }
}

impl From<CommandError> for ActionResult {
    fn from(err: CommandError) -> Self {
        let property = match &err {
            CommandError::UnknownProperty { property } => Some(property.clone()),
            _ => None,
        };
        ActionResult::Error(ActionFailure {
            error_kind: err.kind().to_string(),
            message: err.to_string(),
            property,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_payload_shape() {
        let result = ActionResult::Success(ActionOutcome::ShapeCreated {
            shape_type: "circle".to_string(),
            position: Position { x: 25.0, y: 75.0 },
            dimensions: Dimensions {
                width: 50.0,
                height: 50.0,
            },
            color: "red".to_string(),
        });

        assert_eq!(
            result.to_json(),
            json!({
                "status": "success",
                "shape_type": "circle",
                "position": {"x": 25.0, "y": 75.0},
                "dimensions": {"width": 50.0, "height": 50.0},
                "color": "red"
            })
        );
    }

    #[test]
    fn test_unknown_property_echoes_name() {
        let result = ActionResult::from(CommandError::UnknownProperty {
            property: "opacity".to_string(),
        });

        assert!(result.is_error());
        assert_eq!(
            result.to_json(),
            json!({
                "status": "error",
                "error_kind": "unknown_property",
                "message": "Property 'opacity' cannot be modified",
                "property": "opacity"
            })
        );
    }

    #[test]
    fn test_unsupported_message() {
        let result = ActionResult::from(CommandError::UnsupportedAction {
            tag: "rotate".to_string(),
        });
        let json = result.to_json();
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "Unsupported command 'rotate'");
        assert!(json.get("property").is_none());
    }
}
