//! Action dispatch
//!
//! Routes each [`Action`] to its handler and turns the outcome into an
//! [`ActionResult`]. Handlers never fail loudly: every rejection becomes an
//! error result so a batch can keep going.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::action::{Action, ShapeSpec};
use crate::constants::MODIFIABLE_PROPERTIES;
use crate::error::CommandError;
use crate::geometry;
use crate::recorder::ActionRecorder;
use crate::result::{ActionOutcome, ActionResult, Dimensions, Position};
use crate::validator::coerce_number;

/// Stateless action dispatcher.
///
/// Cloning is cheap; the only shared piece is the optional recorder.
#[derive(Clone, Default)]
pub struct Dispatcher {
    recorder: Option<Arc<dyn ActionRecorder>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self { recorder: None }
    }

    /// Dispatcher that reports successful actions to `recorder`
    pub fn with_recorder(recorder: Arc<dyn ActionRecorder>) -> Self {
        Self {
            recorder: Some(recorder),
        }
    }

    /// Execute one action
    pub fn execute(&self, action: &Action) -> ActionResult {
        let outcome = match action {
            Action::CreateShape(spec) => create_shape(spec),
            Action::ConnectShapes {
                shape1_id,
                shape2_id,
                connection_type,
            } => Ok(ActionOutcome::ShapesConnected {
                shape1_id: shape1_id.clone(),
                shape2_id: shape2_id.clone(),
                connection_type: connection_type.clone(),
            }),
            Action::ModifyShape {
                shape_id,
                property_name,
                new_value,
            } => modify_shape(shape_id, property_name, new_value),
            Action::DeleteShape { shape_id } => Ok(ActionOutcome::ShapeDeleted {
                shape_id: shape_id.clone(),
            }),
        };

        match outcome {
            Ok(outcome) => {
                let result = ActionResult::Success(outcome);
                self.record(action, &result);
                result
            }
            Err(err) => {
                log::warn!("{} rejected: {}", action.tag(), err);
                ActionResult::from(err)
            }
        }
    }

    /// Execute a batch in input order
    pub fn execute_batch(&self, batch: &[Action]) -> Vec<ActionResult> {
        batch.iter().map(|action| self.execute(action)).collect()
    }

    /// Execute best-effort parser output: entries that failed to decode
    /// become error results in place
    pub fn execute_entries(&self, entries: &[Result<Action, CommandError>]) -> Vec<ActionResult> {
        entries
            .iter()
            .map(|entry| match entry {
                Ok(action) => self.execute(action),
                Err(err) => ActionResult::from(err.clone()),
            })
            .collect()
    }

    fn record(&self, action: &Action, result: &ActionResult) {
        let Some(recorder) = &self.recorder else {
            return;
        };
        let identifier = match action {
            Action::CreateShape(spec) => spec.shape_type.clone(),
            Action::ConnectShapes {
                shape1_id,
                shape2_id,
                ..
            } => format!("{}->{}", shape1_id, shape2_id),
            Action::ModifyShape { shape_id, .. } | Action::DeleteShape { shape_id } => {
                shape_id.clone()
            }
        };
        recorder.record(action.tag(), &identifier, &result.to_json());
    }
}

fn create_shape(spec: &ShapeSpec) -> Result<ActionOutcome, CommandError> {
    spec.validate()?;
    let (x, y) = geometry::adjust(spec.x, spec.y, spec.width, spec.height);
    if (x, y) != (spec.x, spec.y) {
        log::debug!(
            "Moved {} from ({}, {}) to ({}, {}) to keep it on the canvas",
            spec.shape_type,
            spec.x,
            spec.y,
            x,
            y
        );
    }

    Ok(ActionOutcome::ShapeCreated {
        shape_type: spec.shape_type.clone(),
        position: Position { x, y },
        dimensions: Dimensions {
            width: spec.width,
            height: spec.height,
        },
        color: spec.color.clone(),
    })
}

fn modify_shape(
    shape_id: &str,
    property_name: &str,
    new_value: &Value,
) -> Result<ActionOutcome, CommandError> {
    if !MODIFIABLE_PROPERTIES.contains(&property_name) {
        return Err(CommandError::UnknownProperty {
            property: property_name.to_string(),
        });
    }

    let new_value = match property_name {
        "width" | "height" => {
            let number = coerce_number(new_value, "new_value")?;
            if number <= 0.0 {
                return Err(CommandError::invalid_field("new_value"));
            }
            json!(number)
        }
        _ => match new_value {
            Value::String(s) if !s.trim().is_empty() => json!(s.trim()),
            _ => return Err(CommandError::invalid_field("new_value")),
        },
    };

    Ok(ActionOutcome::ShapeModified {
        shape_id: shape_id.to_string(),
        property_name: property_name.to_string(),
        new_value,
    })
}
