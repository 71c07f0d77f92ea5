//! Action model
//!
//! Actions are decoded once at the boundary (see [`crate::parser`]) and are
//! strongly typed from then on. Serialization always emits canonical field
//! names, so a serialized action parses back to an equal value.
//!
//! That holds for actions from the decoder and for actions built with the
//! constructors here, which trim and default their text the same way. A
//! variant filled in by hand with padded or blank text is not normalized.

use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

use crate::constants::{canvas, defaults, fields, tags};
use crate::error::CommandError;
use crate::validator::{self, validate_shape};

/// Validated parameters of a shape creation request
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeSpec {
    /// Shape kind as named by the model ("circle", "rectangle", ...). Not
    /// checked against any registry.
    pub shape_type: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: String,
}

impl ShapeSpec {
    /// Build a spec positioned at the canvas center with the default color
    pub fn new(shape_type: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            shape_type: shape_type.into().trim().to_string(),
            x: canvas::CENTER_X,
            y: canvas::CENTER_Y,
            width,
            height,
            color: defaults::COLOR.to_string(),
        }
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Blank colors mean the default color
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        let color = color.into();
        self.color = match color.trim() {
            "" => defaults::COLOR.to_string(),
            trimmed => trimmed.to_string(),
        };
        self
    }

    /// Re-check the invariants the decoder guarantees.
    ///
    /// Specs built in code skip the decoder, so the dispatcher runs this
    /// before placing any shape.
    pub fn validate(&self) -> Result<(), CommandError> {
        if self.shape_type.trim().is_empty() {
            return Err(CommandError::invalid_field(fields::SHAPE[0]));
        }
        if !self.x.is_finite() {
            return Err(CommandError::invalid_field(fields::X));
        }
        if !self.y.is_finite() {
            return Err(CommandError::invalid_field(fields::Y));
        }
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(CommandError::invalid_field(fields::WIDTH));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(CommandError::invalid_field(fields::HEIGHT));
        }
        if self.color.trim().is_empty() {
            return Err(CommandError::invalid_field(fields::COLOR));
        }
        Ok(())
    }
}

/// One canvas operation requested by the model
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    CreateShape(ShapeSpec),
    ConnectShapes {
        shape1_id: String,
        shape2_id: String,
        connection_type: String,
    },
    ModifyShape {
        shape_id: String,
        property_name: String,
        new_value: Value,
    },
    DeleteShape {
        shape_id: String,
    },
}

impl Action {
    /// Connect two shapes. A blank connection type means a plain line.
    pub fn connect(
        shape1_id: impl Into<String>,
        shape2_id: impl Into<String>,
        connection_type: impl Into<String>,
    ) -> Result<Self, CommandError> {
        let connection_type = connection_type.into();
        Ok(Action::ConnectShapes {
            shape1_id: required_text(shape1_id, fields::SHAPE1[0])?,
            shape2_id: required_text(shape2_id, fields::SHAPE2[0])?,
            connection_type: match connection_type.trim() {
                "" => defaults::CONNECTION_TYPE.to_string(),
                trimmed => trimmed.to_string(),
            },
        })
    }

    /// Change one property. A null value is rejected like a missing one.
    pub fn modify(
        shape_id: impl Into<String>,
        property_name: impl Into<String>,
        new_value: Value,
    ) -> Result<Self, CommandError> {
        if new_value.is_null() {
            return Err(CommandError::invalid_field(fields::VALUE[0]));
        }
        Ok(Action::ModifyShape {
            shape_id: required_text(shape_id, fields::SHAPE_ID[0])?,
            property_name: required_text(property_name, fields::PROPERTY[0])?,
            new_value,
        })
    }

    pub fn delete(shape_id: impl Into<String>) -> Result<Self, CommandError> {
        Ok(Action::DeleteShape {
            shape_id: required_text(shape_id, fields::SHAPE_ID[0])?,
        })
    }

    /// Canonical action tag
    pub fn tag(&self) -> &'static str {
        match self {
            Action::CreateShape(_) => tags::CREATE_SHAPE,
            Action::ConnectShapes { .. } => tags::CONNECT_SHAPES,
            Action::ModifyShape { .. } => tags::MODIFY_SHAPE,
            Action::DeleteShape { .. } => tags::DELETE_SHAPE,
        }
    }

    /// Decode one action mapping.
    ///
    /// Accepts the field aliases listed in [`crate::constants::fields`] and
    /// applies the defaulting rules (color, connection type, radius sugar).
    pub fn from_map(map: &Map<String, Value>) -> Result<Self, CommandError> {
        let tag = match map.get(fields::ACTION) {
            None | Some(Value::Null) => return Err(CommandError::MissingActionTag),
            Some(Value::String(tag)) => tag.trim(),
            Some(other) => {
                return Err(CommandError::UnsupportedAction {
                    tag: other.to_string(),
                })
            }
        };

        match tag {
            tags::CREATE_SHAPE => validate_shape(map).map(Action::CreateShape),
            tags::CONNECT_SHAPES => {
                let shape1_id = validator::identifier(map, fields::SHAPE1)?;
                let shape2_id = validator::identifier(map, fields::SHAPE2)?;
                let connection_type = validator::optional_text(map, fields::CONNECTION_TYPE)?
                    .unwrap_or_else(|| defaults::CONNECTION_TYPE.to_string());
                Ok(Action::ConnectShapes {
                    shape1_id,
                    shape2_id,
                    connection_type,
                })
            }
            tags::MODIFY_SHAPE | tags::MODIFY_PROPERTIES => {
                let shape_id = validator::identifier(map, fields::SHAPE_ID)?;
                let property_name = validator::optional_text(map, fields::PROPERTY)?
                    .ok_or_else(|| CommandError::invalid_field(fields::PROPERTY[0]))?;
                let new_value = validator::lookup(map, fields::VALUE)
                    .cloned()
                    .ok_or_else(|| CommandError::invalid_field(fields::VALUE[0]))?;
                Ok(Action::ModifyShape {
                    shape_id,
                    property_name,
                    new_value,
                })
            }
            tags::DELETE_SHAPE => Ok(Action::DeleteShape {
                shape_id: validator::identifier(map, fields::SHAPE_ID)?,
            }),
            "" => Err(CommandError::MissingActionTag),
            other => Err(CommandError::UnsupportedAction {
                tag: other.to_string(),
            }),
        }
    }

    /// Canonical JSON form, as the model would have written it
    pub fn to_json(&self) -> Value {
        match self {
            Action::CreateShape(spec) => json!({
                "action": tags::CREATE_SHAPE,
                "shape": spec.shape_type,
                "x": spec.x,
                "y": spec.y,
                "width": spec.width,
                "height": spec.height,
                "color": spec.color,
            }),
            Action::ConnectShapes {
                shape1_id,
                shape2_id,
                connection_type,
            } => json!({
                "action": tags::CONNECT_SHAPES,
                "shape1": shape1_id,
                "shape2": shape2_id,
                "connection_type": connection_type,
            }),
            Action::ModifyShape {
                shape_id,
                property_name,
                new_value,
            } => json!({
                "action": tags::MODIFY_SHAPE,
                "shape": shape_id,
                "property": property_name,
                "value": new_value,
            }),
            Action::DeleteShape { shape_id } => json!({
                "action": tags::DELETE_SHAPE,
                "shape": shape_id,
            }),
        }
    }
}

/// Trimmed, non-empty text
fn required_text(value: impl Into<String>, name: &str) -> Result<String, CommandError> {
    let value = value.into();
    match value.trim() {
        "" => Err(CommandError::invalid_field(name)),
        trimmed => Ok(trimmed.to_string()),
    }
}

impl Serialize for Action {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json().serialize(serializer)
    }
}
