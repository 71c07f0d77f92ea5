//! Shape validation and field coercion
//!
//! Models emit numbers as strings, omit fields, or mix `radius` with explicit
//! dimensions. The helpers here coerce what can be coerced and report
//! everything else as [`CommandError::InvalidField`].

use serde_json::{Map, Value};

use crate::action::ShapeSpec;
use crate::constants::{canvas, defaults, fields};
use crate::error::CommandError;

/// Validate the raw fields of a `create_shape` request.
///
/// `radius` wins over `width`/`height` when both are given, and becomes
/// `width = height = 2 * radius`. Missing coordinates default to the canvas
/// center. Position is not clamped here, see [`crate::geometry::adjust`].
pub fn validate_shape(map: &Map<String, Value>) -> Result<ShapeSpec, CommandError> {
    let shape_type = optional_text(map, fields::SHAPE)?
        .ok_or_else(|| CommandError::invalid_field(fields::SHAPE[0]))?;

    let x = optional_number(map, fields::X)?.unwrap_or(canvas::CENTER_X);
    let y = optional_number(map, fields::Y)?.unwrap_or(canvas::CENTER_Y);

    let (width, height) = match optional_number(map, fields::RADIUS)? {
        Some(radius) => {
            let radius = positive(radius, fields::RADIUS)?;
            if map.contains_key(fields::WIDTH) || map.contains_key(fields::HEIGHT) {
                log::debug!("create_shape has both radius and width/height, using radius");
            }
            (radius * 2.0, radius * 2.0)
        }
        None => {
            let width = optional_number(map, fields::WIDTH)?;
            let height = optional_number(map, fields::HEIGHT)?;
            match (width, height) {
                (Some(width), Some(height)) => (
                    positive(width, fields::WIDTH)?,
                    positive(height, fields::HEIGHT)?,
                ),
                _ => return Err(CommandError::MissingDimensions),
            }
        }
    };

    let color = match map.get(fields::COLOR) {
        None | Some(Value::Null) => defaults::COLOR.to_string(),
        Some(Value::String(color)) if color.trim().is_empty() => defaults::COLOR.to_string(),
        Some(Value::String(color)) => color.trim().to_string(),
        Some(_) => return Err(CommandError::invalid_field(fields::COLOR)),
    };

    Ok(ShapeSpec {
        shape_type,
        x,
        y,
        width,
        height,
        color,
    })
}

/// First non-null value among `keys` (canonical name first, then aliases)
pub fn lookup<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find(|value| !value.is_null())
}

/// Coerce a JSON number or numeric string to a finite `f64`
pub fn coerce_number(value: &Value, name: &str) -> Result<f64, CommandError> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match number {
        Some(n) if n.is_finite() => Ok(n),
        _ => Err(CommandError::invalid_field(name)),
    }
}

/// Shape identifier: a non-empty string, or a number rendered as text
pub fn identifier(map: &Map<String, Value>, keys: &[&str]) -> Result<String, CommandError> {
    let name = keys[0];
    match lookup(map, keys) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(CommandError::invalid_field(name)),
    }
}

/// Optional non-empty string field. Blank strings count as absent; any other
/// JSON type is invalid.
pub fn optional_text(
    map: &Map<String, Value>,
    keys: &[&str],
) -> Result<Option<String>, CommandError> {
    match lookup(map, keys) {
        None => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(_) => Err(CommandError::invalid_field(keys[0])),
    }
}

fn optional_number(map: &Map<String, Value>, key: &str) -> Result<Option<f64>, CommandError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => coerce_number(value, key).map(Some),
    }
}

fn positive(value: f64, name: &str) -> Result<f64, CommandError> {
    if value > 0.0 {
        Ok(value)
    } else {
        Err(CommandError::invalid_field(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test fixture must be an object"),
        }
    }

    #[test]
    fn test_radius_sugar() {
        let spec = validate_shape(&fields(json!({
            "shape": "circle", "x": 50, "y": 50, "radius": 25, "color": "red"
        })))
        .unwrap();
        assert_eq!(spec.width, 50.0);
        assert_eq!(spec.height, 50.0);
        assert_eq!(spec.color, "red");
    }

    #[test]
    fn test_radius_takes_precedence() {
        let spec = validate_shape(&fields(json!({
            "shape": "circle", "x": 50, "y": 50, "radius": 10, "width": 80, "height": 5
        })))
        .unwrap();
        assert_eq!((spec.width, spec.height), (20.0, 20.0));
    }

    #[test]
    fn test_missing_dimensions() {
        let result = validate_shape(&fields(json!({"shape": "square", "x": 1, "y": 2, "width": 10})));
        assert_eq!(result, Err(CommandError::MissingDimensions));
    }

    #[test]
    fn test_numeric_strings_are_coerced() {
        let spec = validate_shape(&fields(json!({
            "shape": "rectangle", "x": "12.5", "y": " 40 ", "width": "30", "height": 20
        })))
        .unwrap();
        assert_eq!((spec.x, spec.y, spec.width, spec.height), (12.5, 40.0, 30.0, 20.0));
    }

    #[test]
    fn test_non_numeric_field_is_invalid() {
        let result = validate_shape(&fields(json!({
            "shape": "square", "x": "left", "y": 10, "width": 10, "height": 10
        })));
        assert_eq!(result, Err(CommandError::invalid_field("x")));

        let result = validate_shape(&fields(json!({
            "shape": "square", "x": 1, "y": 10, "width": [10], "height": 10
        })));
        assert_eq!(result, Err(CommandError::invalid_field("width")));
    }

    #[test]
    fn test_overflowing_numbers_are_invalid() {
        let map: Map<String, Value> =
            serde_json::from_str(r#"{"shape": "square", "width": 1e400, "height": 5}"#).unwrap();
        assert_eq!(validate_shape(&map), Err(CommandError::invalid_field("width")));

        assert_eq!(
            coerce_number(&json!("-1e999"), "y"),
            Err(CommandError::invalid_field("y"))
        );
    }

    #[test]
    fn test_non_positive_dimensions_are_invalid() {
        let result = validate_shape(&fields(json!({
            "shape": "square", "width": -4, "height": 10
        })));
        assert_eq!(result, Err(CommandError::invalid_field("width")));

        let result = validate_shape(&fields(json!({"shape": "circle", "radius": 0})));
        assert_eq!(result, Err(CommandError::invalid_field("radius")));
    }

    #[test]
    fn test_color_defaults() {
        let spec = validate_shape(&fields(json!({"shape": "square", "width": 5, "height": 5})))
            .unwrap();
        assert_eq!(spec.color, "default");

        let spec = validate_shape(&fields(json!({
            "shape": "square", "width": 5, "height": 5, "color": "  "
        })))
        .unwrap();
        assert_eq!(spec.color, "default");

        let result = validate_shape(&fields(json!({
            "shape": "square", "width": 5, "height": 5, "color": 3
        })));
        assert_eq!(result, Err(CommandError::invalid_field("color")));
    }

    #[test]
    fn test_missing_position_defaults_to_center() {
        let spec = validate_shape(&fields(json!({"shape": "star", "width": 5, "height": 5})))
            .unwrap();
        assert_eq!((spec.x, spec.y), (50.0, 50.0));
        assert_eq!(spec.shape_type, "star");
    }

    #[test]
    fn test_shape_type_alias_and_missing() {
        let spec = validate_shape(&fields(json!({"shape_type": "oval", "radius": 3})))
            .unwrap();
        assert_eq!(spec.shape_type, "oval");

        let result = validate_shape(&fields(json!({"radius": 3})));
        assert_eq!(result, Err(CommandError::invalid_field("shape")));
    }

    #[test]
    fn test_identifier_accepts_numbers() {
        let map = fields(json!({"shape_id": 12}));
        assert_eq!(identifier(&map, &["shape", "shape_id"]).unwrap(), "12");

        let map = fields(json!({"shape": ""}));
        assert_eq!(
            identifier(&map, &["shape", "shape_id"]),
            Err(CommandError::invalid_field("shape"))
        );
    }
}
