//! Fixed values shared by the command pipeline
//!
//! Single source of truth for canvas size, action tags, field names and
//! defaults. Nothing in here is configurable at runtime.

/// Logical canvas dimensions
pub mod canvas {
    /// Canvas width in logical units
    pub const WIDTH: f64 = 100.0;
    /// Canvas height in logical units
    pub const HEIGHT: f64 = 100.0;
    /// Horizontal center, used for oversize shapes and missing coordinates
    pub const CENTER_X: f64 = WIDTH / 2.0;
    /// Vertical center, used for oversize shapes and missing coordinates
    pub const CENTER_Y: f64 = HEIGHT / 2.0;
}

/// Action tags as they appear in the `action` field
pub mod tags {
    pub const CREATE_SHAPE: &str = "create_shape";
    pub const CONNECT_SHAPES: &str = "connect_shapes";
    pub const MODIFY_SHAPE: &str = "modify_shape";
    /// Older prompt wording for `modify_shape`
    pub const MODIFY_PROPERTIES: &str = "modify_properties";
    pub const DELETE_SHAPE: &str = "delete_shape";
}

/// Wire field names. The first entry of each alias list is canonical and is
/// what serialization produces.
pub mod fields {
    pub const ACTION: &str = "action";
    pub const SHAPE: &[&str] = &["shape", "shape_type"];
    pub const SHAPE_ID: &[&str] = &["shape", "shape_id"];
    pub const SHAPE1: &[&str] = &["shape1", "shape1_id"];
    pub const SHAPE2: &[&str] = &["shape2", "shape2_id"];
    pub const CONNECTION_TYPE: &[&str] = &["connection_type", "connector_type"];
    pub const PROPERTY: &[&str] = &["property", "property_name"];
    pub const VALUE: &[&str] = &["value", "new_value"];
    pub const X: &str = "x";
    pub const Y: &str = "y";
    pub const WIDTH: &str = "width";
    pub const HEIGHT: &str = "height";
    pub const RADIUS: &str = "radius";
    pub const COLOR: &str = "color";
}

/// Default values applied while decoding
pub mod defaults {
    /// Color used when the model does not name one
    pub const COLOR: &str = "default";
    /// Connector style used when the model does not name one
    pub const CONNECTION_TYPE: &str = "line";
}

/// Properties a `modify_shape` action may change
pub const MODIFIABLE_PROPERTIES: &[&str] = &["color", "width", "height", "line_style"];
