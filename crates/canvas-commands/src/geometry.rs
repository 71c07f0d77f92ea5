//! Canvas placement
//!
//! Positions are shape centers. A shape fits when its whole bounding box lies
//! inside the canvas.

use crate::constants::canvas;

/// Clamp a shape center so the bounding box stays on the canvas.
///
/// Shapes wider or taller than the canvas cannot fit anywhere; they are
/// centered instead of producing inverted clamp bounds.
pub fn adjust(x: f64, y: f64, width: f64, height: f64) -> (f64, f64) {
    if !(width <= canvas::WIDTH && height <= canvas::HEIGHT) {
        return (canvas::CENTER_X, canvas::CENTER_Y);
    }

    (
        clamp_axis(x, width, canvas::WIDTH, canvas::CENTER_X),
        clamp_axis(y, height, canvas::HEIGHT, canvas::CENTER_Y),
    )
}

fn clamp_axis(value: f64, extent: f64, limit: f64, center: f64) -> f64 {
    if !value.is_finite() {
        return center;
    }
    let half = extent.max(0.0) / 2.0;
    value.clamp(half, limit - half)
}
