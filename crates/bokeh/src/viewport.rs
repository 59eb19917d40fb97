//! Shared circle geometry
//!
//! Every particle draws the same circle; only its transform differs. The
//! circle is centered in the host's content box and its radius is half the
//! shorter content side.

use bokeh_core::{Insets, Point, Size};

/// Circle geometry derived from the host's last layout pass
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    pub center: Point,
    pub radius: f32,
}

impl Viewport {
    /// Derive the circle from host bounds and padding
    pub fn from_bounds(size: Size, padding: Insets) -> Self {
        let content = size.inset(padding);
        Self {
            center: Point::new(content.width * 0.5, content.height * 0.5),
            radius: content.width.min(content.height) * 0.5,
        }
    }
}
