//! Bokeh Core
//!
//! Plain value types shared across the bokeh crates:
//!
//! - **Color**: linear RGBA color with 8-bit ARGB constructors
//! - **Geometry**: points, sizes, and padding insets reported by the host
//!
//! Nothing in here knows about particles or animation.

pub mod color;
pub mod geometry;

pub use color::Color;
pub use geometry::{Insets, Point, Size};
