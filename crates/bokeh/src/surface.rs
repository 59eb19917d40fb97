//! Rendering seam
//!
//! The pool does not draw. Each frame the host takes a `FrameSnapshot` and
//! hands it a surface; the snapshot turns every particle into one filled
//! circle.

use crate::particle::Transform;
use crate::viewport::Viewport;
use bokeh_core::{Color, Point};

/// Anything that can fill a circle
pub trait BokehSurface {
    fn fill_circle(&mut self, center: Point, radius: f32, color: Color);
}

/// Everything needed to draw one frame
#[derive(Clone, Debug, PartialEq)]
pub struct FrameSnapshot {
    pub viewport: Viewport,
    pub color: Color,
    /// Particle transforms in index order
    pub particles: Vec<Transform>,
}

impl FrameSnapshot {
    /// Draw every particle, skipping fully transparent or zero-sized ones
    ///
    /// Returns the number of circles drawn.
    pub fn draw<S: BokehSurface + ?Sized>(&self, surface: &mut S) -> usize {
        let mut drawn = 0;
        for transform in &self.particles {
            let radius = self.viewport.radius * transform.scale;
            let color = self.color.fade(transform.opacity);
            if radius <= 0.0 || color.a <= 0.0 {
                continue;
            }
            let center = self
                .viewport
                .center
                .offset(transform.translate_x, transform.translate_y);
            surface.fill_circle(center, radius, color);
            drawn += 1;
        }
        drawn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        circles: Vec<(Point, f32, Color)>,
    }

    impl BokehSurface for Recorder {
        fn fill_circle(&mut self, center: Point, radius: f32, color: Color) {
            self.circles.push((center, radius, color));
        }
    }

    #[test]
    fn test_draw_applies_transform() {
        let frame = FrameSnapshot {
            viewport: Viewport {
                center: Point::new(100.0, 50.0),
                radius: 40.0,
            },
            color: Color::WHITE.with_alpha(0.8),
            particles: vec![
                Transform {
                    translate_x: -10.0,
                    translate_y: 5.0,
                    opacity: 0.5,
                    scale: 0.25,
                },
                Transform {
                    translate_x: 0.0,
                    translate_y: 0.0,
                    opacity: 0.0,
                    scale: 0.5,
                },
            ],
        };

        let mut recorder = Recorder::default();
        assert_eq!(frame.draw(&mut recorder), 1);

        let (center, radius, color) = recorder.circles[0];
        assert_eq!(center, Point::new(90.0, 55.0));
        assert_eq!(radius, 10.0);
        assert!((color.a - 0.4).abs() < 1e-6);
    }
}
