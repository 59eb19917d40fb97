//! Random motion planning
//!
//! Picks where a particle drifts next. Offsets are relative to the shared
//! circle center and do not depend on the viewport size.

use crate::particle::Motion;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Draws random leg targets and initial scales
pub struct MotionPlanner {
    rng: Box<dyn RngCore + Send>,
    travel: f32,
    max_scale: f32,
}

impl MotionPlanner {
    /// Planner backed by an entropy-seeded generator
    pub fn new(travel: f32, max_scale: f32) -> Self {
        Self::with_rng(Box::new(StdRng::from_entropy()), travel, max_scale)
    }

    /// Planner backed by the given generator
    pub fn with_rng(rng: Box<dyn RngCore + Send>, travel: f32, max_scale: f32) -> Self {
        Self {
            rng,
            travel,
            max_scale,
        }
    }

    /// Target for one leg: offsets in `[-travel, travel]`, opacity in `[0, 1]`
    pub fn plan(&mut self) -> Motion {
        Motion {
            dx: self.offset(),
            dy: self.offset(),
            opacity: self.rng.gen::<f32>(),
        }
    }

    /// Starting point for a freshly built particle; it begins invisible
    pub fn plan_origin(&mut self) -> Motion {
        Motion {
            dx: self.offset(),
            dy: self.offset(),
            opacity: 0.0,
        }
    }

    /// Scale in `[0, max_scale]`, drawn once per particle
    pub fn plan_initial_scale(&mut self) -> f32 {
        self.rng.gen::<f32>() * self.max_scale
    }

    /// Uniform magnitude with an independent random sign
    fn offset(&mut self) -> f32 {
        let magnitude = self.rng.gen::<f32>() * self.travel;
        if self.rng.gen_bool(0.5) {
            magnitude
        } else {
            -magnitude
        }
    }
}

impl std::fmt::Debug for MotionPlanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MotionPlanner")
            .field("travel", &self.travel)
            .field("max_scale", &self.max_scale)
            .finish_non_exhaustive()
    }
}
