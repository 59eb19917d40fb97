//! Particles and their animation legs
//!
//! A particle is one disc. It carries its current transform and at most one
//! active leg. A leg tweens translation and opacity toward a target on the
//! shared clock; scale is fixed when the particle is created.

use bokeh_animation::{Easing, Interpolate, Tween, TweenPhase};
use slotmap::new_key_type;

new_key_type! {
    /// Stable identity of a particle within its pool
    pub struct ParticleId;
}

/// Identity of one issued leg
///
/// Every leg the scheduler issues gets a fresh id, so a completion event
/// can be matched against the leg that is active right now.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LegId(pub u64);

/// The channels a leg animates
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Motion {
    pub dx: f32,
    pub dy: f32,
    pub opacity: f32,
}

impl Interpolate for Motion {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Motion {
            dx: self.dx.lerp(&other.dx, t),
            dy: self.dy.lerp(&other.dy, t),
            opacity: self.opacity.lerp(&other.opacity, t),
        }
    }
}

/// Current visual state of a particle
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Transform {
    pub translate_x: f32,
    pub translate_y: f32,
    pub opacity: f32,
    pub scale: f32,
}

impl Transform {
    pub fn motion(&self) -> Motion {
        Motion {
            dx: self.translate_x,
            dy: self.translate_y,
            opacity: self.opacity,
        }
    }

    fn set_motion(&mut self, motion: Motion) {
        self.translate_x = motion.dx;
        self.translate_y = motion.dy;
        self.opacity = motion.opacity;
    }
}

/// One animation request: where to go, when to start, how long to take
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Leg {
    pub target: Motion,
    pub start_delay_ms: u64,
    pub duration_ms: u64,
    pub easing: Easing,
}

#[derive(Clone, Debug)]
struct ActiveLeg {
    id: LegId,
    leg: Leg,
    tween: Tween<Motion>,
}

/// Read-only view of a leg
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LegSnapshot {
    pub id: LegId,
    pub leg: Leg,
    pub phase: TweenPhase,
    pub progress: f32,
}

/// Read-only view of a particle
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleSnapshot {
    pub id: ParticleId,
    pub index: usize,
    pub transform: Transform,
    pub leg: Option<LegSnapshot>,
}

/// One disc in the pool
#[derive(Clone, Debug)]
pub struct Particle {
    index: usize,
    transform: Transform,
    active: Option<ActiveLeg>,
}

impl Particle {
    /// A particle at `origin` with a fixed scale and no leg
    pub fn new(index: usize, origin: Motion, scale: f32) -> Self {
        let mut transform = Transform {
            scale,
            ..Transform::default()
        };
        transform.set_motion(origin);
        Self {
            index,
            transform,
            active: None,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn scale(&self) -> f32 {
        self.transform.scale
    }

    pub fn leg_id(&self) -> Option<LegId> {
        self.active.as_ref().map(|active| active.id)
    }

    /// Whether the active leg is still waiting or interpolating
    pub fn is_animating(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| !active.tween.is_finished())
    }

    /// True when `id` is the active leg and it has reached its target
    pub fn has_finished(&self, id: LegId) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| active.id == id && active.tween.is_finished())
    }

    /// Replace the active leg
    ///
    /// Interpolation starts from the current transform once the leg's
    /// start delay has elapsed.
    pub fn apply_leg(&mut self, id: LegId, leg: Leg) {
        let tween = Tween::new(
            self.transform.motion(),
            leg.target,
            leg.duration_ms as f64,
            leg.easing,
        )
        .with_delay(leg.start_delay_ms as f64);
        self.active = Some(ActiveLeg { id, leg, tween });
    }

    /// Drop the active leg, freezing the transform where it is
    ///
    /// Safe to call with no active leg. Returns the discarded leg's id.
    pub fn cancel(&mut self) -> Option<LegId> {
        self.active.take().map(|active| active.id)
    }

    /// Move the active leg forward by `dt_ms`
    ///
    /// Returns the leg id on the tick the leg reaches its target, and only
    /// on that tick.
    pub fn advance(&mut self, dt_ms: f64) -> Option<LegId> {
        let active = self.active.as_mut()?;
        if active.tween.is_finished() {
            return None;
        }

        match active.tween.tick(dt_ms) {
            TweenPhase::Delayed => None,
            TweenPhase::Running => {
                self.transform.set_motion(active.tween.value());
                None
            }
            TweenPhase::Finished => {
                self.transform.set_motion(active.tween.value());
                Some(active.id)
            }
        }
    }

    pub fn snapshot(&self, id: ParticleId) -> ParticleSnapshot {
        ParticleSnapshot {
            id,
            index: self.index,
            transform: self.transform,
            leg: self.active.as_ref().map(|active| LegSnapshot {
                id: active.id,
                leg: active.leg,
                phase: active.tween.phase(),
                progress: active.tween.progress(),
            }),
        }
    }
}
