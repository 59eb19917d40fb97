//! Delayed fixed-duration tweens
//!
//! A tween interpolates from a start value to a target over `duration_ms`,
//! after waiting `delay_ms`. Time only moves when the owner calls `tick`,
//! so every tween driven from the same clock shares one time base.

use crate::easing::Easing;
use crate::values::Interpolate;

/// Where a tween is in its lifetime
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TweenPhase {
    /// Waiting out the start delay; the value is still `from`
    Delayed,
    /// Interpolating
    Running,
    /// Reached the target
    Finished,
}

/// A single delayed interpolation from `from` to `to`
#[derive(Clone, Debug)]
pub struct Tween<T: Interpolate> {
    from: T,
    to: T,
    delay_ms: f64,
    duration_ms: f64,
    easing: Easing,
    /// Time since the tween was created, including the delay
    elapsed_ms: f64,
}

impl<T: Interpolate> Tween<T> {
    /// Create a tween that starts immediately
    pub fn new(from: T, to: T, duration_ms: f64, easing: Easing) -> Self {
        Self {
            from,
            to,
            delay_ms: 0.0,
            duration_ms: duration_ms.max(0.0),
            easing,
            elapsed_ms: 0.0,
        }
    }

    /// Wait `delay_ms` before interpolation begins (builder pattern)
    pub fn with_delay(mut self, delay_ms: f64) -> Self {
        self.delay_ms = delay_ms.max(0.0);
        self
    }

    pub fn phase(&self) -> TweenPhase {
        if self.elapsed_ms < self.delay_ms {
            TweenPhase::Delayed
        } else if self.elapsed_ms >= self.delay_ms + self.duration_ms {
            TweenPhase::Finished
        } else {
            TweenPhase::Running
        }
    }

    pub fn is_finished(&self) -> bool {
        self.phase() == TweenPhase::Finished
    }

    /// Linear progress through the interpolation (0.0 to 1.0)
    ///
    /// Stays at 0.0 during the delay.
    pub fn progress(&self) -> f32 {
        match self.phase() {
            TweenPhase::Delayed => 0.0,
            TweenPhase::Finished => 1.0,
            // Running implies a non-zero duration
            TweenPhase::Running => {
                ((self.elapsed_ms - self.delay_ms) / self.duration_ms).clamp(0.0, 1.0) as f32
            }
        }
    }

    /// Current eased value
    pub fn value(&self) -> T {
        match self.phase() {
            TweenPhase::Delayed => self.from.clone(),
            TweenPhase::Finished => self.to.clone(),
            TweenPhase::Running => self.from.lerp(&self.to, self.easing.apply(self.progress())),
        }
    }

    /// Advance by `dt_ms` and return the new phase
    ///
    /// Time past the end is discarded; a finished tween stays finished.
    pub fn tick(&mut self, dt_ms: f64) -> TweenPhase {
        if dt_ms > 0.0 && !self.is_finished() {
            self.elapsed_ms = (self.elapsed_ms + dt_ms).min(self.delay_ms + self.duration_ms);
        }
        self.phase()
    }
}
