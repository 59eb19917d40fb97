//! Bokeh pool
//!
//! The composition root a host embeds. It validates configuration, owns the
//! scheduler, and forwards host lifecycle and layout calls:
//!
//! - `start()` when the host becomes visible, `stop()` when hidden
//! - `on_layout()` on every layout pass
//! - `frame()` / `draw()` once per rendered frame
//!
//! Time comes either from a shared `AnimationClock` (`attach_clock`) or from
//! the host calling `tick()` directly.

use crate::config::BokehConfig;
use crate::error::Result;
use crate::scheduler::{ParticleScheduler, RunState};
use crate::surface::{BokehSurface, FrameSnapshot};
use bokeh_animation::{ClockHandle, TickCallbackId};
use bokeh_core::{Insets, Size};
use rand::RngCore;

/// A field of drifting bokeh particles
pub struct BokehPool {
    config: BokehConfig,
    scheduler: ParticleScheduler,
    clock: Option<(ClockHandle, TickCallbackId)>,
}

impl BokehPool {
    /// Validate the config and build the particles (not started)
    pub fn new(config: BokehConfig) -> Result<Self> {
        let scheduler = ParticleScheduler::new(config.clone())?;
        Ok(Self::from_scheduler(config, scheduler))
    }

    /// Like `new`, drawing randomness from `rng`
    pub fn with_rng(config: BokehConfig, rng: Box<dyn RngCore + Send>) -> Result<Self> {
        let scheduler = ParticleScheduler::with_rng(config.clone(), rng)?;
        Ok(Self::from_scheduler(config, scheduler))
    }

    fn from_scheduler(config: BokehConfig, scheduler: ParticleScheduler) -> Self {
        scheduler.build();
        Self {
            config,
            scheduler,
            clock: None,
        }
    }

    pub fn config(&self) -> &BokehConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &ParticleScheduler {
        &self.scheduler
    }

    pub fn state(&self) -> RunState {
        self.scheduler.state()
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    // =========================================================================
    // Host lifecycle
    // =========================================================================

    pub fn build(&self) {
        self.scheduler.build();
    }

    pub fn start(&self) {
        self.scheduler.start();
    }

    pub fn stop(&self) {
        self.scheduler.stop();
    }

    pub fn clear(&self) {
        self.scheduler.clear();
    }

    pub fn rebuild(&self) {
        self.scheduler.rebuild();
    }

    /// The host surface went away; cancel everything in flight
    pub fn on_detached(&self) {
        self.scheduler.stop();
    }

    /// Host layout pass
    pub fn on_layout(&self, size: Size, padding: Insets) {
        self.scheduler.set_bounds(size, padding);
    }

    // =========================================================================
    // Time
    // =========================================================================

    /// Subscribe to a shared clock, replacing any previous subscription
    ///
    /// Returns false if the clock has already been dropped.
    pub fn attach_clock(&mut self, handle: &ClockHandle) -> bool {
        self.detach_clock();

        let scheduler = self.scheduler.clone();
        match handle.register_tick_callback(move |dt_ms| scheduler.tick(dt_ms)) {
            Some(id) => {
                self.clock = Some((handle.clone(), id));
                true
            }
            None => {
                tracing::warn!("BokehPool: clock is gone, staying detached");
                false
            }
        }
    }

    pub fn detach_clock(&mut self) {
        if let Some((handle, id)) = self.clock.take() {
            handle.remove_tick_callback(id);
        }
    }

    pub fn is_clock_attached(&self) -> bool {
        self.clock
            .as_ref()
            .is_some_and(|(handle, _)| handle.is_alive())
    }

    /// Advance by `dt_ms` without a clock
    pub fn tick(&self, dt_ms: f64) -> bool {
        self.scheduler.tick(dt_ms)
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    pub fn frame(&self) -> FrameSnapshot {
        FrameSnapshot {
            viewport: self.scheduler.viewport(),
            color: self.config.color,
            particles: self.scheduler.transforms(),
        }
    }

    /// Draw the current frame onto `surface`, returning the circle count
    pub fn draw<S: BokehSurface + ?Sized>(&self, surface: &mut S) -> usize {
        self.frame().draw(surface)
    }
}

impl Drop for BokehPool {
    fn drop(&mut self) {
        self.detach_clock();
    }
}

impl std::fmt::Debug for BokehPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BokehPool")
            .field("config", &self.config)
            .field("scheduler", &self.scheduler)
            .field("clock_attached", &self.is_clock_attached())
            .finish()
    }
}
