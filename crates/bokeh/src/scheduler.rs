//! Particle scheduler
//!
//! Owns the particle pool and runs the stagger + recycle state machine:
//!
//! ```text
//! Idle --build--> Built --start--> Running --stop--> Stopped --start--> Running
//!                   ^                 |                 |
//!                   +-----rebuild-----+-----------------+   (restarts if it was Running)
//! ```
//!
//! `start()` launches one leg per particle with delays spread evenly across
//! one leg duration. Whenever a leg reaches its target the particle is
//! recycled: a new random leg with no delay, appended to the back of the
//! recycle queue. Every mutating entry point takes the same lock, and
//! completion events are dispatched after the lock used to produce them is
//! released. An event that arrives after `stop()` finds no matching leg
//! and is dropped.

use crate::config::BokehConfig;
use crate::error::Result;
use crate::particle::{Leg, LegId, Particle, ParticleId, ParticleSnapshot, Transform};
use crate::planner::MotionPlanner;
use crate::viewport::Viewport;
use bokeh_core::{Insets, Size};
use rand::RngCore;
use slotmap::SlotMap;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Pool-level run state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    /// No particles
    Idle,
    /// Particles exist, no legs issued yet
    Built,
    /// Legs are running and completed legs are recycled
    Running,
    /// Legs cancelled, particles kept at their frozen transforms
    Stopped,
}

/// A particle's leg reached its target
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LegCompleted {
    pub particle: ParticleId,
    pub leg: LegId,
}

/// Counters for what the scheduler has done since it was created
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Legs issued, initial wave and recycles together
    pub legs_issued: u64,
    /// Completions that produced a new leg
    pub recycled: u64,
    /// Completions dropped because the pool stopped or was rebuilt
    pub suppressed: u64,
    /// Times the pool was built
    pub builds: u64,
}

/// Start delay of particle `index` in the launch wave
///
/// `index * duration / count`, in whole milliseconds. Particle 0 starts
/// immediately and the last particle starts just under one duration later.
pub fn stagger_delay_ms(index: usize, count: u32, duration_ms: u64) -> u64 {
    if count == 0 {
        return 0;
    }
    (index as u64).saturating_mul(duration_ms) / count as u64
}

struct SchedulerInner {
    config: BokehConfig,
    viewport: Viewport,
    planner: MotionPlanner,
    particles: SlotMap<ParticleId, Particle>,
    /// Particle ids in index order
    order: Vec<ParticleId>,
    /// Running particles, least recently (re)started first
    recycle_queue: VecDeque<ParticleId>,
    state: RunState,
    next_leg: u64,
    stats: SchedulerStats,
}

impl SchedulerInner {
    fn issue_leg(&mut self, id: ParticleId, start_delay_ms: u64) -> Option<LegId> {
        let leg = Leg {
            target: self.planner.plan(),
            start_delay_ms,
            duration_ms: self.config.leg_duration_ms,
            easing: self.config.easing,
        };
        let particle = self.particles.get_mut(id)?;
        let leg_id = LegId(self.next_leg);
        self.next_leg += 1;
        particle.apply_leg(leg_id, leg);
        self.stats.legs_issued += 1;
        Some(leg_id)
    }

    fn cancel_all(&mut self) {
        for (_, particle) in self.particles.iter_mut() {
            particle.cancel();
        }
        self.recycle_queue.clear();
    }

    fn build(&mut self) {
        self.cancel_all();
        self.particles.clear();
        self.order.clear();

        let count = self.config.count as usize;
        self.order.reserve(count);
        for index in 0..count {
            let scale = self.planner.plan_initial_scale();
            let origin = self.planner.plan_origin();
            let id = self.particles.insert(Particle::new(index, origin, scale));
            self.order.push(id);
        }

        self.state = RunState::Built;
        self.stats.builds += 1;
        tracing::debug!("ParticleScheduler: built {} particles", count);
    }

    fn start(&mut self) {
        if self.state == RunState::Running {
            return;
        }
        if self.particles.is_empty() {
            self.build();
        }

        let count = self.config.count;
        let duration = self.config.leg_duration_ms;
        self.recycle_queue.clear();
        let order = self.order.clone();
        for (index, id) in order.into_iter().enumerate() {
            self.issue_leg(id, stagger_delay_ms(index, count, duration));
            self.recycle_queue.push_back(id);
        }

        self.state = RunState::Running;
        tracing::debug!(
            "ParticleScheduler: started {} legs over {}ms",
            self.order.len(),
            duration
        );
    }

    fn stop(&mut self) {
        if self.state != RunState::Running || self.particles.is_empty() {
            return;
        }
        self.cancel_all();
        self.state = RunState::Stopped;
        tracing::debug!("ParticleScheduler: stopped");
    }

    fn clear(&mut self) {
        self.cancel_all();
        self.particles.clear();
        self.order.clear();
        self.state = RunState::Idle;
        tracing::debug!("ParticleScheduler: cleared");
    }

    fn recycle(&mut self, event: LegCompleted) -> bool {
        if self.state != RunState::Running {
            self.stats.suppressed += 1;
            tracing::trace!(
                "ParticleScheduler: dropped completion of {:?}, not running",
                event.leg
            );
            return false;
        }

        let finished = self
            .particles
            .get(event.particle)
            .is_some_and(|p| p.has_finished(event.leg));
        if !finished {
            self.stats.suppressed += 1;
            tracing::trace!(
                "ParticleScheduler: dropped stale completion of {:?}",
                event.leg
            );
            return false;
        }

        if let Some(pos) = self.recycle_queue.iter().position(|id| *id == event.particle) {
            self.recycle_queue.remove(pos);
        }
        self.recycle_queue.push_back(event.particle);

        match self.issue_leg(event.particle, 0) {
            Some(leg) => {
                self.stats.recycled += 1;
                tracing::trace!("ParticleScheduler: recycled {:?} -> {:?}", event.leg, leg);
                true
            }
            None => false,
        }
    }

    fn advance(&mut self, dt_ms: f64) -> Vec<LegCompleted> {
        if self.state != RunState::Running {
            return Vec::new();
        }

        let mut completed = Vec::new();
        for id in &self.order {
            if let Some(particle) = self.particles.get_mut(*id) {
                if let Some(leg) = particle.advance(dt_ms) {
                    completed.push(LegCompleted { particle: *id, leg });
                }
            }
        }
        completed
    }
}

/// The stagger + recycle scheduler
///
/// Cloning shares the same pool; every clone serializes through one lock.
#[derive(Clone)]
pub struct ParticleScheduler {
    inner: Arc<Mutex<SchedulerInner>>,
}

impl ParticleScheduler {
    /// Scheduler with an entropy-seeded random source
    ///
    /// Fails if `config` does not validate.
    pub fn new(config: BokehConfig) -> Result<Self> {
        config.validate()?;
        let planner = MotionPlanner::new(config.travel, config.max_scale);
        Ok(Self::with_planner(config, planner))
    }

    /// Scheduler drawing from the given random source
    pub fn with_rng(config: BokehConfig, rng: Box<dyn RngCore + Send>) -> Result<Self> {
        config.validate()?;
        let planner = MotionPlanner::with_rng(rng, config.travel, config.max_scale);
        Ok(Self::with_planner(config, planner))
    }

    fn with_planner(config: BokehConfig, planner: MotionPlanner) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SchedulerInner {
                config,
                viewport: Viewport::default(),
                planner,
                particles: SlotMap::with_key(),
                order: Vec::new(),
                recycle_queue: VecDeque::new(),
                state: RunState::Idle,
                next_leg: 0,
                stats: SchedulerStats::default(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SchedulerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Destroy any particles and create a fresh, idle pool of `count`
    pub fn build(&self) {
        self.lock().build();
    }

    /// Launch the staggered wave; no-op while running
    pub fn start(&self) {
        self.lock().start();
    }

    /// Cancel every leg, keeping particles where they are; no-op unless running
    pub fn stop(&self) {
        self.lock().stop();
    }

    /// Cancel every leg and destroy every particle
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Clear and build, restarting if the pool was running
    pub fn rebuild(&self) {
        let mut inner = self.lock();
        let was_running = inner.state == RunState::Running;
        inner.clear();
        inner.build();
        if was_running {
            inner.start();
        }
        tracing::debug!("ParticleScheduler: rebuilt (running: {})", was_running);
    }

    // =========================================================================
    // Clock
    // =========================================================================

    /// Handle one leg completion
    ///
    /// Returns true if the particle was given a new leg. Events for a
    /// stopped pool, a destroyed particle, or a leg that is no longer
    /// active are dropped.
    pub fn on_leg_completed(&self, event: LegCompleted) -> bool {
        self.lock().recycle(event)
    }

    /// Move every active leg forward without dispatching completions
    pub fn advance(&self, dt_ms: f64) -> Vec<LegCompleted> {
        self.lock().advance(dt_ms)
    }

    /// Move every active leg forward and recycle the ones that finished
    ///
    /// Each completion is dispatched in its own critical section. Returns
    /// true while the pool is running.
    pub fn tick(&self, dt_ms: f64) -> bool {
        for event in self.advance(dt_ms) {
            self.on_leg_completed(event);
        }
        self.is_running()
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Recompute the shared circle; running legs are left alone
    pub fn set_bounds(&self, size: Size, padding: Insets) {
        self.lock().viewport = Viewport::from_bounds(size, padding);
    }

    pub fn viewport(&self) -> Viewport {
        self.lock().viewport
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    pub fn state(&self) -> RunState {
        self.lock().state
    }

    pub fn is_running(&self) -> bool {
        self.state() == RunState::Running
    }

    pub fn config(&self) -> BokehConfig {
        self.lock().config.clone()
    }

    pub fn particle_count(&self) -> usize {
        self.lock().particles.len()
    }

    /// Every particle in index order
    pub fn particles(&self) -> Vec<ParticleSnapshot> {
        let inner = self.lock();
        inner
            .order
            .iter()
            .filter_map(|id| inner.particles.get(*id).map(|p| p.snapshot(*id)))
            .collect()
    }

    /// Current transforms in index order
    pub fn transforms(&self) -> Vec<Transform> {
        let inner = self.lock();
        inner
            .order
            .iter()
            .filter_map(|id| inner.particles.get(*id).map(Particle::transform))
            .collect()
    }

    /// Recycle queue contents, front first
    pub fn recycle_queue(&self) -> Vec<ParticleId> {
        self.lock().recycle_queue.iter().copied().collect()
    }

    pub fn stats(&self) -> SchedulerStats {
        self.lock().stats
    }
}

impl std::fmt::Debug for ParticleScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("ParticleScheduler")
            .field("state", &inner.state)
            .field("particles", &inner.particles.len())
            .field("stats", &inner.stats)
            .finish()
    }
}
