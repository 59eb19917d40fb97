//! Bokeh particle field
//!
//! A pool of soft translucent discs that drift, fade, and recycle forever
//! behind a host's content.
//!
//! - **BokehPool**: composition root the host talks to (`start`, `stop`,
//!   `on_layout`, `frame`)
//! - **ParticleScheduler**: staggered launch and recycle state machine
//! - **MotionPlanner**: random targets for each animation leg
//! - **Particle**: one disc and its active leg
//!
//! # Example
//!
//! ```rust
//! use bokeh::{BokehConfig, BokehPool};
//! use bokeh_core::{Insets, Size};
//!
//! let pool = BokehPool::new(BokehConfig::default().with_count(4)).unwrap();
//! pool.on_layout(Size::new(320.0, 240.0), Insets::ZERO);
//! pool.start();
//! pool.tick(16.0);
//!
//! let frame = pool.frame();
//! assert_eq!(frame.particles.len(), 4);
//!
//! pool.stop();
//! ```

pub mod config;
pub mod error;
pub mod particle;
pub mod planner;
pub mod pool;
pub mod scheduler;
pub mod surface;
pub mod viewport;

pub use config::BokehConfig;
pub use error::{BokehError, Result};
pub use particle::{
    Leg, LegId, LegSnapshot, Motion, Particle, ParticleId, ParticleSnapshot, Transform,
};
pub use planner::MotionPlanner;
pub use pool::BokehPool;
pub use scheduler::{stagger_delay_ms, LegCompleted, ParticleScheduler, RunState, SchedulerStats};
pub use surface::{BokehSurface, FrameSnapshot};
pub use viewport::Viewport;
