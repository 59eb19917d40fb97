//! Bokeh Animation System
//!
//! Timed tweens with easing, advanced by one shared clock.
//!
//! # Features
//!
//! - **Easing**: Linear, accelerate, decelerate, and accelerate-decelerate curves
//! - **Tweens**: Delayed, fixed-duration interpolation of any `Interpolate` value
//! - **Clock**: Single frame clock with tick subscribers, driven manually or
//!   from a background thread

pub mod clock;
pub mod easing;
pub mod tween;
pub mod values;

pub use clock::{AnimationClock, ClockHandle, TickCallback, TickCallbackId, WakeCallback};
pub use easing::Easing;
pub use tween::{Tween, TweenPhase};
pub use values::Interpolate;
