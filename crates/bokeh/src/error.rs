//! Bokeh error types

use thiserror::Error;

/// Configuration errors, reported once when a pool is created
///
/// Runtime operations (`start`, `stop`, `rebuild`, recycling) never fail.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BokehError {
    /// The pool must hold at least one particle
    #[error("Particle count must be at least 1, got {0}")]
    InvalidCount(u32),

    /// Legs must take some time
    #[error("Leg duration must be positive, got {0}ms")]
    InvalidDuration(u64),

    /// Travel distance must be finite and non-negative
    #[error("Travel distance must be finite and non-negative, got {0}")]
    InvalidTravel(f32),

    /// Maximum scale must be finite and non-negative
    #[error("Maximum scale must be finite and non-negative, got {0}")]
    InvalidScale(f32),
}

/// Result type for bokeh operations
pub type Result<T> = std::result::Result<T, BokehError>;
