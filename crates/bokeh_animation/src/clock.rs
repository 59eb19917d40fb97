//! Shared animation clock
//!
//! One clock drives every animation in a host. Subscribers register a tick
//! callback through a `ClockHandle` and receive the frame delta in
//! milliseconds. The clock can be ticked by the host's own frame loop
//! (`tick` / `advance`) or run on a background thread via
//! `start_background()`.
//!
//! Callbacks are invoked after the clock's lock is released, so a callback
//! may freely register or remove subscribers.

use slotmap::{new_key_type, SlotMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

new_key_type! {
    /// Handle to a registered tick callback
    pub struct TickCallbackId;
}

/// Callback invoked once per clock tick with the frame delta in milliseconds
///
/// Returns `true` while the subscriber still has animations in flight.
pub type TickCallback = Arc<dyn Fn(f64) -> bool + Send + Sync>;

/// Callback type for waking up the main thread from the clock thread
///
/// This is called when a tick reports active animations. The callback should
/// wake up the host's event loop so it redraws.
pub type WakeCallback = Arc<dyn Fn() + Send + Sync>;

/// Default background frame rate
pub const DEFAULT_FPS: u32 = 60;

/// Internal state of the clock
struct ClockInner {
    callbacks: SlotMap<TickCallbackId, TickCallback>,
    last_frame: Instant,
    /// Total time advanced so far
    elapsed_ms: f64,
}

fn lock(inner: &Mutex<ClockInner>) -> MutexGuard<'_, ClockInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Advance the clock by `dt_ms` and run every subscriber
///
/// Returns true if any subscriber reported active animations.
fn run_tick(inner: &Mutex<ClockInner>, dt_ms: f64) -> bool {
    let callbacks: Vec<TickCallback> = {
        let mut guard = lock(inner);
        guard.elapsed_ms += dt_ms;
        guard.callbacks.values().cloned().collect()
    };

    let mut any_active = false;
    for callback in callbacks {
        any_active |= callback(dt_ms);
    }
    any_active
}

/// The frame clock that all animations advance against
///
/// This is typically held by the host and shared via `ClockHandle`.
///
/// # Background Thread Mode
///
/// ```ignore
/// let mut clock = AnimationClock::new();
/// clock.set_wake_callback(move || proxy.wake());
/// clock.start_background(); // Ticks at 60fps until stopped or dropped
/// ```
pub struct AnimationClock {
    inner: Arc<Mutex<ClockInner>>,
    /// Stop signal for background thread
    stop_flag: Arc<AtomicBool>,
    /// Set by background ticks that reported active animations
    needs_redraw: Arc<AtomicBool>,
    /// Background thread handle (if running)
    thread_handle: Option<JoinHandle<()>>,
    /// Optional callback to wake up the main thread
    wake_callback: Option<WakeCallback>,
    target_fps: u32,
}

impl AnimationClock {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(ClockInner {
                callbacks: SlotMap::with_key(),
                last_frame: Instant::now(),
                elapsed_ms: 0.0,
            })),
            stop_flag: Arc::new(AtomicBool::new(false)),
            needs_redraw: Arc::new(AtomicBool::new(false)),
            thread_handle: None,
            wake_callback: None,
            target_fps: DEFAULT_FPS,
        }
    }

    /// Set a wake callback that will be called when animations need a redraw
    pub fn set_wake_callback<F>(&mut self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.wake_callback = Some(Arc::new(callback));
    }

    /// Set the background frame rate (takes effect on the next `start_background`)
    pub fn set_target_fps(&mut self, fps: u32) {
        self.target_fps = fps.max(1);
    }

    pub fn target_fps(&self) -> u32 {
        self.target_fps
    }

    /// Start ticking on a background thread at the target frame rate
    pub fn start_background(&mut self) {
        if self.thread_handle.is_some() {
            return; // Already running
        }

        let inner = Arc::clone(&self.inner);
        let stop_flag = Arc::clone(&self.stop_flag);
        let needs_redraw = Arc::clone(&self.needs_redraw);
        let wake_callback = self.wake_callback.clone();
        let fps = self.target_fps;

        lock(&self.inner).last_frame = Instant::now();
        tracing::debug!("AnimationClock: starting background thread at {}fps", fps);

        self.thread_handle = Some(thread::spawn(move || {
            let frame_duration = Duration::from_micros(1_000_000 / fps as u64);
            static FRAMES: AtomicU64 = AtomicU64::new(0);

            while !stop_flag.load(Ordering::Relaxed) {
                let start = Instant::now();

                let dt_ms = {
                    let mut guard = lock(&inner);
                    let dt = start.duration_since(guard.last_frame).as_secs_f64() * 1000.0;
                    guard.last_frame = start;
                    dt
                };

                if run_tick(&inner, dt_ms) {
                    needs_redraw.store(true, Ordering::Release);
                    if let Some(ref callback) = wake_callback {
                        let count = FRAMES.fetch_add(1, Ordering::Relaxed);
                        if count % (fps as u64 * 10) == 0 {
                            tracing::trace!("AnimationClock: waking host (frame {})", count);
                        }
                        callback();
                    }
                }

                // Sleep for remaining frame time
                let elapsed = start.elapsed();
                if elapsed < frame_duration {
                    thread::sleep(frame_duration - elapsed);
                }
            }
        }));
    }

    /// Stop the background thread
    pub fn stop_background(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        if let Some(handle) = self.thread_handle.take() {
            if handle.join().is_err() {
                tracing::warn!("AnimationClock: background thread panicked");
            }
            tracing::debug!("AnimationClock: background thread stopped");
        }
        self.stop_flag.store(false, Ordering::Relaxed);
    }

    /// Check if the background thread is running
    pub fn is_background_running(&self) -> bool {
        self.thread_handle.is_some()
    }

    /// Check and clear the needs_redraw flag
    pub fn take_needs_redraw(&self) -> bool {
        self.needs_redraw.swap(false, Ordering::Acquire)
    }

    /// Get a handle to this clock for passing to subscribers
    pub fn handle(&self) -> ClockHandle {
        ClockHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Tick using wall-clock time since the previous tick
    ///
    /// Returns true if any subscriber is still animating.
    pub fn tick(&self) -> bool {
        let dt_ms = {
            let mut guard = lock(&self.inner);
            let now = Instant::now();
            let dt = now.duration_since(guard.last_frame).as_secs_f64() * 1000.0;
            guard.last_frame = now;
            dt
        };
        run_tick(&self.inner, dt_ms)
    }

    /// Tick with an explicit delta, for hosts with their own frame timing
    pub fn advance(&self, dt_ms: f64) -> bool {
        lock(&self.inner).last_frame = Instant::now();
        run_tick(&self.inner, dt_ms.max(0.0))
    }

    /// Total time this clock has advanced
    pub fn elapsed_ms(&self) -> f64 {
        lock(&self.inner).elapsed_ms
    }

    /// Number of registered tick callbacks
    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner).callbacks.len()
    }
}

impl Default for AnimationClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for AnimationClock {
    fn drop(&mut self) {
        self.stop_background();
    }
}

/// A weak handle to the animation clock
///
/// Subscribers hold this; it won't keep the clock alive.
#[derive(Clone)]
pub struct ClockHandle {
    inner: Weak<Mutex<ClockInner>>,
}

impl ClockHandle {
    /// Register a tick callback and return its ID
    ///
    /// Returns `None` if the clock has been dropped.
    pub fn register_tick_callback<F>(&self, callback: F) -> Option<TickCallbackId>
    where
        F: Fn(f64) -> bool + Send + Sync + 'static,
    {
        self.inner
            .upgrade()
            .map(|inner| lock(&inner).callbacks.insert(Arc::new(callback)))
    }

    /// Remove a tick callback
    pub fn remove_tick_callback(&self, id: TickCallbackId) {
        if let Some(inner) = self.inner.upgrade() {
            lock(&inner).callbacks.remove(id);
        }
    }

    /// Check if the clock is still alive
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}
