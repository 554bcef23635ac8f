//! Time management utilities

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

/// High-precision timer for frame timing
#[derive(Debug)]
pub struct Timer {
    last_frame: Instant,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Update the timer from the wall clock (should be called once per frame)
    pub fn update(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.advance(elapsed);
    }

    /// Advance the timer by a fixed step instead of reading the wall clock
    pub fn advance(&mut self, delta_time: f32) {
        self.delta_time = delta_time;
        self.total_time += delta_time;
        self.frame_count += 1;
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the total elapsed time since timer creation
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the current FPS (based on last frame time)
    pub fn current_fps(&self) -> f32 {
        if self.delta_time > 0.0 {
            1.0 / self.delta_time
        } else {
            0.0
        }
    }
}

/// Shared time base.
///
/// A camera owns one and hands a clone to every child it adopts, so the whole
/// subtree observes the same frame time.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    timer: Arc<RwLock<Timer>>,
}

impl FrameClock {
    /// Create a clock starting at zero
    pub fn new() -> Self {
        Self::default()
    }

    // Timer updates are plain field writes; a poisoned timer is still consistent
    fn read(&self) -> RwLockReadGuard<'_, Timer> {
        self.timer.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Timer> {
        self.timer.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Advance from the wall clock
    pub fn process_frame(&self) {
        self.write().update();
    }

    /// Advance by a fixed step
    pub fn advance(&self, delta_time: f32) {
        self.write().advance(delta_time);
    }

    /// Total elapsed time in seconds
    pub fn current_time(&self) -> f32 {
        self.read().total_time()
    }

    /// Duration of the last processed frame in seconds
    pub fn elapsed_frame_time(&self) -> f32 {
        self.read().delta_time()
    }

    /// Number of processed frames
    pub fn frame_count(&self) -> u64 {
        self.read().frame_count()
    }

    /// Frames per second implied by the last frame
    pub fn current_fps(&self) -> f32 {
        self.read().current_fps()
    }

    /// Whether both handles refer to the same underlying clock
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.timer, &other.timer)
    }
}
