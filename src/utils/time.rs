use std::time::{Duration, Instant};

/// Wall-clock frame timer.
///
/// The animation mixer is advanced by [`Timer::dt_seconds`] each frame, so
/// playback speed is tied to real time rather than frame count.
pub struct Timer {
    start: Instant,
    last_tick: Instant,
    /// Time since the previous tick
    pub delta: Duration,
    /// Total elapsed time since creation
    pub elapsed: Duration,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Creates a new timer starting from now.
    #[must_use]
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_tick: now,
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
        }
    }

    /// Advances the timer, called once at the top of every frame.
    pub fn tick(&mut self) {
        let now = Instant::now();
        self.delta = now - self.last_tick;
        self.elapsed = now - self.start;
        self.last_tick = now;
    }

    #[must_use]
    pub fn dt_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }
}
