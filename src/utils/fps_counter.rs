use std::time::{Duration, Instant};

/// Frame rate counter averaged over one-second windows.
///
/// [`FpsCounter::update`] returns `Some(fps)` once per second, which the
/// application forwards to the window title.
pub struct FpsCounter {
    window_start: Instant,
    frames_in_window: u32,
    pub current_fps: f32,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl FpsCounter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            window_start: Instant::now(),
            frames_in_window: 0,
            current_fps: 0.0,
        }
    }

    /// Counts one frame. Returns the fresh average when a full second has
    /// accumulated, `None` otherwise.
    pub fn update(&mut self) -> Option<f32> {
        self.frames_in_window += 1;
        let elapsed = self.window_start.elapsed();
        if elapsed >= Duration::from_secs(1) {
            self.current_fps = self.frames_in_window as f32 / elapsed.as_secs_f32();
            self.window_start = Instant::now();
            self.frames_in_window = 0;
            Some(self.current_fps)
        } else {
            None
        }
    }
}
