use crate::animation::values::Interpolatable;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InterpolationMode {
    Linear,
    Step,
    CubicSpline,
}

/// During normal playback the playhead only moves a frame or two per update,
/// so a short linear scan from the cursor beats a binary search.
const MAX_SCAN_OFFSET: usize = 3;

/// Per-track sampling cursor, owned by the action so the same clip can be
/// played by several actions independently.
#[derive(Debug, Clone, Default)]
pub struct KeyframeCursor {
    pub last_index: usize,
}

/// A single keyframe channel: sorted times and one value per key.
/// For `CubicSpline`, `values` holds `(in_tangent, value, out_tangent)`
/// triplets, so its length is `times.len() * 3`.
#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Interpolatable> {
    pub times: Vec<f32>,
    pub values: Vec<T>,
    pub interpolation: InterpolationMode,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    #[must_use]
    pub fn new(times: Vec<f32>, values: Vec<T>, interpolation: InterpolationMode) -> Self {
        Self {
            times,
            values,
            interpolation,
        }
    }

    /// Samples without a cursor: binary search every call. Used by tests and
    /// one-off lookups.
    #[must_use]
    pub fn sample(&self, time: f32) -> T {
        assert!(!self.times.is_empty(), "track has no keyframes");
        let next_idx = self.times.partition_point(|&t| t <= time);
        let idx = next_idx.saturating_sub(1);
        self.sample_at_frame(idx, time)
    }

    /// Cursor-assisted sampling: O(1) for normal playback, falling back to a
    /// binary search when the playhead jumps (loop wrap, clip switch).
    pub fn sample_with_cursor(&self, time: f32, cursor: &mut KeyframeCursor) -> T {
        assert!(!self.times.is_empty(), "track has no keyframes");

        let len = self.times.len();
        if len == 1 {
            return *self.value_at(0);
        }

        let i = cursor.last_index.min(len - 1);
        let t_curr = self.times[i];

        let found = if time >= t_curr {
            // Forward scan from the cursor.
            let mut res = None;
            for offset in 0..=MAX_SCAN_OFFSET {
                let idx = i + offset;
                if idx >= len - 1 {
                    if time >= self.times[len - 1] {
                        res = Some(len - 1);
                    }
                    break;
                }
                if time < self.times[idx + 1] {
                    res = Some(idx);
                    break;
                }
            }
            res
        } else {
            // Backward scan, hit on loop wrap and reverse playback.
            let mut res = None;
            for offset in 0..=MAX_SCAN_OFFSET {
                if i < offset {
                    break;
                }
                let idx = i - offset;
                if time >= self.times[idx] {
                    res = Some(idx);
                    break;
                }
            }
            res
        };

        let index = match found {
            Some(idx) => idx,
            None => {
                // Large jump: binary search.
                let next_idx = self.times.partition_point(|&t| t <= time);
                next_idx.saturating_sub(1)
            }
        };
        cursor.last_index = index;

        self.sample_at_frame(index, time)
    }

    /// Value accessor that hides the `CubicSpline` triplet layout.
    fn value_at(&self, index: usize) -> &T {
        match self.interpolation {
            InterpolationMode::CubicSpline => &self.values[index * 3 + 1],
            _ => &self.values[index],
        }
    }

    fn sample_at_frame(&self, index: usize, time: f32) -> T {
        let len = self.times.len();
        if index >= len - 1 {
            return *self.value_at(len - 1);
        }

        let next_idx = index + 1;
        let t0 = self.times[index];
        let t1 = self.times[next_idx];
        let dt = t1 - t0;
        let t = if dt > 1e-6 {
            ((time - t0) / dt).clamp(0.0, 1.0)
        } else {
            0.0
        };

        match self.interpolation {
            InterpolationMode::Step => *self.value_at(index),
            InterpolationMode::Linear => {
                T::interpolate_linear(*self.value_at(index), *self.value_at(next_idx), t)
            }
            InterpolationMode::CubicSpline => {
                let i_prev = index * 3;
                let i_next = next_idx * 3;
                T::interpolate_cubic(
                    self.values[i_prev + 1],
                    self.values[i_prev + 2],
                    self.values[i_next],
                    self.values[i_next + 1],
                    t,
                    dt,
                )
            }
        }
    }
}
