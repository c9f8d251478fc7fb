//! Frame timing: the fixed-step accumulator and the rolling FPS window.

use log::debug;

/// Default fixed simulation step, in seconds.
pub const DEFAULT_FIXED_STEP: f64 = 1.0 / 60.0;

/// Default cap on fixed steps owed after a single frame.
pub const DEFAULT_MAX_FIXED_STEPS: u32 = 5;

/// Returns true if a delta can be fed into the loop: finite and strictly positive.
#[inline]
pub fn is_valid_delta(delta: f64) -> bool {
    delta.is_finite() && delta > 0.0
}

/// Timing state for the game loop. All values are in seconds.
///
/// Each frame's delta is added to an accumulator, and the loop drains the accumulator one fixed
/// step at a time. The accumulator is clamped to `max_fixed_steps` steps so a long stall (a
/// debugger break, a hitch loading an asset) costs a bounded amount of catch-up rather than an
/// ever growing backlog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Time {
    fixed_step: f64,
    max_accumulator: f64,
    /// Time owed to the fixed-step update.
    accumulator: f64,
    /// The delta of the most recent frame.
    delta: f64,
    /// Total time delivered to the variable update.
    time: f64,
    /// Total time delivered to the fixed update; always a whole number of fixed steps.
    fixed_time: f64,
    frame: u64,
}

impl Time {
    /// Construct timing state for a fixed step and catch-up cap. A non-positive step falls back to
    /// the default, and the cap is at least one step.
    pub fn new(fixed_step: f64, max_fixed_steps: u32) -> Self {
        let fixed_step = if is_valid_delta(fixed_step) {
            fixed_step
        } else {
            DEFAULT_FIXED_STEP
        };
        Self {
            fixed_step,
            max_accumulator: fixed_step * f64::from(max_fixed_steps.max(1)),
            accumulator: 0.0,
            delta: 0.0,
            time: 0.0,
            fixed_time: 0.0,
            frame: 0,
        }
    }

    /// Record a frame's delta and add it to the accumulator. Invalid deltas are ignored and leave
    /// every field untouched. Returns false if the delta was ignored.
    pub fn accumulate(&mut self, delta: f64) -> bool {
        if !is_valid_delta(delta) {
            return false;
        }
        self.delta = delta;
        self.time += delta;
        self.frame += 1;
        self.accumulator += delta;
        if self.accumulator > self.max_accumulator {
            debug!(
                "Clamping fixed step backlog from {:.4}s to {:.4}s",
                self.accumulator, self.max_accumulator
            );
            self.accumulator = self.max_accumulator;
        }
        true
    }

    /// Returns true if at least one fixed step is owed.
    #[inline]
    pub fn has_fixed(&self) -> bool {
        self.accumulator >= self.fixed_step
    }

    /// Pay one fixed step out of the accumulator.
    #[inline]
    pub fn increment_fixed(&mut self) {
        self.accumulator -= self.fixed_step;
        self.fixed_time += self.fixed_step;
    }

    /// Zero everything but the configuration.
    pub fn reset(&mut self) {
        *self = Self {
            fixed_step: self.fixed_step,
            max_accumulator: self.max_accumulator,
            ..Self::new(self.fixed_step, 1)
        };
    }

    #[inline]
    pub fn fixed_step(&self) -> f64 {
        self.fixed_step
    }

    /// Upper bound of the accumulator.
    #[inline]
    pub fn max_accumulator(&self) -> f64 {
        self.max_accumulator
    }

    #[inline]
    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    #[inline]
    pub fn delta(&self) -> f64 {
        self.delta
    }

    #[inline]
    pub fn time(&self) -> f64 {
        self.time
    }

    #[inline]
    pub fn fixed_time(&self) -> f64 {
        self.fixed_time
    }

    /// Number of frames accumulated since the last reset.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new(DEFAULT_FIXED_STEP, DEFAULT_MAX_FIXED_STEPS)
    }
}

/// Measures frames per second over a fixed window.
///
/// Frame deltas are summed until the window is full, then the rate is published as
/// `frames / elapsed` and the window starts over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FpsCounter {
    window: f64,
    elapsed: f64,
    frames: u32,
    fps: f64,
}

impl FpsCounter {
    pub fn new(window: f64) -> Self {
        Self {
            window: if is_valid_delta(window) { window } else { 1.0 },
            elapsed: 0.0,
            frames: 0,
            fps: 0.0,
        }
    }

    /// Count a frame. Returns the new rate when the window closes.
    pub fn record(&mut self, delta: f64) -> Option<f64> {
        if !is_valid_delta(delta) {
            return None;
        }
        self.elapsed += delta;
        self.frames += 1;
        if self.elapsed < self.window {
            return None;
        }
        self.fps = f64::from(self.frames) / self.elapsed;
        self.elapsed = 0.0;
        self.frames = 0;
        Some(self.fps)
    }

    /// The most recently published rate, or zero before the first window closes.
    #[inline]
    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.window);
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn drain(time: &mut Time) -> u32 {
        let mut steps = 0;
        while time.has_fixed() {
            time.increment_fixed();
            steps += 1;
        }
        steps
    }

    #[test]
    fn sixty_frames_at_sixty_hz() {
        // Given
        let mut time = Time::new(1.0 / 60.0, 5);

        // When
        let steps: u32 = (0..60)
            .map(|_| {
                time.accumulate(1.0 / 60.0);
                drain(&mut time)
            })
            .sum();

        // Then
        assert_eq!(steps, 60);
        assert_abs_diff_eq!(time.accumulator(), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(time.fixed_time(), 1.0, epsilon = 1e-9);
        assert_eq!(time.frame(), 60);
    }

    #[test]
    fn remainder_carries_between_frames() {
        // Given
        let mut time = Time::new(1.0 / 60.0, 5);

        // When
        let steps: u32 = [0.02, 0.02, 0.02]
            .into_iter()
            .map(|delta| {
                time.accumulate(delta);
                drain(&mut time)
            })
            .sum();

        // Then
        assert_eq!(steps, 3);
        assert_abs_diff_eq!(time.accumulator(), 0.01, epsilon = 1e-9);
        assert_abs_diff_eq!(time.time(), 0.06, epsilon = 1e-9);
    }

    #[test]
    fn invalid_delta_leaves_state_untouched() {
        // Given
        let mut time = Time::new(1.0 / 60.0, 5);
        time.accumulate(0.01);
        let before = time;

        // When
        let accepted = [0.0, -0.25, f64::NAN, f64::NEG_INFINITY]
            .into_iter()
            .any(|delta| time.accumulate(delta));

        // Then
        assert!(!accepted);
        assert_eq!(time, before);
    }

    #[test]
    fn stall_is_clamped() {
        // Given
        let mut time = Time::new(0.25, 3);

        // When
        time.accumulate(10.0);

        // Then
        assert_eq!(time.accumulator(), 0.75);
        assert_eq!(drain(&mut time), 3);
        assert_eq!(time.accumulator(), 0.0);
        assert_abs_diff_eq!(time.time(), 10.0);
    }

    #[test]
    fn reset_keeps_configuration() {
        // Given
        let mut time = Time::new(0.02, 4);
        time.accumulate(0.05);

        // When
        time.reset();

        // Then
        assert_eq!(time.fixed_step(), 0.02);
        assert_abs_diff_eq!(time.max_accumulator(), 0.08);
        assert_eq!(time.accumulator(), 0.0);
        assert_eq!(time.frame(), 0);
    }

    #[test]
    fn invalid_fixed_step_uses_default() {
        // When
        let time = Time::new(0.0, 0);

        // Then
        assert_eq!(time.fixed_step(), DEFAULT_FIXED_STEP);
        assert_eq!(time.max_accumulator(), DEFAULT_FIXED_STEP);
    }

    #[test]
    fn fps_window() {
        // Given
        let mut counter = FpsCounter::new(1.0);

        // When - 89 frames stay inside the window
        let early = (0..89).filter_map(|_| counter.record(1.0 / 90.0)).count();
        let published = (0..2).find_map(|_| counter.record(1.0 / 90.0));

        // Then
        assert_eq!(early, 0);
        let fps = published.unwrap();
        assert!((89.0..=91.0).contains(&fps));
        assert_eq!(counter.fps(), fps);
        assert_eq!(counter.record(-1.0), None);
    }
}
