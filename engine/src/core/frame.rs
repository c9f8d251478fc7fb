/// Timing information for one display refresh, handed to both the variable and fixed updates.
///
/// During the fixed updates of a frame `fixed_steps` counts the steps run so far, including the
/// current one, and `fixed_time` includes the current step. The frame returned by the loop
/// carries the final counts.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Frame {
    /// One-based frame counter since the loop started.
    pub number: u64,
    /// Seconds since the previous refresh.
    pub delta: f64,
    /// The fixed simulation step, in seconds.
    pub fixed_step: f64,
    /// Fixed steps run during this frame.
    pub fixed_steps: u32,
    /// Total seconds delivered to the variable update.
    pub time: f64,
    /// Total seconds delivered to the fixed update.
    pub fixed_time: f64,
    /// Seconds still owed to the fixed update.
    pub accumulator: f64,
    /// The last measured frames per second.
    pub fps: f64,
}

impl Frame {
    /// How far the simulation is between the last fixed step and the next, in `[0, 1)`. Used to
    /// interpolate presentation between simulation states.
    pub fn alpha(&self) -> f64 {
        if self.fixed_step > 0.0 {
            (self.accumulator / self.fixed_step).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}
