use crate::core::frame::Frame;

/// The work driven by the game loop.
///
/// `on_update` runs once per refresh with the measured delta and drives presentation-facing work.
/// `on_fixed_update` runs zero or more times per refresh, always with the fixed step, and drives
/// the deterministic simulation. There is no fixed ratio between the two.
pub trait Logic {
    /// Called once per refresh.
    fn on_update(&mut self, frame: &Frame);

    /// Called once per fixed step owed.
    fn on_fixed_update(&mut self, frame: &Frame);
}
