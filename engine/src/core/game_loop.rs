//! The frame pacer.
//!
//! The host's refresh signal calls [`GameLoop::on_refresh`] with the current instant. While
//! running, each refresh:
//!
//! 1. measures the delta since the previous refresh,
//! 2. feeds it to the one second FPS window,
//! 3. runs the variable update once with the delta,
//! 4. adds the delta to the fixed-step accumulator and runs one fixed update per whole step owed.
//!
//! A zero, negative or non-finite delta runs nothing and leaves the accumulator alone.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Instant,
};

use log::{debug, info};

use crate::core::{
    frame::Frame,
    logic::Logic,
    state::State,
    time::{FpsCounter, Time, is_valid_delta},
};

/// A cloneable handle that asks a loop to stop at its next refresh.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop. Takes effect at the next refresh boundary, never mid-frame.
    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn clear(&self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Separates variable-rate updates from a fixed-rate simulation step.
#[derive(Debug)]
pub struct GameLoop {
    state: State,
    time: Time,
    fps: FpsCounter,
    /// The instant of the last accepted refresh.
    last_update: Option<Instant>,
    stop_handle: StopHandle,
}

impl Default for GameLoop {
    fn default() -> Self {
        Self::new(Time::default(), FpsCounter::default())
    }
}

impl GameLoop {
    pub fn new(time: Time, fps: FpsCounter) -> Self {
        Self {
            state: State::Stopped,
            time,
            fps,
            last_update: None,
            stop_handle: StopHandle::new(),
        }
    }

    #[inline]
    pub fn state(&self) -> State {
        self.state
    }

    #[inline]
    pub fn time(&self) -> &Time {
        &self.time
    }

    /// The last published frames per second.
    #[inline]
    pub fn fps(&self) -> f64 {
        self.fps.fps()
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop_handle.clone()
    }

    /// Begin accepting refreshes, using `now` as the timing origin. Returns false if the loop was
    /// not stopped.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.state != State::Stopped {
            debug!("Ignoring start while {}", self.state);
            return false;
        }
        self.stop_handle.clear();
        self.last_update = Some(now);
        self.state = State::Running;
        info!(
            "Game loop started with a {:.4}s fixed step",
            self.time.fixed_step()
        );
        true
    }

    /// Stop accepting refreshes and reset all timing state. Returns false if already stopped.
    pub fn stop(&mut self) -> bool {
        if self.state == State::Stopped {
            debug!("Ignoring stop while already stopped");
            return false;
        }
        info!(
            "Game loop stopped after {} frames, {:.2}s",
            self.time.frame(),
            self.time.time()
        );
        self.state = State::Stopped;
        self.time.reset();
        self.fps.reset();
        self.last_update = None;
        true
    }

    /// Ignore refreshes until resumed. Returns false if not running.
    pub fn pause(&mut self) -> bool {
        if self.state != State::Running {
            debug!("Ignoring pause while {}", self.state);
            return false;
        }
        self.state = State::Paused;
        info!("Game loop paused");
        true
    }

    /// Resume a paused loop. `now` becomes the new timing origin so the pause is not delivered as
    /// one long frame. Returns false if not paused.
    pub fn resume(&mut self, now: Instant) -> bool {
        if self.state != State::Paused {
            debug!("Ignoring resume while {}", self.state);
            return false;
        }
        self.last_update = Some(now);
        self.state = State::Running;
        info!("Game loop resumed");
        true
    }

    /// Measure the delta for a refresh at `now`.
    ///
    /// Honors a pending stop request first. Returns `None` when the loop is not running or when
    /// `now` precedes the last refresh, in which case the timing origin is kept.
    pub fn refresh_delta(&mut self, now: Instant) -> Option<f64> {
        if self.stop_handle.is_stop_requested() && self.state != State::Stopped {
            info!("Stopping game loop on request");
            self.stop();
            return None;
        }
        if self.state != State::Running {
            return None;
        }
        let last = self.last_update?;
        let Some(elapsed) = now.checked_duration_since(last) else {
            debug!("Ignoring refresh earlier than the previous one");
            return None;
        };
        self.last_update = Some(now);
        Some(elapsed.as_secs_f64())
    }

    /// Handle one host refresh: measure the delta and run the frame.
    pub fn on_refresh(&mut self, now: Instant, logic: &mut impl Logic) -> Option<Frame> {
        let delta = self.refresh_delta(now)?;
        self.advance(delta, logic)
    }

    /// Run one frame with an explicit delta: the variable update once, then every fixed step
    /// owed. Returns the completed frame, or `None` if the loop is not running or the delta is
    /// invalid.
    pub fn advance(&mut self, delta: f64, logic: &mut impl Logic) -> Option<Frame> {
        if self.state != State::Running {
            debug!("Ignoring frame while {}", self.state);
            return None;
        }
        if !is_valid_delta(delta) {
            debug!("Skipping frame with invalid delta {delta}");
            return None;
        }

        self.fps.record(delta);
        self.time.accumulate(delta);

        let mut frame = self.frame(0);
        logic.on_update(&frame);

        while self.time.has_fixed() {
            self.time.increment_fixed();
            frame = self.frame(frame.fixed_steps + 1);
            logic.on_fixed_update(&frame);
        }
        Some(frame)
    }

    fn frame(&self, fixed_steps: u32) -> Frame {
        Frame {
            number: self.time.frame(),
            delta: self.time.delta(),
            fixed_step: self.time.fixed_step(),
            fixed_steps,
            time: self.time.time(),
            fixed_time: self.time.fixed_time(),
            accumulator: self.time.accumulator(),
            fps: self.fps.fps(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use approx::assert_abs_diff_eq;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<(&'static str, f64)>,
    }

    impl Recorder {
        fn count(&self, kind: &str) -> usize {
            self.calls.iter().filter(|(k, _)| *k == kind).count()
        }
    }

    impl Logic for Recorder {
        fn on_update(&mut self, frame: &Frame) {
            self.calls.push(("update", frame.delta));
        }

        fn on_fixed_update(&mut self, frame: &Frame) {
            self.calls.push(("fixed", frame.fixed_step));
        }
    }

    fn running(fixed_step: f64) -> GameLoop {
        let mut game_loop = GameLoop::new(Time::new(fixed_step, 5), FpsCounter::new(1.0));
        game_loop.start(Instant::now());
        game_loop
    }

    #[test]
    fn start_and_stop_transitions() {
        // Given
        let mut game_loop = GameLoop::default();
        let now = Instant::now();

        // Then
        assert_eq!(game_loop.state(), State::Stopped);
        assert!(!game_loop.stop());
        assert!(game_loop.start(now));
        assert!(!game_loop.start(now));
        assert_eq!(game_loop.state(), State::Running);
        assert!(game_loop.stop());
        assert_eq!(game_loop.state(), State::Stopped);
    }

    #[test]
    fn update_runs_before_fixed_steps() {
        // Given
        let mut game_loop = running(1.0 / 60.0);
        let mut logic = Recorder::default();

        // When
        let frame = game_loop.advance(0.06, &mut logic).unwrap();

        // Then
        assert_eq!(logic.calls[0], ("update", 0.06));
        assert_eq!(logic.count("fixed"), 3);
        assert_eq!(frame.fixed_steps, 3);
        assert_eq!(frame.number, 1);
        assert!(logic.calls[1..].iter().all(|(kind, _)| *kind == "fixed"));
    }

    #[test]
    fn fixed_steps_for_twenty_millisecond_frames() {
        // Given
        let mut game_loop = running(1.0 / 60.0);
        let mut logic = Recorder::default();

        // When
        for _ in 0..3 {
            game_loop.advance(0.02, &mut logic);
        }

        // Then
        assert_eq!(logic.count("update"), 3);
        assert_eq!(logic.count("fixed"), 3);
        assert_abs_diff_eq!(game_loop.time().accumulator(), 0.01, epsilon = 1e-9);
    }

    #[test]
    fn invalid_delta_runs_nothing() {
        // Given
        let mut game_loop = running(1.0 / 60.0);
        let mut logic = Recorder::default();
        game_loop.advance(0.01, &mut logic);
        let before = *game_loop.time();
        logic.calls.clear();

        // When
        let frames: Vec<_> = [0.0, -0.016]
            .into_iter()
            .map(|delta| game_loop.advance(delta, &mut logic))
            .collect();

        // Then
        assert!(frames.iter().all(Option::is_none));
        assert!(logic.calls.is_empty());
        assert_eq!(*game_loop.time(), before);
    }

    #[test]
    fn stopped_or_paused_loop_ignores_frames() {
        // Given
        let mut game_loop = GameLoop::default();
        let mut logic = Recorder::default();

        // Then
        assert!(game_loop.advance(0.01, &mut logic).is_none());

        // When
        let now = Instant::now();
        game_loop.start(now);
        assert!(game_loop.pause());

        // Then
        assert!(game_loop.advance(0.01, &mut logic).is_none());
        assert!(game_loop.on_refresh(now + Duration::from_millis(11), &mut logic).is_none());
        assert!(logic.calls.is_empty());
    }

    #[test]
    fn refresh_measures_delta() {
        // Given
        let origin = Instant::now();
        let mut game_loop = GameLoop::default();
        game_loop.start(origin);
        let mut logic = Recorder::default();

        // When
        let frame = game_loop
            .on_refresh(origin + Duration::from_millis(11), &mut logic)
            .unwrap();

        // Then
        assert_abs_diff_eq!(frame.delta, 0.011, epsilon = 1e-9);

        // When - A refresh from the past is ignored without moving the origin
        let stale = game_loop.refresh_delta(origin);
        let next = game_loop.refresh_delta(origin + Duration::from_millis(22));

        // Then
        assert_eq!(stale, None);
        assert_abs_diff_eq!(next.unwrap(), 0.011, epsilon = 1e-9);
    }

    #[test]
    fn resume_reanchors_clock() {
        // Given
        let origin = Instant::now();
        let mut game_loop = GameLoop::default();
        game_loop.start(origin);
        game_loop.pause();

        // When
        let later = origin + Duration::from_secs(5);
        assert!(game_loop.resume(later));
        let delta = game_loop.refresh_delta(later + Duration::from_millis(10));

        // Then
        assert_abs_diff_eq!(delta.unwrap(), 0.010, epsilon = 1e-9);
        assert!(!game_loop.resume(later));
    }

    #[test]
    fn stop_handle_takes_effect_at_next_refresh() {
        // Given
        let origin = Instant::now();
        let mut game_loop = running(1.0 / 60.0);
        let mut logic = Recorder::default();
        game_loop.advance(0.05, &mut logic);
        let handle = game_loop.stop_handle();

        // When
        std::thread::spawn(move || handle.stop()).join().unwrap();

        // Then
        assert_eq!(game_loop.state(), State::Running);
        assert!(game_loop.on_refresh(origin, &mut logic).is_none());
        assert_eq!(game_loop.state(), State::Stopped);
        assert_eq!(game_loop.time().frame(), 0);
        assert_eq!(game_loop.time().accumulator(), 0.0);

        // Then - A fresh start clears the request
        assert!(game_loop.start(Instant::now()));
        assert!(!game_loop.stop_handle().is_stop_requested());
    }
}
