//! The simulation context: one world, its schedule, the game loop and the quality controller,
//! owned together by whatever composes the application.
//!
//! ```rust,ignore
//! use cadence_engine::core::{Config, DisplayLink, Simulation};
//! use cadence_engine::ecs::{Phase, System};
//!
//! let config = Config::default();
//! let mut sim = Simulation::new(config.clone());
//! sim.add_system(Phase::FixedUpdate, physics);
//!
//! let link = DisplayLink::new(config.target_refresh_hz);
//! sim.start();
//! sim.run(&link, Some(900));
//! ```
//!
//! Each accepted refresh is processed in a fixed order: requests queued through the world's
//! [`Remote`](crate::ecs::Remote) and thermal notifications are applied, the variable update runs
//! and then every fixed step owed, and finally the frame time is reported to the quality
//! controller.

use std::time::Instant;

use crossbeam::channel::{self, Receiver, Sender};
use log::{debug, info};

use crate::{
    core::{
        config::Config,
        display::DisplayLink,
        frame::Frame,
        game_loop::{GameLoop, StopHandle},
        logic::Logic,
        quality::{PerformanceMetrics, QualityChange, QualityController, QualityLevel, ThermalState},
        state::State,
        time::{FpsCounter, Time},
    },
    ecs::{
        schedule::{Phase, Schedule},
        system::{self, System},
        world::World,
    },
};

/// Runs the two schedule phases as the loop's variable and fixed updates.
struct Stepper<'a> {
    world: &'a mut World,
    schedule: &'a mut Schedule,
}

impl Logic for Stepper<'_> {
    fn on_update(&mut self, frame: &Frame) {
        self.schedule.run(Phase::Update, self.world, frame.delta);
    }

    fn on_fixed_update(&mut self, frame: &Frame) {
        self.schedule.run(Phase::FixedUpdate, self.world, frame.fixed_step);
    }
}

/// An explicitly constructed, self-contained simulation.
pub struct Simulation {
    config: Config,
    world: World,
    schedule: Schedule,
    game_loop: GameLoop,
    quality: QualityController,
    thermal_sender: Sender<ThermalState>,
    thermal_receiver: Receiver<ThermalState>,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Simulation {
    pub fn new(config: Config) -> Self {
        Self::with_world(config, World::default())
    }

    /// Build a simulation around an existing world.
    pub fn with_world(config: Config, world: World) -> Self {
        let (thermal_sender, thermal_receiver) = channel::unbounded();
        Self {
            world,
            schedule: Schedule::new(),
            game_loop: GameLoop::new(
                Time::new(config.fixed_step, config.max_fixed_steps),
                FpsCounter::new(config.fps_window),
            ),
            quality: QualityController::new(config.target_refresh_hz, config.quality.clone()),
            thermal_sender,
            thermal_receiver,
            config,
        }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    pub fn world(&self) -> &World {
        &self.world
    }

    #[inline]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    #[inline]
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn add_system(&mut self, phase: Phase, system: System) -> system::Id {
        self.schedule.add_system(phase, system)
    }

    #[inline]
    pub fn state(&self) -> State {
        self.game_loop.state()
    }

    #[inline]
    pub fn game_loop(&self) -> &GameLoop {
        &self.game_loop
    }

    pub fn start(&mut self) -> bool {
        self.game_loop.start(Instant::now())
    }

    pub fn stop(&mut self) -> bool {
        self.game_loop.stop()
    }

    pub fn pause(&mut self) -> bool {
        self.game_loop.pause()
    }

    pub fn resume(&mut self) -> bool {
        self.game_loop.resume(Instant::now())
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.game_loop.stop_handle()
    }

    /// A sender for platform thermal notifications. They are applied at the next frame.
    pub fn thermal_sender(&self) -> Sender<ThermalState> {
        self.thermal_sender.clone()
    }

    #[inline]
    pub fn quality_level(&self) -> QualityLevel {
        self.quality.level()
    }

    pub fn metrics(&self) -> PerformanceMetrics {
        self.quality.metrics()
    }

    /// Handle a host refresh at `now`.
    pub fn on_refresh(&mut self, now: Instant) -> Option<Frame> {
        let delta = self.game_loop.refresh_delta(now)?;
        self.advance(delta)
    }

    /// Run one frame with an explicit delta. Returns `None` if the loop is not running or the
    /// delta is invalid; pending requests and notifications are still applied.
    pub fn advance(&mut self, delta: f64) -> Option<Frame> {
        self.drain_inputs();

        let mut stepper = Stepper {
            world: &mut self.world,
            schedule: &mut self.schedule,
        };
        let frame = self.game_loop.advance(delta, &mut stepper)?;

        if let Some(change) = self.quality.record_frame_time(frame.delta) {
            self.log_change(change);
        }
        Some(frame)
    }

    /// Drive the simulation from a display link until it stops, or for at most `max_frames`
    /// frames. Returns the number of frames run.
    pub fn run(&mut self, link: &DisplayLink, max_frames: Option<u64>) -> u64 {
        let mut frames = 0;
        while self.state() != State::Stopped {
            if max_frames.is_some_and(|max| frames >= max) {
                self.stop();
                break;
            }
            let Some(now) = link.next() else {
                debug!("Display link closed");
                self.stop();
                break;
            };
            if self.on_refresh(now).is_some() {
                frames += 1;
            }
        }
        frames
    }

    fn drain_inputs(&mut self) {
        let applied = self.world.drain_remote();
        if applied > 0 {
            debug!("Applied {applied} remote requests");
        }
        let notifications: Vec<_> = self.thermal_receiver.try_iter().collect();
        for state in notifications {
            if let Some(change) = self.quality.set_thermal_state(state) {
                self.log_change(change);
            }
        }
    }

    fn log_change(&self, change: QualityChange) {
        info!("Quality changed: {change}");
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::{
        core::config::QualityConfig,
        ecs::{Component, Tag},
    };

    #[derive(Component, Debug, PartialEq)]
    struct Ticks(u32);

    fn config() -> Config {
        Config {
            fixed_step: 0.25,
            quality: QualityConfig {
                evaluation_interval: 2,
                history_capacity: 2,
                ..QualityConfig::default()
            },
            ..Config::default()
        }
    }

    #[test]
    fn frame_runs_update_then_fixed_phase() {
        // Given
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut sim = Simulation::new(config());
        let update_log = log.clone();
        sim.add_system(
            Phase::Update,
            System::new("update", 0, move |ctx, _| {
                update_log.borrow_mut().push(("update", ctx.delta()));
            }),
        );
        let fixed_log = log.clone();
        sim.add_system(
            Phase::FixedUpdate,
            System::new("fixed", 0, move |ctx, _| {
                fixed_log.borrow_mut().push(("fixed", ctx.delta()));
            }),
        );
        sim.start();

        // When
        let frame = sim.advance(0.5).unwrap();

        // Then
        assert_eq!(frame.fixed_steps, 2);
        assert_eq!(
            *log.borrow(),
            vec![("update", 0.5), ("fixed", 0.25), ("fixed", 0.25)]
        );
    }

    #[test]
    fn stopped_simulation_ignores_frames() {
        // Given
        let mut sim = Simulation::new(config());

        // Then
        assert!(sim.advance(0.5).is_none());
        assert!(sim.start());
        assert!(sim.advance(0.0).is_none());
        assert!(sim.advance(-1.0).is_none());
        assert!(sim.stop());
        assert_eq!(sim.state(), State::Stopped);
    }

    #[test]
    fn remote_requests_apply_at_frame_boundary() {
        // Given
        let mut sim = Simulation::new(config());
        let remote = sim.world().remote();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let observed = seen.clone();
        sim.add_system(
            Phase::Update,
            System::new("count", 0, move |_, matched| {
                observed.borrow_mut().push(matched.len());
            })
            .requires::<Ticks>(),
        );
        sim.start();

        // When
        std::thread::spawn(move || {
            remote.spawn_with(["net"], |world, e| {
                world.add_component(e, Ticks(0));
            })
        })
        .join()
        .unwrap();
        sim.advance(0.1);

        // Then
        assert_eq!(*seen.borrow(), vec![1]);
        assert_eq!(sim.world().query_of::<()>(&[Tag::new("net")]).len(), 1);
    }

    #[test]
    fn thermal_notifications_drive_quality() {
        // Given
        let mut sim = Simulation::new(config());
        let thermal = sim.thermal_sender();
        sim.start();

        // When
        thermal.send(ThermalState::Critical).unwrap();
        sim.advance(1.0 / 90.0);

        // Then
        assert_eq!(sim.quality_level(), QualityLevel::Minimal);
        assert_eq!(sim.metrics().thermal_state, ThermalState::Critical);
    }

    #[test]
    fn slow_frames_lower_quality() {
        // Given
        let mut sim = Simulation::new(config());
        sim.start();

        // When - Two 50 ms frames complete one evaluation window
        sim.advance(0.05);
        sim.advance(0.05);

        // Then
        assert_eq!(sim.quality_level(), QualityLevel::Medium);
    }

    #[test]
    fn run_stops_after_frame_limit() {
        // Given
        let mut sim = Simulation::new(config());
        let link = DisplayLink::new(500.0);
        sim.start();

        // When
        let frames = sim.run(&link, Some(3));

        // Then
        assert_eq!(frames, 3);
        assert_eq!(sim.state(), State::Stopped);
    }

    #[test]
    fn run_honors_stop_handle() {
        // Given
        let mut sim = Simulation::new(config());
        let link = DisplayLink::new(500.0);
        sim.stop_handle().stop();
        sim.start();
        sim.stop_handle().stop();

        // When
        let frames = sim.run(&link, None);

        // Then
        assert_eq!(frames, 0);
        assert_eq!(sim.state(), State::Stopped);
    }
}
