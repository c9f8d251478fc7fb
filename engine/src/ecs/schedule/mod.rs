//! Scheduling systems into the two phases of a frame.
//!
//! A [`Scheduler`] runs an ordered list of systems once per tick. A [`Schedule`] pairs two of
//! them: the [`Phase::Update`] list runs once per frame with the variable frame delta, and the
//! [`Phase::FixedUpdate`] list runs once per fixed simulation step. The game loop decides how
//! often each phase runs; the schedule only knows how to run one.
//!
//! ```rust,ignore
//! use cadence_engine::ecs::{Phase, Schedule, System};
//!
//! let mut schedule = Schedule::new();
//! schedule.add_system(Phase::FixedUpdate, physics);
//! schedule.add_system(Phase::Update, animation);
//!
//! schedule.run(Phase::Update, &mut world, frame_delta);
//! schedule.run(Phase::FixedUpdate, &mut world, fixed_step);
//! ```

mod scheduler;

use std::fmt;

pub use scheduler::Scheduler;

use crate::ecs::{
    system::{self, System},
    world::World,
};

/// The stage of a frame a system runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Once per display refresh with the measured frame delta.
    Update,
    /// Once per fixed simulation step with the fixed step as delta.
    FixedUpdate,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Update => f.write_str("Update"),
            Phase::FixedUpdate => f.write_str("FixedUpdate"),
        }
    }
}

/// One scheduler per [`Phase`].
#[derive(Default)]
pub struct Schedule {
    update: Scheduler,
    fixed: Scheduler,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_system(&mut self, phase: Phase, system: System) -> system::Id {
        self.scheduler_mut(phase).register(system)
    }

    /// Tick the phase's systems. Returns the number of systems invoked.
    pub fn run(&mut self, phase: Phase, world: &mut World, delta: f64) -> usize {
        self.scheduler_mut(phase).tick(world, delta)
    }

    #[inline]
    pub fn scheduler(&self, phase: Phase) -> &Scheduler {
        match phase {
            Phase::Update => &self.update,
            Phase::FixedUpdate => &self.fixed,
        }
    }

    #[inline]
    pub fn scheduler_mut(&mut self, phase: Phase) -> &mut Scheduler {
        match phase {
            Phase::Update => &mut self.update,
            Phase::FixedUpdate => &mut self.fixed,
        }
    }

    /// Total number of systems across both phases.
    pub fn len(&self) -> usize {
        self.update.len() + self.fixed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
