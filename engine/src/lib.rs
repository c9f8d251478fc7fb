//! Cadence is a small real-time simulation substrate: an entity component store with a query
//! engine, a priority ordered system scheduler, a game loop that separates variable rate
//! presentation updates from fixed step simulation updates, and an adaptive quality controller
//! driven by frame time and thermal pressure.
//!
//! Everything is owned by an explicitly constructed [`core::Simulation`]; nothing is global.
//!
//! ```rust,ignore
//! use cadence_engine::core::{Config, Simulation};
//! use cadence_engine::ecs::{schedule::Phase, System};
//!
//! let mut sim = Simulation::new(Config::default());
//! sim.add_system(Phase::FixedUpdate, System::new("move", 0, |ctx, query| {
//!     for entity in query {
//!         // ...
//!     }
//! }).requires::<(Position, Velocity)>());
//! ```

// Lets `#[derive(Component)]` refer to `::cadence_engine` from inside this crate.
extern crate self as cadence_engine;

pub mod core;
pub mod ecs;
