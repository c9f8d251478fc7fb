//! Frame pacing and the simulation context.
//!
//! [`GameLoop`] turns host refresh callbacks into one variable update and a whole number of
//! fixed updates per frame. [`QualityController`] watches frame times and thermal state and picks
//! a [`QualityLevel`]. [`Simulation`] ties both to one ECS world and its schedule.

pub mod config;
mod display;
mod frame;
mod game_loop;
pub mod log;
mod logic;
pub mod quality;
mod simulation;
mod state;
pub mod time;

pub use config::{Config, ConfigError, QualityConfig};
pub use display::{DEFAULT_REFRESH_HZ, DisplayLink};
pub use frame::Frame;
pub use game_loop::{GameLoop, StopHandle};
pub use logic::Logic;
pub use quality::{
    ChangeCause, PerformanceMetrics, PerformanceWarning, QualityChange, QualityController,
    QualityLevel, Severity, ThermalState,
};
pub use simulation::Simulation;
pub use state::State;
pub use time::{FpsCounter, Time};
