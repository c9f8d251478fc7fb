pub mod component;
pub mod entity;
pub mod query;
pub mod schedule;
pub(crate) mod storage;
pub mod system;
pub(crate) mod util;
pub mod world;

pub use component::Component;
pub use entity::{Entity, Tag, UNTAGGED};
pub use schedule::{Phase, Schedule, Scheduler};
pub use system::{Context, System};
pub use world::{Id as WorldId, Remote, World};

pub use cadence_macros::Component;
