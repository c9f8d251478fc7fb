//! Component kinds for the ECS.
//!
//! A component is a plain value attached to at most one entity per kind. Kinds are identified by
//! a dense [`Id`] handed out by a per-world [`Registry`] the first time a Rust type is used as a
//! component. Each id maps to exactly one densely packed table in storage, so there is no runtime
//! reflection on the hot path, only a single `TypeId -> Id` lookup per access.
//!
//! ```ignore
//! use cadence_engine::ecs::{Component, component::Registry};
//!
//! #[derive(Component)]
//! struct Position { x: f32, y: f32 }
//!
//! let registry = Registry::new();
//! let pos_id = registry.register::<Position>();
//! ```

mod registry;
mod spec;

pub use registry::Registry;
pub use spec::{IntoSpec, Spec};

/// A component kind identifier. Ids are dense and start at zero within a registry.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(u32);

impl Id {
    /// Construct a new component Id from a raw u32 value.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the index of this component kind's table in indexable storage.
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for Id {
    #[inline]
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

/// Marker trait for component values.
///
/// Components carry no behavior. The bounds allow component values to be handed to the
/// simulation from other threads through [`Remote`](crate::ecs::world::Remote).
pub trait Component: 'static + Sized + Send + Sync {}
