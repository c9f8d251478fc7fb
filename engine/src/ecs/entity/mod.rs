//! Entity identifiers and their allocation.
//!
//! An [`Entity`] is an opaque handle: an [`Id`] naming a slot plus a [`Generation`] counting how
//! many times that slot has been reused. When an entity is retired its slot generation is bumped
//! before the id goes back into the dead pool, so any handle still held for the old entity no
//! longer matches and every operation on it becomes a silent no-op.
//!
//! ```rust,ignore
//! let entity = allocator.alloc(); // Entity { id: 0, generation: 0 }
//! allocator.free(entity);
//! let reused = allocator.alloc();  // Entity { id: 0, generation: 1 }
//! ```
//!
//! The [`Registry`] owns the live set: which entities exist, the order they were created in, and
//! the tags attached to each of them.

mod registry;

use std::{
    borrow::Cow,
    fmt,
    sync::{
        PoisonError, RwLock,
        atomic::{AtomicU32, Ordering},
    },
};

use crossbeam::queue::SegQueue;

pub use registry::Registry;

/// How many times an entity slot has been retired.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u32);

impl Generation {
    #[inline]
    fn bumped(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// An entity slot identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(u32);

impl From<u32> for Id {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// An entity handle. Two handles are equal only when slot and generation both match.
///
/// Ordering is by slot, then generation. It says nothing about creation order; the
/// [`Registry`] tracks that separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Entity {
    id: Id,
    generation: Generation,
}

impl Entity {
    #[inline]
    pub(crate) const fn from_parts(id: Id, generation: Generation) -> Self {
        Self { id, generation }
    }

    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    #[inline]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Slot index, for Vec and bit set storage.
    #[inline]
    pub fn index(&self) -> usize {
        self.id.0 as usize
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.id.0, self.generation.0)
    }
}

/// A coarse category label attached to entities, e.g. `"player"` or `"projectile"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag(Cow<'static, str>);

impl Tag {
    /// Construct a tag from a static string without allocating.
    #[inline]
    pub const fn new(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// The tag's label.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// An empty tag list, for creating entities without tags.
pub const UNTAGGED: [Tag; 0] = [];

impl From<&'static str> for Tag {
    fn from(value: &'static str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Tag {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}

impl From<&Tag> for Tag {
    fn from(value: &Tag) -> Self {
        value.clone()
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hands out entity handles and recycles retired slots.
///
/// Works through `&self`, so a system holding component borrows can still reserve the handle
/// for a deferred spawn. The generation table is only written when a slot is minted or retired.
#[derive(Default, Debug)]
pub struct Allocator {
    generations: RwLock<Vec<Generation>>,
    free_slots: SegQueue<Id>,
    next_slot: AtomicU32,
}

impl Allocator {
    pub const fn new() -> Self {
        Self {
            generations: RwLock::new(Vec::new()),
            free_slots: SegQueue::new(),
            next_slot: AtomicU32::new(0),
        }
    }

    /// A handle for a recycled slot if one is free, else for a fresh slot.
    pub fn alloc(&self) -> Entity {
        if let Some(id) = self.free_slots.pop() {
            let generations = self.generations.read().unwrap_or_else(PoisonError::into_inner);
            let generation = generations.get(id.0 as usize).copied().unwrap_or_default();
            return Entity::from_parts(id, generation);
        }

        let id = Id(self.next_slot.fetch_add(1, Ordering::Relaxed));
        let mut generations = self.generations.write().unwrap_or_else(PoisonError::into_inner);
        if generations.len() <= id.0 as usize {
            generations.resize(id.0 as usize + 1, Generation::default());
        }
        Entity::from_parts(id, Generation::default())
    }

    /// Retire `entity`: its slot generation moves on, so the handle goes stale, and the slot is
    /// queued for reuse. Only live handles may be freed; the [`World`](crate::ecs::World)
    /// checks the registry first.
    pub fn free(&self, entity: Entity) {
        let mut generations = self.generations.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(generation) = generations.get_mut(entity.index()) {
            *generation = generation.bumped();
        }
        drop(generations);
        self.free_slots.push(entity.id);
    }
}
