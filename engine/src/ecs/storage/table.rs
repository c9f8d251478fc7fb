use std::any::Any;

use fixedbitset::FixedBitSet;

use crate::ecs::{component::Component, entity::Entity};

/// Sentinel for an empty sparse slot.
const EMPTY: u32 = u32::MAX;

/// A densely packed table holding every instance of one component kind.
///
/// Sparse-set layout: `values` and `entities` are parallel dense arrays, `sparse` maps an entity
/// slot index to its dense position, and `members` mirrors `sparse` as a bit set so the query
/// engine can intersect tables without touching the values.
///
/// # Invariants
/// - `values.len() == entities.len()`
/// - `sparse[entities[i].index()] == i` for every dense position `i`
/// - `members` contains exactly the slot indices of `entities`
pub struct Table<T: Component> {
    values: Vec<T>,
    entities: Vec<Entity>,
    sparse: Vec<u32>,
    members: FixedBitSet,
}

impl<T: Component> Default for Table<T> {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            entities: Vec::new(),
            sparse: Vec::new(),
            members: FixedBitSet::new(),
        }
    }
}

impl<T: Component> Table<T> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value for the entity, returning the value it replaced.
    pub fn insert(&mut self, entity: Entity, value: T) -> Option<T> {
        if let Some(dense) = self.dense_of(entity) {
            return Some(std::mem::replace(&mut self.values[dense], value));
        }

        let index = entity.index();
        if index >= self.sparse.len() {
            self.sparse.resize(index + 1, EMPTY);
            self.members.grow(index + 1);
        }

        // A stale entity of an earlier generation may still own the slot.
        if self.sparse[index] != EMPTY {
            self.swap_remove(index);
        }

        self.sparse[index] = self.values.len() as u32;
        self.values.push(value);
        self.entities.push(entity);
        self.members.insert(index);
        None
    }

    /// Remove the entity's value, if present.
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        self.dense_of(entity)?;
        Some(self.swap_remove(entity.index()))
    }

    /// Get the entity's value.
    #[inline]
    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.dense_of(entity).map(|dense| &self.values[dense])
    }

    /// Get the entity's value mutably.
    #[inline]
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.dense_of(entity).map(|dense| &mut self.values[dense])
    }

    /// Returns true if the entity has a value in this table.
    #[inline]
    pub fn contains(&self, entity: Entity) -> bool {
        self.dense_of(entity).is_some()
    }

    /// Number of stored values.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    fn dense_of(&self, entity: Entity) -> Option<usize> {
        let dense = *self.sparse.get(entity.index())?;
        if dense == EMPTY {
            return None;
        }
        let dense = dense as usize;
        (self.entities[dense] == entity).then_some(dense)
    }

    /// Remove whatever occupies the slot, moving the last dense element into its place.
    fn swap_remove(&mut self, index: usize) -> T {
        let dense = self.sparse[index] as usize;
        self.sparse[index] = EMPTY;
        self.members.set(index, false);

        let last = self.entities.len() - 1;
        if dense != last {
            let moved = self.entities[last];
            self.sparse[moved.index()] = dense as u32;
        }
        self.entities.swap_remove(dense);
        self.values.swap_remove(dense)
    }
}

/// The type-erased face of a [`Table`], letting storage hold tables of every component kind in
/// one collection.
pub trait Column: Any + Send + Sync {
    /// Slot indices of the entities stored in this column.
    fn members(&self) -> &FixedBitSet;

    /// Drop the entity's value, if present. Returns true if a value was dropped.
    fn remove_entity(&mut self, entity: Entity) -> bool;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> Column for Table<T> {
    #[inline]
    fn members(&self) -> &FixedBitSet {
        &self.members
    }

    fn remove_entity(&mut self, entity: Entity) -> bool {
        self.remove(entity).is_some()
    }

    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
