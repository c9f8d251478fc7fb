//! Component storage: one densely packed [`Table`] per component kind.

mod table;

use fixedbitset::FixedBitSet;

pub use table::{Column, Table};

use crate::ecs::{
    component::{self, Component},
    entity::Entity,
};

/// Type-erased tables indexed by component id.
#[derive(Default)]
pub struct Storage {
    columns: Vec<Option<Box<dyn Column>>>,
}

impl Storage {
    /// Create empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the table for a component kind.
    pub fn table<C: Component>(&self, id: component::Id) -> Option<&Table<C>> {
        self.columns
            .get(id.index())
            .and_then(Option::as_ref)
            .and_then(|column| column.as_any().downcast_ref::<Table<C>>())
    }

    /// Get the table for a component kind mutably.
    pub fn table_mut<C: Component>(&mut self, id: component::Id) -> Option<&mut Table<C>> {
        self.columns
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .and_then(|column| column.as_any_mut().downcast_mut::<Table<C>>())
    }

    /// Get the table for a component kind, creating it on first use.
    ///
    /// Returns `None` only if the id is already bound to a table of a different type, which the
    /// component registry rules out.
    pub fn table_or_insert<C: Component>(&mut self, id: component::Id) -> Option<&mut Table<C>> {
        let index = id.index();
        if index >= self.columns.len() {
            self.columns.resize_with(index + 1, || None);
        }
        self.columns[index]
            .get_or_insert_with(|| -> Box<dyn Column> { Box::new(Table::<C>::new()) })
            .as_any_mut()
            .downcast_mut::<Table<C>>()
    }

    /// Membership bit set of a component kind's table. Kinds with no table yet have no members.
    pub fn members(&self, id: component::Id) -> Option<&FixedBitSet> {
        self.columns
            .get(id.index())
            .and_then(Option::as_ref)
            .map(|column| column.members())
    }

    /// Strip the entity from every table. Returns the number of components dropped.
    pub fn remove_entity(&mut self, entity: Entity) -> usize {
        self.columns
            .iter_mut()
            .flatten()
            .map(|column| column.remove_entity(entity))
            .filter(|removed| *removed)
            .count()
    }
}
