//! Deferred structural changes.
//!
//! Systems never create, destroy, or re-shape entities while a tick is in progress. They push
//! [`Command`]s into the world's [`CommandBuffer`] instead, and the scheduler applies the whole
//! batch in FIFO order once every system of the tick has run:
//!
//! ```text
//!  System A ──push──┐
//!  System B ──push──┼──► CommandBuffer ──flush (end of tick)──► World
//!  System C ──push──┘
//! ```
//!
//! Commands that target an entity retired before the flush are dropped silently.

use crossbeam::queue::SegQueue;

use crate::ecs::{
    component::Component,
    entity::{Entity, Tag},
    world::World,
};

/// Type-erased component insertion, applied to the target entity at flush time.
pub type InsertFn = Box<dyn FnOnce(&mut World, Entity) + Send>;

/// Type-erased component removal.
pub type RemoveFn = fn(&mut World, Entity);

/// A deferred structural change.
pub enum Command {
    /// Make a reserved entity live with the given tags.
    Spawn { entity: Entity, tags: Vec<Tag> },

    /// Retire an entity and drop all its components.
    Destroy { entity: Entity },

    /// Add or overwrite a component.
    Insert { entity: Entity, apply: InsertFn },

    /// Remove a component, if present.
    Remove { entity: Entity, apply: RemoveFn },

    AddTag { entity: Entity, tag: Tag },

    RemoveTag { entity: Entity, tag: Tag },
}

impl Command {
    /// Build an insert command for a concrete component value.
    pub fn insert<C: Component>(entity: Entity, value: C) -> Self {
        Self::Insert {
            entity,
            apply: Box::new(move |world: &mut World, entity| {
                world.add_component(entity, value);
            }),
        }
    }

    /// Build a remove command for a component kind.
    pub fn remove<C: Component>(entity: Entity) -> Self {
        Self::Remove {
            entity,
            apply: remove_erased::<C>,
        }
    }

    /// The entity this command targets.
    pub fn entity(&self) -> Entity {
        match self {
            Self::Spawn { entity, .. }
            | Self::Destroy { entity }
            | Self::Insert { entity, .. }
            | Self::Remove { entity, .. }
            | Self::AddTag { entity, .. }
            | Self::RemoveTag { entity, .. } => *entity,
        }
    }

    /// Apply the command to the world.
    pub fn apply(self, world: &mut World) {
        match self {
            Self::Spawn { entity, tags } => {
                world.spawn_reserved(entity, tags);
            }
            Self::Destroy { entity } => {
                world.destroy_entity(entity);
            }
            Self::Insert { entity, apply } => apply(world, entity),
            Self::Remove { entity, apply } => apply(world, entity),
            Self::AddTag { entity, tag } => {
                world.add_tag(entity, tag);
            }
            Self::RemoveTag { entity, tag } => {
                world.remove_tag(entity, &tag);
            }
        }
    }
}

fn remove_erased<C: Component>(world: &mut World, entity: Entity) {
    world.remove_component::<C>(entity);
}

/// Lock-free FIFO of deferred commands.
#[derive(Default)]
pub struct CommandBuffer {
    commands: SegQueue<Command>,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a command. Safe to call through a shared reference.
    pub fn push(&self, command: Command) {
        self.commands.push(command);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Take every queued command in FIFO order, leaving the buffer empty.
    pub fn drain(&self) -> Vec<Command> {
        let mut commands = Vec::with_capacity(self.commands.len());
        while let Some(command) = self.commands.pop() {
            commands.push(command);
        }
        commands
    }
}
