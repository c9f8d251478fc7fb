//! The world: entities, their components, and the deferred changes waiting to be applied.
//!
//! A `World` is an explicitly constructed value. Nothing in it is global, so a process can run
//! any number of independent worlds side by side.
//!
//! ```ignore
//! use cadence_engine::ecs::{World, WorldId};
//!
//! let mut world = World::new(WorldId::new(1));
//! let ship = world.create_entity(["player"]);
//! world.add_component(ship, Position { x: 0.0, y: 0.0 });
//!
//! let moving = world.query_of::<(Position, Velocity)>(&[]);
//! world.destroy_entity(ship);
//! ```
//!
//! The immediate API on this type is meant for setup and for code running between ticks. Systems
//! receive a [`Context`](crate::ecs::system::Context) instead, which defers structural changes to
//! the end of the tick. Other threads submit requests through a [`Remote`].

mod remote;

use crossbeam::channel::{self, Receiver, Sender};
use log::debug;

pub use remote::{InitFn, Remote, Request};

use crate::ecs::{
    component::{self, Component, IntoSpec, Spec},
    entity::{self, Entity, Tag},
    query,
    storage::Storage,
    system::CommandBuffer,
};

/// A world identifier.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(u32);

impl Id {
    #[inline]
    pub const fn new(id: u32) -> Self {
        Id(id)
    }

    #[inline]
    pub const fn id(&self) -> u32 {
        self.0
    }
}

/// The container for all entities and components of one simulation.
pub struct World {
    id: Id,

    /// Component kind ids for this world.
    components: component::Registry,

    entity_allocator: entity::Allocator,

    /// Live entities, creation order and tags.
    entities: entity::Registry,

    storage: Storage,

    /// Structural changes deferred by systems.
    commands: CommandBuffer,

    remote_sender: Sender<Request>,
    remote_receiver: Receiver<Request>,
}

impl Default for World {
    fn default() -> Self {
        Self::new(Id::default())
    }
}

impl World {
    pub fn new(id: Id) -> Self {
        let (remote_sender, remote_receiver) = channel::unbounded();
        Self {
            id,
            components: component::Registry::new(),
            entity_allocator: entity::Allocator::new(),
            entities: entity::Registry::new(),
            storage: Storage::new(),
            commands: CommandBuffer::new(),
            remote_sender,
            remote_receiver,
        }
    }

    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    #[inline]
    pub fn components(&self) -> &component::Registry {
        &self.components
    }

    #[inline]
    pub fn commands(&self) -> &CommandBuffer {
        &self.commands
    }

    /// Register a component kind ahead of first use.
    pub fn register_component<C: Component>(&self) -> component::Id {
        self.components.register::<C>()
    }

    /// Resolve the spec for `S`, registering any kinds not yet known.
    pub fn signature<S: IntoSpec>(&self) -> Spec {
        self.components.spec::<S>()
    }

    /// Create a live entity carrying the given tags.
    pub fn create_entity(&mut self, tags: impl IntoIterator<Item = impl Into<Tag>>) -> Entity {
        let entity = self.entity_allocator.alloc();
        self.entities
            .insert(entity, tags.into_iter().map(Into::into).collect());
        entity
    }

    /// Allocate an entity handle without making it live. Used by deferred spawns.
    pub(crate) fn reserve_entity(&self) -> Entity {
        self.entity_allocator.alloc()
    }

    /// Make a reserved entity live.
    pub(crate) fn spawn_reserved(&mut self, entity: Entity, tags: Vec<Tag>) -> bool {
        self.entities.insert(entity, tags)
    }

    /// Retire an entity, dropping all of its components and tags. Returns false, and does
    /// nothing, if the entity is already retired.
    pub fn destroy_entity(&mut self, entity: Entity) -> bool {
        if !self.entities.remove(entity) {
            debug!("Ignoring destroy of retired entity {entity}");
            return false;
        }
        self.storage.remove_entity(entity);
        self.entity_allocator.free(entity);
        true
    }

    #[inline]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    /// Number of live entities.
    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// All live entities in creation order.
    pub fn entities(&self) -> Vec<Entity> {
        self.entities.entities()
    }

    #[inline]
    pub fn tags(&self, entity: Entity) -> &[Tag] {
        self.entities.tags(entity)
    }

    #[inline]
    pub fn has_tag(&self, entity: Entity, tag: &Tag) -> bool {
        self.entities.has_tag(entity, tag)
    }

    pub fn add_tag(&mut self, entity: Entity, tag: impl Into<Tag>) -> bool {
        self.entities.add_tag(entity, tag.into())
    }

    pub fn remove_tag(&mut self, entity: Entity, tag: &Tag) -> bool {
        self.entities.remove_tag(entity, tag)
    }

    /// Attach a component, overwriting any existing value of the same kind. Returns false if the
    /// entity is retired.
    pub fn add_component<C: Component>(&mut self, entity: Entity, value: C) -> bool {
        if !self.entities.is_alive(entity) {
            debug!(
                "Ignoring {} insert for retired entity {entity}",
                std::any::type_name::<C>()
            );
            return false;
        }
        let id = self.components.register::<C>();
        match self.storage.table_or_insert::<C>(id) {
            Some(table) => {
                table.insert(entity, value);
                true
            }
            None => false,
        }
    }

    pub fn get_component<C: Component>(&self, entity: Entity) -> Option<&C> {
        let id = self.components.get::<C>()?;
        self.storage.table::<C>(id)?.get(entity)
    }

    pub fn get_component_mut<C: Component>(&mut self, entity: Entity) -> Option<&mut C> {
        let id = self.components.get::<C>()?;
        self.storage.table_mut::<C>(id)?.get_mut(entity)
    }

    /// Detach and return a component, if present.
    pub fn remove_component<C: Component>(&mut self, entity: Entity) -> Option<C> {
        let id = self.components.get::<C>()?;
        self.storage.table_mut::<C>(id)?.remove(entity)
    }

    pub fn has_component<C: Component>(&self, entity: Entity) -> bool {
        self.components
            .get::<C>()
            .and_then(|id| self.storage.table::<C>(id))
            .is_some_and(|table| table.contains(entity))
    }

    /// Number of live entities holding a `C`.
    pub fn component_count<C: Component>(&self) -> usize {
        self.components
            .get::<C>()
            .and_then(|id| self.storage.table::<C>(id))
            .map_or(0, |table| table.len())
    }

    /// Live entities holding every kind in `spec` and every tag, in creation order.
    pub fn query(&self, spec: &Spec, tags: &[Tag]) -> query::Result {
        query::evaluate(spec, tags, &self.entities, &self.storage)
    }

    /// [`query`](Self::query) with the spec resolved from a type.
    pub fn query_of<S: IntoSpec>(&self, tags: &[Tag]) -> query::Result {
        self.query(&self.signature::<S>(), tags)
    }

    /// Apply every deferred command in FIFO order. Returns the number of commands applied.
    pub fn flush(&mut self) -> usize {
        let commands = self.commands.drain();
        let count = commands.len();
        for command in commands {
            command.apply(self);
        }
        count
    }

    /// A handle for submitting requests from other threads.
    pub fn remote(&self) -> Remote {
        Remote::new(self.remote_sender.clone())
    }

    /// Apply every pending remote request. Returns the number of requests applied.
    pub fn drain_remote(&mut self) -> usize {
        let requests: Vec<_> = self.remote_receiver.try_iter().collect();
        let count = requests.len();
        for request in requests {
            match request {
                Request::Spawn { tags, init } => {
                    let entity = self.create_entity(tags);
                    if let Some(init) = init {
                        init(self, entity);
                    }
                }
                Request::Destroy(entity) => {
                    self.destroy_entity(entity);
                }
                Request::Apply(change) => change(self),
            }
        }
        count
    }
}
