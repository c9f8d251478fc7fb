use crossbeam::channel::Sender;

use crate::ecs::{
    component::Component,
    entity::{Entity, Tag},
    world::World,
};

/// Initializer run against a freshly spawned entity.
pub type InitFn = Box<dyn FnOnce(&mut World, Entity) + Send>;

/// A request sent to a world from outside its owning thread.
pub enum Request {
    Spawn {
        tags: Vec<Tag>,
        init: Option<InitFn>,
    },
    Destroy(Entity),
    Apply(Box<dyn FnOnce(&mut World) + Send>),
}

/// A cloneable, thread-safe handle for submitting changes to a [`World`].
///
/// Requests are queued on a channel and applied by [`World::drain_remote`], which the simulation
/// calls at every frame boundary. Sends return false once the world is gone.
#[derive(Clone)]
pub struct Remote {
    sender: Sender<Request>,
}

impl Remote {
    pub(crate) fn new(sender: Sender<Request>) -> Self {
        Self { sender }
    }

    /// Request a new entity with the given tags.
    pub fn spawn(&self, tags: impl IntoIterator<Item = impl Into<Tag>>) -> bool {
        self.send(Request::Spawn {
            tags: tags.into_iter().map(Into::into).collect(),
            init: None,
        })
    }

    /// Request a new entity and run `init` on it once it exists, e.g. to attach components.
    pub fn spawn_with<F>(&self, tags: impl IntoIterator<Item = impl Into<Tag>>, init: F) -> bool
    where
        F: FnOnce(&mut World, Entity) + Send + 'static,
    {
        self.send(Request::Spawn {
            tags: tags.into_iter().map(Into::into).collect(),
            init: Some(Box::new(init)),
        })
    }

    pub fn destroy(&self, entity: Entity) -> bool {
        self.send(Request::Destroy(entity))
    }

    /// Request a component insert (or overwrite) on an existing entity.
    pub fn insert<C: Component>(&self, entity: Entity, value: C) -> bool {
        self.apply(move |world| {
            world.add_component(entity, value);
        })
    }

    /// Run an arbitrary change against the world.
    pub fn apply<F>(&self, change: F) -> bool
    where
        F: FnOnce(&mut World) + Send + 'static,
    {
        self.send(Request::Apply(Box::new(change)))
    }

    fn send(&self, request: Request) -> bool {
        self.sender.send(request).is_ok()
    }
}
