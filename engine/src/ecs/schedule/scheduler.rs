use log::{debug, trace};

use crate::{
    core::time::is_valid_delta,
    ecs::{
        system::{self, Context, System},
        world::World,
    },
};

struct Entry {
    id: system::Id,
    system: System,
}

/// An ordered list of systems run sequentially each tick.
///
/// Systems are kept sorted by priority, lowest first. The sort is stable, so systems sharing a
/// priority run in registration order.
#[derive(Default)]
pub struct Scheduler {
    entries: Vec<Entry>,
    next_id: u32,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a system and re-sort by priority.
    pub fn register(&mut self, system: System) -> system::Id {
        let id = system::Id::new(self.next_id);
        self.next_id += 1;
        debug!(
            "Registered system '{}' with priority {}",
            system.name(),
            system.priority()
        );
        self.entries.push(Entry { id, system });
        self.entries.sort_by_key(|entry| entry.system.priority());
        id
    }

    /// Remove a system by id.
    pub fn unregister(&mut self, id: system::Id) -> Option<System> {
        let position = self.entries.iter().position(|entry| entry.id == id)?;
        Some(self.entries.remove(position).system)
    }

    /// Run every system once, in order, then apply the structural changes they deferred.
    ///
    /// Each system's query is computed immediately before it runs, so in-place component writes
    /// from earlier systems are visible to later ones while entity creation and destruction only
    /// land after the last system. Returns the number of systems invoked; a zero, negative or
    /// non-finite delta skips the tick entirely.
    pub fn tick(&mut self, world: &mut World, delta: f64) -> usize {
        if !is_valid_delta(delta) {
            debug!("Skipping tick with invalid delta {delta}");
            return 0;
        }

        for entry in self.entries.iter_mut() {
            let spec = entry.system.spec(world.components());
            let matched = world.query(&spec, entry.system.tags());
            trace!(
                "Running system '{}' over {} entities",
                entry.system.name(),
                matched.len()
            );
            let mut ctx = Context::new(world, delta);
            entry.system.run(&mut ctx, &matched);
        }

        let applied = world.flush();
        if applied > 0 {
            trace!("Applied {applied} deferred commands");
        }
        self.entries.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// System names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.system.name()).collect()
    }

    /// System ids in execution order.
    pub fn ids(&self) -> Vec<system::Id> {
        self.entries.iter().map(|entry| entry.id).collect()
    }
}
