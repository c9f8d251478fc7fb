use crate::ecs::{
    component::Component,
    entity::{Entity, Tag},
    system::command::Command,
    world::World,
};

/// A system's view of the world for one invocation.
///
/// Reads and in-place component writes take effect immediately. Structural changes (spawning,
/// destroying, adding or removing components and tags) are queued and applied when the tick ends,
/// so the query result a system was handed stays valid for its whole invocation.
pub struct Context<'w> {
    world: &'w mut World,
    delta: f64,
}

impl<'w> Context<'w> {
    pub(crate) fn new(world: &'w mut World, delta: f64) -> Self {
        Self { world, delta }
    }

    /// Seconds elapsed for this tick.
    #[inline]
    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Read-only access to the whole world, e.g. for secondary queries.
    #[inline]
    pub fn world(&self) -> &World {
        self.world
    }

    #[inline]
    pub fn get<C: Component>(&self, entity: Entity) -> Option<&C> {
        self.world.get_component(entity)
    }

    #[inline]
    pub fn get_mut<C: Component>(&mut self, entity: Entity) -> Option<&mut C> {
        self.world.get_component_mut(entity)
    }

    #[inline]
    pub fn has<C: Component>(&self, entity: Entity) -> bool {
        self.world.has_component::<C>(entity)
    }

    #[inline]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.world.is_alive(entity)
    }

    #[inline]
    pub fn tags(&self, entity: Entity) -> &[Tag] {
        self.world.tags(entity)
    }

    /// Reserve an entity that becomes live at the end of the tick.
    ///
    /// The handle can be used right away to queue components for it.
    pub fn spawn(&mut self, tags: impl IntoIterator<Item = impl Into<Tag>>) -> Entity {
        let entity = self.world.reserve_entity();
        self.push(Command::Spawn {
            entity,
            tags: tags.into_iter().map(Into::into).collect(),
        });
        entity
    }

    pub fn destroy(&mut self, entity: Entity) {
        self.push(Command::Destroy { entity });
    }

    /// Queue adding (or overwriting) a component.
    pub fn insert<C: Component>(&mut self, entity: Entity, value: C) {
        self.push(Command::insert(entity, value));
    }

    pub fn remove<C: Component>(&mut self, entity: Entity) {
        self.push(Command::remove::<C>(entity));
    }

    pub fn add_tag(&mut self, entity: Entity, tag: impl Into<Tag>) {
        self.push(Command::AddTag {
            entity,
            tag: tag.into(),
        });
    }

    pub fn remove_tag(&mut self, entity: Entity, tag: impl Into<Tag>) {
        self.push(Command::RemoveTag {
            entity,
            tag: tag.into(),
        });
    }

    fn push(&self, command: Command) {
        self.world.commands().push(command);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::entity::UNTAGGED;

    #[derive(Debug, PartialEq)]
    struct Position(i32);
    impl Component for Position {}

    #[test]
    fn writes_are_immediate() {
        // Given
        let mut world = World::default();
        let entity = world.create_entity(UNTAGGED);
        world.add_component(entity, Position(0));

        // When
        {
            let mut ctx = Context::new(&mut world, 0.5);
            ctx.get_mut::<Position>(entity).unwrap().0 += 3;
            assert_eq!(ctx.get::<Position>(entity), Some(&Position(3)));
            assert_eq!(ctx.delta(), 0.5);
        }

        // Then
        assert_eq!(world.get_component::<Position>(entity), Some(&Position(3)));
    }

    #[test]
    fn structural_changes_wait_for_flush() {
        // Given
        let mut world = World::default();
        let existing = world.create_entity(UNTAGGED);

        // When
        let spawned = {
            let mut ctx = Context::new(&mut world, 0.1);
            let spawned = ctx.spawn(["bullet"]);
            ctx.insert(spawned, Position(9));
            ctx.destroy(existing);
            ctx.add_tag(spawned, "fast");

            // Then - Nothing visible yet
            assert!(!ctx.is_alive(spawned));
            assert!(ctx.is_alive(existing));
            assert!(!ctx.has::<Position>(spawned));
            spawned
        };

        // When
        let applied = world.flush();

        // Then
        assert_eq!(applied, 4);
        assert!(world.is_alive(spawned));
        assert!(!world.is_alive(existing));
        assert_eq!(world.get_component::<Position>(spawned), Some(&Position(9)));
        assert_eq!(world.tags(spawned), &[Tag::new("bullet"), Tag::new("fast")]);
    }
}
