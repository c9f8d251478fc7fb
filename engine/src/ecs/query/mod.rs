//! Query engine: selects the live entities holding every component kind of a [`Spec`].
//!
//! A query starts from the registry's live set and intersects it with the membership bit set of
//! each requested component table, then with the index of each requested tag. Matching is strict
//! AND semantics: an entity missing any requested kind or tag is excluded. The surviving slots are
//! resolved to entities and ordered by creation sequence, so for a fixed creation order every
//! query, and therefore every tick, visits entities in the same order.
//!
//! Queries are recomputed on demand rather than cached as persistent indices. Callers that query
//! often keep a [`Query`] (a resolved spec plus tags) and re-run it each tick:
//!
//! ```rust,ignore
//! use cadence_engine::ecs::{query::Query, World};
//!
//! let query = Query::new::<(Position, Velocity)>(world.components(), ["player"]);
//! for entity in &query.run(&world) {
//!     // ...
//! }
//! ```

mod result;

use fixedbitset::FixedBitSet;

pub use result::Result;

use crate::ecs::{
    component::{self, IntoSpec, Spec},
    entity::{self, Tag},
    storage::Storage,
    world::World,
};

/// A reusable query: the resolved component spec and required tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    spec: Spec,
    tags: Vec<Tag>,
}

impl Query {
    /// Resolve the spec for `S`, registering any kinds not yet known.
    pub fn new<S: IntoSpec>(
        registry: &component::Registry,
        tags: impl IntoIterator<Item = impl Into<Tag>>,
    ) -> Self {
        Self {
            spec: registry.spec::<S>(),
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// Construct a query from an already resolved spec.
    pub fn from_spec(spec: Spec, tags: Vec<Tag>) -> Self {
        Self { spec, tags }
    }

    #[inline]
    pub fn spec(&self) -> &Spec {
        &self.spec
    }

    #[inline]
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Evaluate the query against the world's current state.
    pub fn run(&self, world: &World) -> Result {
        world.query(&self.spec, &self.tags)
    }
}

/// Evaluate a spec and tag filter against the entity registry and component storage.
///
/// An empty spec with no tags matches nothing. An empty spec with tags matches every live entity
/// carrying all of the tags.
pub(crate) fn evaluate(
    spec: &Spec,
    tags: &[Tag],
    entities: &entity::Registry,
    storage: &Storage,
) -> Result {
    if spec.is_empty() && tags.is_empty() {
        return Result::empty(spec.clone());
    }

    let mut matched: FixedBitSet = entities.alive().clone();
    for id in spec.ids() {
        match storage.members(*id) {
            Some(members) => matched.intersect_with(members),
            None => return Result::empty(spec.clone()),
        }
    }
    for tag in tags {
        match entities.tagged(tag) {
            Some(members) => matched.intersect_with(members),
            None => return Result::empty(spec.clone()),
        }
    }

    let mut found: Vec<_> = matched
        .ones()
        .filter_map(|index| entities.at(index))
        .collect();
    found.sort_unstable_by_key(|(_, sequence)| *sequence);

    Result::new(
        spec.clone(),
        found.into_iter().map(|(entity, _)| entity).collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{Component, World, entity::UNTAGGED};

    #[derive(Debug)]
    struct Position;
    impl Component for Position {}

    #[derive(Debug)]
    struct Velocity;
    impl Component for Velocity {}

    #[derive(Debug)]
    struct Sprite;
    impl Component for Sprite {}

    #[test]
    fn and_semantics() {
        // Given
        let mut world = World::default();
        let a = world.create_entity(UNTAGGED);
        let b = world.create_entity(UNTAGGED);
        let c = world.create_entity(UNTAGGED);
        world.add_component(a, Position);
        world.add_component(a, Velocity);
        world.add_component(b, Position);
        world.add_component(c, Velocity);

        // When
        let result = world.query_of::<(Position, Velocity)>(&[]);

        // Then
        assert_eq!(result.entities(), &[a]);

        // When - Removing a required component drops the entity from the next query
        world.remove_component::<Velocity>(a);

        // Then
        assert!(world.query_of::<(Position, Velocity)>(&[]).is_empty());
        assert_eq!(world.query_of::<Position>(&[]).entities(), &[a, b]);
    }

    #[test]
    fn unknown_kind_matches_nothing() {
        // Given
        let mut world = World::default();
        let a = world.create_entity(UNTAGGED);
        world.add_component(a, Position);

        // When
        let result = world.query_of::<(Position, Sprite)>(&[]);

        // Then
        assert!(result.is_empty());
    }

    #[test]
    fn empty_spec_and_tags() {
        // Given
        let mut world = World::default();
        let player = world.create_entity(["player"]);
        let enemy = world.create_entity(["enemy", "flying"]);
        let both = world.create_entity(["player", "flying"]);
        world.add_component(player, Position);

        // Then - No requirements at all yields nothing
        assert!(world.query_of::<()>(&[]).is_empty());

        // Then - Tags alone select tagged entities
        assert_eq!(
            world.query_of::<()>(&[Tag::new("player")]).entities(),
            &[player, both]
        );
        assert_eq!(
            world
                .query_of::<()>(&[Tag::new("flying"), Tag::new("enemy")])
                .entities(),
            &[enemy]
        );
        assert!(world.query_of::<()>(&[Tag::new("missing")]).is_empty());

        // Then - Components and tags combine
        assert_eq!(
            world.query_of::<Position>(&[Tag::new("player")]).entities(),
            &[player]
        );
    }

    #[test]
    fn creation_order_survives_slot_reuse() {
        // Given
        let mut world = World::default();
        let a = world.create_entity(UNTAGGED);
        let b = world.create_entity(UNTAGGED);
        world.destroy_entity(a);
        let c = world.create_entity(UNTAGGED);
        for e in [c, b] {
            world.add_component(e, Position);
        }

        // When
        let result = world.query_of::<Position>(&[]);

        // Then - c reuses a's lower slot but was created after b
        assert_eq!(c.index(), a.index());
        assert_eq!(result.entities(), &[b, c]);
    }

    #[test]
    fn cached_query_reruns() {
        // Given
        let mut world = World::default();
        let query = Query::new::<Position>(world.components(), ["player"]);
        let a = world.create_entity(["player"]);

        // Then
        assert!(query.run(&world).is_empty());

        // When
        world.add_component(a, Position);

        // Then
        assert_eq!(query.run(&world).entities(), &[a]);
        assert_eq!(query.tags(), &[Tag::new("player")]);
        assert_eq!(query.spec().len(), 1);
    }
}
