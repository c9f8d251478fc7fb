use crate::ecs::{component::Spec, entity::Entity};

/// An owned snapshot of the entities matching a query, in creation order.
///
/// Every entity in the result held every requested component kind when the query ran. The
/// snapshot is not affected by structural changes made afterwards; entities destroyed later in
/// the same tick remain listed, and component lookups for them return `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Result {
    spec: Spec,
    entities: Vec<Entity>,
}

impl Result {
    pub(crate) fn new(spec: Spec, entities: Vec<Entity>) -> Self {
        Self { spec, entities }
    }

    /// A result with no entities.
    pub fn empty(spec: Spec) -> Self {
        Self {
            spec,
            entities: Vec::new(),
        }
    }

    /// The component spec this result was computed for.
    #[inline]
    pub fn spec(&self) -> &Spec {
        &self.spec
    }

    #[inline]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    #[inline]
    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, Entity>> {
        self.entities.iter().copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Returns true if the entity matched. Linear in the result size.
    pub fn contains(&self, entity: Entity) -> bool {
        self.entities.contains(&entity)
    }

    /// The earliest created matching entity.
    #[inline]
    pub fn first(&self) -> Option<Entity> {
        self.entities.first().copied()
    }
}

impl<'a> IntoIterator for &'a Result {
    type Item = Entity;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, Entity>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for Result {
    type Item = Entity;
    type IntoIter = std::vec::IntoIter<Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.into_iter()
    }
}
