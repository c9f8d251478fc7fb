use crate::{
    all_tuples,
    ecs::component::{Component, Id, Registry},
};

/// A component signature: the set of component kinds a query or system requires.
///
/// Ids are kept sorted and de-duplicated, so two specs naming the same kinds in a different
/// order compare and hash equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Spec {
    ids: Vec<Id>,
}

impl Spec {
    /// The signature that requires nothing.
    pub const EMPTY: Self = Spec { ids: Vec::new() };

    pub fn new(ids: impl Into<Vec<Id>>) -> Self {
        let mut ids = ids.into();
        ids.sort_unstable();
        ids.dedup();
        ids.shrink_to_fit();
        Self { ids }
    }

    /// Component ids, ascending.
    #[inline]
    pub fn ids(&self) -> &[Id] {
        &self.ids
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = Id> + '_ {
        self.ids.iter().copied()
    }

    #[inline]
    pub fn contains(&self, id: Id) -> bool {
        self.ids.binary_search(&id).is_ok()
    }

    /// True when every kind of `other` is also required here.
    pub fn contains_all(&self, other: &Spec) -> bool {
        other.len() <= self.len() && other.iter().all(|id| self.contains(id))
    }

    /// Kinds required by either signature.
    pub fn union(&self, other: &Spec) -> Self {
        self.iter().chain(other.iter()).collect()
    }

    /// Kinds required here but not by `other`.
    pub fn difference(&self, other: &Spec) -> Self {
        Self {
            ids: self.iter().filter(|id| !other.contains(*id)).collect(),
        }
    }

    /// Kinds required by both signatures.
    pub fn intersection(&self, other: &Spec) -> Self {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        Self {
            ids: small.iter().filter(|id| large.contains(*id)).collect(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }
}

impl From<Vec<Id>> for Spec {
    fn from(value: Vec<Id>) -> Self {
        Spec::new(value)
    }
}

impl FromIterator<Id> for Spec {
    fn from_iter<I: IntoIterator<Item = Id>>(iter: I) -> Self {
        Spec::new(iter.into_iter().collect::<Vec<_>>())
    }
}

/// Trait for converting a type into a component [`Spec`].
///
/// Implemented for `()` (no requirements), any [`Component`], and tuples of up to 26 of
/// either, so `(Position, Velocity)` names a two-kind signature.
pub trait IntoSpec {
    /// Convert the type into a spec, registering any kinds not yet known to the registry.
    fn into_spec(registry: &Registry) -> Spec;
}

impl IntoSpec for () {
    fn into_spec(_registry: &Registry) -> Spec {
        Spec::EMPTY
    }
}

impl<C: Component> IntoSpec for C {
    fn into_spec(registry: &Registry) -> Spec {
        Spec::new([registry.register::<C>()])
    }
}

macro_rules! tuple_spec {
    ($($name: ident),*) => {
        impl<$($name: IntoSpec),*> IntoSpec for ($($name,)*) {
            fn into_spec(registry: &Registry) -> Spec {
                let mut spec = Spec::EMPTY;
                $(
                    spec = spec.union(&<$name>::into_spec(registry));
                )*
                spec
            }
        }
    }
}

all_tuples!(tuple_spec);

#[cfg(test)]
mod tests {
    use std::hash::{DefaultHasher, Hash, Hasher};

    use cadence_macros::Component;

    use super::*;

    #[derive(Component)]
    struct Position;
    #[derive(Component)]
    struct Velocity;
    #[derive(Component)]
    struct Sprite;
    #[derive(Component)]
    struct Health;

    fn hash_of(spec: &Spec) -> u64 {
        let mut hasher = DefaultHasher::new();
        spec.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn same_kinds_in_any_order_are_one_signature() {
        // Given
        let registry = Registry::new();
        let pos = registry.register::<Position>();
        let vel = registry.register::<Velocity>();
        let sprite = registry.register::<Sprite>();

        // When
        let a = Spec::new(vec![vel, pos, sprite, vel]);
        let b: Spec = [sprite, vel, pos].into_iter().collect();

        // Then
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_eq!(a.ids(), &[pos, vel, sprite]);
    }

    #[test]
    fn tuple_signature_registers_each_kind_once() {
        // Given
        let registry = Registry::new();

        // When
        let spec = registry.spec::<(Sprite, Position, Sprite)>();

        // Then
        assert_eq!(registry.len(), 2);
        assert_eq!(spec.len(), 2);
        assert!(spec.contains(registry.register::<Position>()));
        assert!(spec.contains(registry.register::<Sprite>()));
    }

    #[test]
    fn nested_tuples_flatten() {
        // Given
        let registry = Registry::new();

        // When
        let nested = registry.spec::<((Position, Velocity), (Health,))>();
        let flat = registry.spec::<(Health, Velocity, Position)>();

        // Then
        assert_eq!(nested, flat);
    }

    #[test]
    fn unit_requires_nothing() {
        let registry = Registry::new();

        assert_eq!(registry.spec::<()>(), Spec::EMPTY);
        assert!(Spec::EMPTY.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn superset_check() {
        // Given
        let registry = Registry::new();
        let movable = registry.spec::<(Position, Velocity)>();
        let drawable_mover = registry.spec::<(Position, Velocity, Sprite)>();
        let living = registry.spec::<(Position, Health)>();

        // Then
        assert!(drawable_mover.contains_all(&movable));
        assert!(movable.contains_all(&movable));
        assert!(movable.contains_all(&Spec::EMPTY));
        assert!(!movable.contains_all(&drawable_mover));
        assert!(!drawable_mover.contains_all(&living));
    }

    #[test]
    fn set_operations_leave_operands_untouched() {
        // Given
        let registry = Registry::new();
        let left = registry.spec::<(Position, Velocity, Sprite)>();
        let right = registry.spec::<(Velocity, Sprite, Health)>();

        // When
        let union = left.union(&right);
        let difference = left.difference(&right);
        let intersection = left.intersection(&right);

        // Then
        assert_eq!(union, registry.spec::<(Position, Velocity, Sprite, Health)>());
        assert_eq!(difference, registry.spec::<Position>());
        assert_eq!(intersection, registry.spec::<(Velocity, Sprite)>());
        assert_eq!(left.len(), 3);
        assert_eq!(right.len(), 3);
    }
}
