use std::{
    any::{TypeId, type_name},
    sync::{
        PoisonError, RwLock,
        atomic::{AtomicU32, Ordering},
    },
};

use dashmap::DashMap;

use crate::ecs::component::{Component, Id, IntoSpec, Spec};

/// Maps Rust component types to the dense kind [`Id`]s of one world.
///
/// Lookups hit a `DashMap` shard and never take a global lock. The name list is only written
/// the first time a type is seen.
pub struct Registry {
    ids: DashMap<TypeId, Id>,
    names: RwLock<Vec<&'static str>>,
    next: AtomicU32,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            ids: DashMap::new(),
            names: RwLock::new(Vec::new()),
            next: AtomicU32::new(0),
        }
    }

    /// Kind id of `C`, minting one on first use.
    pub fn register<C: Component>(&self) -> Id {
        if let Some(id) = self.get::<C>() {
            return id;
        }
        // Racing first registrations resolve through the shard lock of `entry`.
        *self
            .ids
            .entry(TypeId::of::<C>())
            .or_insert_with(|| self.mint(type_name::<C>()))
    }

    fn mint(&self, name: &'static str) -> Id {
        let id = Id(self.next.fetch_add(1, Ordering::Relaxed));
        let mut names = self.names.write().unwrap_or_else(PoisonError::into_inner);
        if names.len() <= id.index() {
            names.resize(id.index() + 1, "");
        }
        names[id.index()] = name;
        id
    }

    /// Kind id of `C` if it was registered. Never registers.
    #[inline]
    pub fn get<C: Component>(&self) -> Option<Id> {
        self.ids.get(&TypeId::of::<C>()).map(|entry| *entry)
    }

    /// Type name of a registered kind, for diagnostics.
    pub fn name(&self, id: Id) -> Option<&'static str> {
        let names = self.names.read().unwrap_or_else(PoisonError::into_inner);
        names.get(id.index()).copied().filter(|name| !name.is_empty())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Resolve the signature named by `S`, registering any kinds it mentions.
    #[inline]
    pub fn spec<S: IntoSpec>(&self) -> Spec {
        S::into_spec(self)
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use cadence_macros::Component;

    use super::*;

    #[derive(Component)]
    struct Position;
    #[derive(Component)]
    struct Velocity;
    #[derive(Component)]
    struct Health;

    #[test]
    fn ids_are_dense_and_stable() {
        // Given
        let registry = Registry::new();

        // When
        let pos = registry.register::<Position>();
        let vel = registry.register::<Velocity>();

        // Then
        assert_eq!((pos.index(), vel.index()), (0, 1));
        assert_eq!(registry.register::<Position>(), pos);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn get_never_registers() {
        // Given
        let registry = Registry::new();
        let health = registry.register::<Health>();

        // Then
        assert_eq!(registry.get::<Health>(), Some(health));
        assert_eq!(registry.get::<Velocity>(), None);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn names_are_kept_for_diagnostics() {
        // Given
        let registry = Registry::new();

        // When
        let health = registry.register::<Health>();

        // Then
        assert!(registry.name(health).is_some_and(|name| name.ends_with("Health")));
        assert_eq!(registry.name(Id::new(9)), None);
    }

    #[test]
    fn registries_are_independent() {
        // Given
        let first = Registry::new();
        let second = Registry::new();

        // When
        first.register::<Position>();
        let vel_in_first = first.register::<Velocity>();
        let vel_in_second = second.register::<Velocity>();

        // Then
        assert_eq!(vel_in_first.index(), 1);
        assert_eq!(vel_in_second.index(), 0);
    }

    #[test]
    fn racing_threads_agree_on_ids() {
        // Given
        let registry = Arc::new(Registry::new());

        // When
        let handles: Vec<_> = (0..12)
            .map(|i| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || match i % 3 {
                    0 => registry.register::<Position>(),
                    1 => registry.register::<Velocity>(),
                    _ => registry.register::<Health>(),
                })
            })
            .collect();
        let ids: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        // Then
        for (i, id) in ids.iter().enumerate() {
            assert_eq!(*id, ids[i % 3]);
        }
        assert_eq!(registry.len(), 3);
        let mut distinct: Vec<_> = ids[..3].iter().map(Id::index).collect();
        distinct.sort_unstable();
        assert_eq!(distinct, vec![0, 1, 2]);
    }
}
