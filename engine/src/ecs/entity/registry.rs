use std::collections::HashMap;

use fixedbitset::FixedBitSet;

use crate::ecs::entity::{Entity, Tag};

/// Bookkeeping for one live entity.
#[derive(Debug)]
struct Slot {
    entity: Entity,
    /// Monotonic creation number; query results are ordered by it.
    sequence: u64,
    tags: Vec<Tag>,
}

/// The set of live entities, their creation order, and their tags.
///
/// Slots are indexed by entity slot index. Membership and tag indices are bit sets over the same
/// index space so the query engine can intersect them directly with component tables.
#[derive(Debug, Default)]
pub struct Registry {
    slots: Vec<Option<Slot>>,
    alive: FixedBitSet,
    tagged: HashMap<Tag, FixedBitSet>,
    next_sequence: u64,
    len: usize,
}

/// Set a bit, growing the set when needed.
fn set_bit(bits: &mut FixedBitSet, index: usize) {
    if index >= bits.len() {
        bits.grow(index + 1);
    }
    bits.insert(index);
}

/// Clear a bit if it is within the set.
fn clear_bit(bits: &mut FixedBitSet, index: usize) {
    if index < bits.len() {
        bits.set(index, false);
    }
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an entity live with the given tags. Returns false if its slot is already occupied.
    pub fn insert(&mut self, entity: Entity, tags: Vec<Tag>) -> bool {
        let index = entity.index();
        if index >= self.slots.len() {
            self.slots.resize_with(index + 1, || None);
        }
        if self.slots[index].is_some() {
            return false;
        }

        let mut unique: Vec<Tag> = Vec::with_capacity(tags.len());
        for tag in tags {
            if !unique.contains(&tag) {
                set_bit(self.tagged.entry(tag.clone()).or_default(), index);
                unique.push(tag);
            }
        }

        self.slots[index] = Some(Slot {
            entity,
            sequence: self.next_sequence,
            tags: unique,
        });
        self.next_sequence += 1;
        set_bit(&mut self.alive, index);
        self.len += 1;
        true
    }

    /// Retire an entity, dropping it from the live set and every tag index. Returns false if the
    /// entity was not live.
    pub fn remove(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        let index = entity.index();
        let Some(slot) = self.slots[index].take() else {
            return false;
        };
        for tag in &slot.tags {
            if let Some(bits) = self.tagged.get_mut(tag) {
                clear_bit(bits, index);
            }
        }
        clear_bit(&mut self.alive, index);
        self.len -= 1;
        true
    }

    /// Returns true if this exact entity (slot and generation) is live.
    #[inline]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.slot(entity).is_some()
    }

    /// The tags of a live entity. Retired entities have none.
    pub fn tags(&self, entity: Entity) -> &[Tag] {
        self.slot(entity).map(|slot| slot.tags.as_slice()).unwrap_or_default()
    }

    /// Returns true if the live entity carries the tag.
    pub fn has_tag(&self, entity: Entity, tag: &Tag) -> bool {
        self.tags(entity).contains(tag)
    }

    /// Attach a tag to a live entity. Returns false if the entity is retired or already tagged.
    pub fn add_tag(&mut self, entity: Entity, tag: Tag) -> bool {
        let index = entity.index();
        let Some(slot) = self.slot_mut(entity) else {
            return false;
        };
        if slot.tags.contains(&tag) {
            return false;
        }
        slot.tags.push(tag.clone());
        set_bit(self.tagged.entry(tag).or_default(), index);
        true
    }

    /// Detach a tag from a live entity. Returns false if the entity is retired or untagged.
    pub fn remove_tag(&mut self, entity: Entity, tag: &Tag) -> bool {
        let index = entity.index();
        let Some(slot) = self.slot_mut(entity) else {
            return false;
        };
        let Some(position) = slot.tags.iter().position(|t| t == tag) else {
            return false;
        };
        slot.tags.remove(position);
        if let Some(bits) = self.tagged.get_mut(tag) {
            clear_bit(bits, index);
        }
        true
    }

    /// Bit set of live slot indices.
    #[inline]
    pub fn alive(&self) -> &FixedBitSet {
        &self.alive
    }

    /// Bit set of slot indices carrying the tag, if the tag was ever used.
    #[inline]
    pub fn tagged(&self, tag: &Tag) -> Option<&FixedBitSet> {
        self.tagged.get(tag)
    }

    /// The live entity in a slot, with its creation sequence number.
    #[inline]
    pub fn at(&self, index: usize) -> Option<(Entity, u64)> {
        self.slots
            .get(index)
            .and_then(Option::as_ref)
            .map(|slot| (slot.entity, slot.sequence))
    }

    /// Number of live entities.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if there are no live entities.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// All live entities in creation order.
    pub fn entities(&self) -> Vec<Entity> {
        let mut live: Vec<_> = self.alive.ones().filter_map(|index| self.at(index)).collect();
        live.sort_unstable_by_key(|(_, sequence)| *sequence);
        live.into_iter().map(|(entity, _)| entity).collect()
    }

    fn slot(&self, entity: Entity) -> Option<&Slot> {
        self.slots
            .get(entity.index())
            .and_then(Option::as_ref)
            .filter(|slot| slot.entity == entity)
    }

    fn slot_mut(&mut self, entity: Entity) -> Option<&mut Slot> {
        self.slots
            .get_mut(entity.index())
            .and_then(Option::as_mut)
            .filter(|slot| slot.entity == entity)
    }
}
