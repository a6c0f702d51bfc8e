use std::collections::BTreeMap;

use crate::{handles::ResourceHandle, resource::Resource};

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Ordered `id -> resource` storage for one resource kind.
///
/// Removal leaves a tombstone behind: the key stays so the pool-counted kinds
/// never hand the same id out twice. When a driver reuses an object name the
/// slot generation is bumped, so handles to the previous occupant stay dead.
#[derive(Debug, Clone)]
pub struct Pool<T: Resource> {
    slots: BTreeMap<u32, Slot<T>>,
}

impl<T: Resource> Pool<T> {
    pub fn new() -> Self {
        Self {
            slots: BTreeMap::new(),
        }
    }

    /// Next pool-assigned id: one past the largest key ever inserted.
    pub fn next_id(&self) -> u32 {
        self.slots.keys().next_back().map_or(1, |id| id + 1)
    }

    /// Whether a live resource sits at `id`.
    pub fn contains_id(&self, id: u32) -> bool {
        id != 0
            && self
                .slots
                .get(&id)
                .is_some_and(|slot| slot.value.is_some())
    }

    /// Handle for the live resource at `id`, if any.
    pub fn handle_for(&self, id: u32) -> Option<T::Handle> {
        let slot = self.slots.get(&id)?;
        slot.value
            .as_ref()
            .map(|_| T::Handle::from_parts(id, slot.generation))
    }

    /// Handle for `value` if that very value is live in this pool: its id and
    /// generation both have to match the slot. A detached copy, or a copy of
    /// a previous occupant of the same id, yields `None`.
    pub fn handle_of(&self, value: &T) -> Option<T::Handle> {
        if !value.is_registered() {
            return None;
        }
        self.handle_for(value.id())
            .filter(|handle| handle.generation() == value.generation())
    }

    /// Stores `value` under `id`, stamping id and generation onto it.
    pub fn insert(&mut self, id: u32, mut value: T) -> T::Handle {
        debug_assert!(id != 0, "id 0 is reserved for detached resources");

        let slot = self.slots.entry(id).or_insert(Slot {
            generation: 0,
            value: None,
        });
        slot.generation += 1;
        value.set_id(id);
        value.set_generation(slot.generation);
        slot.value = Some(value);

        T::Handle::from_parts(id, slot.generation)
    }

    pub fn get(&self, handle: T::Handle) -> Option<&T> {
        self.slots
            .get(&handle.id())
            .filter(|slot| slot.generation == handle.generation())
            .and_then(|slot| slot.value.as_ref())
    }

    pub fn get_mut(&mut self, handle: T::Handle) -> Option<&mut T> {
        self.slots
            .get_mut(&handle.id())
            .filter(|slot| slot.generation == handle.generation())
            .and_then(|slot| slot.value.as_mut())
    }

    /// Tombstones the slot and hands the resource back detached.
    pub fn release(&mut self, handle: T::Handle) -> Option<T> {
        let slot = self
            .slots
            .get_mut(&handle.id())
            .filter(|slot| slot.generation == handle.generation())?;

        let mut value = slot.value.take()?;
        detach(&mut value);
        Some(value)
    }

    /// Live resources in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (T::Handle, &T)> {
        self.slots.iter().filter_map(|(id, slot)| {
            slot.value
                .as_ref()
                .map(|value| (T::Handle::from_parts(*id, slot.generation), value))
        })
    }

    /// Empties the pool, tombstones included, returning live resources with
    /// the id they were registered under, in descending id order.
    pub fn drain_rev(&mut self) -> Vec<(u32, T)> {
        let slots = std::mem::take(&mut self.slots);
        slots
            .into_iter()
            .rev()
            .filter_map(|(id, slot)| slot.value.map(|value| (id, value)))
            .map(|(id, mut value)| {
                detach(&mut value);
                (id, value)
            })
            .collect()
    }

    /// Number of live resources.
    pub fn len(&self) -> usize {
        self.slots
            .values()
            .filter(|slot| slot.value.is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of keys, tombstones included.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }
}

fn detach<T: Resource>(value: &mut T) {
    value.set_id(0);
    value.set_generation(0);
}

impl<T: Resource> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
