use fnv::FnvHasher;
use rand::Rng;
use std::{
    collections::{HashMap, HashSet},
    hash::{BuildHasherDefault, Hash}
};

pub type FnvHashSet<T> = HashSet<T, BuildHasherDefault<FnvHasher>>;
pub type FnvHashMap<K, V> = HashMap<K, V, BuildHasherDefault<FnvHasher>>;

/// Construct a hash set with the specified capacity. The hashing algorithm is much faster than the default
/// on short keys such as integers and small strings.
/// On large keys it is actually slower.
/// Note it is less robust against security attacks on key collisions.
pub fn fnv_hashset<T: Hash + Eq>(capacity: usize) -> FnvHashSet<T> {
    let fnv = BuildHasherDefault::<FnvHasher>::default();
    HashSet::<T, _>::with_capacity_and_hasher(capacity, fnv)
}

/// Construct a hash map with the specified capacity. The hashing algorithm is much faster than the default
/// on short keys such as integers and small strings.
/// On large keys it is actually slower.
/// Note it is less robust against security attacks on key collisions.
pub fn fnv_hashmap<K: Hash + Eq, V>(capacity: usize) -> FnvHashMap<K, V> {
    let fnv = BuildHasherDefault::<FnvHasher>::default();
    HashMap::<K, V, _>::with_capacity_and_hasher(capacity, fnv)
}

/// A set supporting O(1) insert, remove and uniform random choice.
///
/// Items live in a vector with an index from item to slot. Removal moves the last item into
/// the vacated slot, so the iteration order is insertion order only until the first removal.
#[derive(Debug, Clone)]
pub struct Bag<T: Hash + Eq + Copy> {
    items: Vec<T>,
    slots: FnvHashMap<T, usize>,
}

impl<T: Hash + Eq + Copy> Bag<T> {
    pub fn with_capacity(capacity: usize) -> Bag<T> {
        Bag {
            items: Vec::with_capacity(capacity),
            slots: fnv_hashmap(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn contains(&self, item: &T) -> bool {
        self.slots.contains_key(item)
    }

    /// Returns false if the item was already present.
    pub fn insert(&mut self, item: T) -> bool {
        if self.slots.contains_key(&item) {
            return false;
        }
        self.slots.insert(item, self.items.len());
        self.items.push(item);
        true
    }

    /// Returns false if the item was not present.
    pub fn remove(&mut self, item: &T) -> bool {
        match self.slots.remove(item) {
            Some(slot) => {
                let _ = self.items.swap_remove(slot);
                if let Some(moved) = self.items.get(slot) {
                    self.slots.insert(*moved, slot);
                }
                true
            }
            None => false,
        }
    }

    /// A uniformly chosen item, or `None` when empty.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<T> {
        if self.items.is_empty() {
            None
        } else {
            Some(self.items[rng.gen_range(0..self.items.len())])
        }
    }

    #[cfg(test)]
    pub fn iter(&self) -> ::std::slice::Iter<T> {
        self.items.iter()
    }
}
