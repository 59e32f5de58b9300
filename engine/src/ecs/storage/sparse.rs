//! Dense (sparse-set) storage of a single value type.
//!
//! Values live contiguously in a `Vec` in insertion/compaction order. A sparse [`Index`] maps
//! each owner-assigned id to the value's [`Position`], and a parallel vec maps positions back
//! to ids:
//!
//! ```text
//!  index (id -> position)        values              ids (position -> id)
//!  ┌─────┬─────┐                 ┌──────────┐        ┌─────┐
//!  │ #7  │  0  │ ──────────────► │ value #7 │ ◄────► │ #7  │
//!  │ #2  │  1  │ ──────────────► │ value #2 │ ◄────► │ #2  │
//!  │ #9  │  2  │ ──────────────► │ value #9 │ ◄────► │ #9  │
//!  └─────┴─────┘                 └──────────┘        └─────┘
//! ```
//!
//! Removal swaps the last value into the vacated position, so every operation is O(1) and the
//! values stay packed. The swap is a *relocation*: the moved value's position changes, and
//! [`DenseStore::remove`] reports it so owners can patch anything that remembers positions.

use crate::ecs::error::{Result, StorageError};
use crate::ecs::storage::index::{HashIndex, Index, SparseId};
use crate::ecs::storage::position::Position;

/// A value moved by a dense store mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relocation<K> {
    /// The id of the moved value.
    pub index: K,
    /// Where the value lived before the move.
    pub from: Position,
    /// Where the value lives now.
    pub to: Position,
}

/// The outcome of removing a value from a dense store.
#[derive(Debug)]
pub struct Removed<T, K> {
    /// The removed value.
    pub value: T,
    /// The position the removed value occupied.
    pub position: Position,
    /// The value swapped into `position`, if the removed value was not the last one.
    pub relocation: Option<Relocation<K>>,
}

/// Contiguous storage of `T` keyed by sparse ids.
#[derive(Debug, Clone)]
pub struct DenseStore<T, K: SparseId, X: Index<K> = HashIndex<K>> {
    /// Id to position.
    index: X,

    /// Position to id, parallel to `values`.
    ids: Vec<K>,

    /// The packed values.
    values: Vec<T>,
}

impl<T, K: SparseId, X: Index<K> + Default> Default for DenseStore<T, K, X> {
    fn default() -> Self {
        Self::with_index(X::default())
    }
}

impl<T, K: SparseId> DenseStore<T, K> {
    /// Construct an empty store backed by a [`HashIndex`].
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T, K: SparseId, X: Index<K>> DenseStore<T, K, X> {
    /// Construct an empty store using the given index.
    pub fn with_index(index: X) -> Self {
        Self {
            index,
            ids: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Append `value` under `id`.
    ///
    /// Returns the position of the new value, or `DuplicateId` if `id` is already present. The
    /// store is unchanged on error.
    pub fn insert(&mut self, id: K, value: T) -> Result<Position> {
        if self.index.contains(id) {
            return Err(StorageError::DuplicateId(id.index() as u32));
        }

        let position = Position::new(self.values.len());
        self.values.push(value);
        self.ids.push(id);
        self.index.insert(id, position);

        #[cfg(debug_assertions)]
        self.verify_position(position);

        Ok(position)
    }

    /// Get the value stored under `id`.
    #[inline]
    pub fn get(&self, id: K) -> Option<&T> {
        self.index.get(id).map(|p| &self.values[p.index()])
    }

    /// Get the mutable value stored under `id`.
    #[inline]
    pub fn get_mut(&mut self, id: K) -> Option<&mut T> {
        self.index.get(id).map(|p| &mut self.values[p.index()])
    }

    /// Get the current position of `id`.
    #[inline]
    pub fn position(&self, id: K) -> Option<Position> {
        self.index.get(id)
    }

    /// Get the id stored at `position`.
    #[inline]
    pub fn index_at(&self, position: Position) -> Option<K> {
        self.ids.get(position.index()).copied()
    }

    /// Get the value stored at `position`.
    #[inline]
    pub fn get_at(&self, position: Position) -> Option<&T> {
        self.values.get(position.index())
    }

    /// Get the mutable value stored at `position`.
    #[inline]
    pub fn get_at_mut(&mut self, position: Position) -> Option<&mut T> {
        self.values.get_mut(position.index())
    }

    /// Remove the value stored under `id` by swapping the last value into its position.
    ///
    /// Returns `None` if `id` is not present. Only the map entry of the moved value is
    /// rewritten.
    pub fn remove(&mut self, id: K) -> Option<Removed<T, K>> {
        let position = self.index.remove(id)?;
        let index = position.index();
        let last_index = self.values.len() - 1;

        let value = self.values.swap_remove(index);
        self.ids.swap_remove(index);

        let relocation = if index == last_index {
            // Removed the last value, nothing was moved
            None
        } else {
            let moved = self.ids[index];
            self.index.insert(moved, position);
            Some(Relocation {
                index: moved,
                from: Position::new(last_index),
                to: position,
            })
        };

        #[cfg(debug_assertions)]
        {
            debug_assert!(!self.index.contains(id), "removed id still indexed");
            if relocation.is_some() {
                self.verify_position(position);
            }
        }

        Some(Removed {
            value,
            position,
            relocation,
        })
    }

    /// Check whether `id` is present.
    #[inline]
    pub fn contains(&self, id: K) -> bool {
        self.index.contains(id)
    }

    /// Number of stored values.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check whether the store is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Reserve capacity for at least `additional` more values.
    #[inline]
    pub fn reserve(&mut self, additional: usize) {
        self.values.reserve(additional);
        self.ids.reserve(additional);
    }

    /// Capacity of the value vec.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.values.capacity()
    }

    /// Remove every value.
    pub fn clear(&mut self) {
        self.index.clear();
        self.ids.clear();
        self.values.clear();
    }

    /// Drain every value in dense order, leaving the store empty.
    pub fn drain(&mut self) -> impl Iterator<Item = (K, T)> + '_ {
        self.index.clear();
        self.ids.drain(..).zip(self.values.drain(..))
    }

    /// Values in dense order.
    #[inline]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Mutable values in dense order.
    #[inline]
    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.values
    }

    /// Iterate values in dense order.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.values.iter()
    }

    /// Iterate mutable values in dense order.
    #[inline]
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.values.iter_mut()
    }

    /// Iterate `(id, value)` pairs in dense order.
    #[inline]
    pub fn iter_indexed(&self) -> impl Iterator<Item = (K, &T)> {
        self.ids.iter().copied().zip(self.values.iter())
    }

    /// Iterate `(id, value)` mutable pairs in dense order.
    #[inline]
    pub fn iter_indexed_mut(&mut self) -> impl Iterator<Item = (K, &mut T)> {
        self.ids.iter().copied().zip(self.values.iter_mut())
    }

    /// Ids of all stored values, in dense order.
    #[inline]
    pub fn indices(&self) -> &[K] {
        &self.ids
    }

    /// Verify the entry at `position` agrees with the index.
    #[cfg(debug_assertions)]
    fn verify_position(&self, position: Position) {
        debug_assert_eq!(self.ids.len(), self.values.len(), "ids/values out of sync");
        let id = self.ids[position.index()];
        debug_assert_eq!(
            self.index.get(id),
            Some(position),
            "index does not point back at its position"
        );
    }
}

impl<'a, T, K: SparseId, X: Index<K>> IntoIterator for &'a DenseStore<T, K, X> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::ecs::storage::allocator::Id;
    use crate::ecs::storage::index::DynamicIndex;

    fn id(raw: u32) -> Id {
        Id::new(raw)
    }

    #[test]
    fn insert_appends_in_order() {
        // Given
        let mut store = DenseStore::<&str, Id>::new();

        // When
        let a = store.insert(id(7), "a").unwrap();
        let b = store.insert(id(2), "b").unwrap();

        // Then
        assert_eq!(a, Position::new(0));
        assert_eq!(b, Position::new(1));
        assert_eq!(store.values(), &["a", "b"]);
        assert_eq!(store.indices(), &[id(7), id(2)]);
        assert_eq!(store.get(id(2)), Some(&"b"));
        assert_eq!(store.index_at(Position::new(0)), Some(id(7)));
    }

    #[test]
    fn insert_rejects_duplicates() {
        // Given
        let mut store = DenseStore::<u32, Id>::new();
        store.insert(id(1), 10).unwrap();

        // When
        let result = store.insert(id(1), 20);

        // Then
        assert_eq!(result, Err(StorageError::DuplicateId(1)));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(id(1)), Some(&10));
    }

    #[test]
    fn remove_swaps_last_into_hole() {
        // Given
        let mut store = DenseStore::<&str, Id>::new();
        store.insert(id(1), "a").unwrap();
        store.insert(id(2), "b").unwrap();
        store.insert(id(3), "c").unwrap();

        // When
        let removed = store.remove(id(1)).unwrap();

        // Then
        assert_eq!(removed.value, "a");
        assert_eq!(removed.position, Position::new(0));
        assert_eq!(
            removed.relocation,
            Some(Relocation {
                index: id(3),
                from: Position::new(2),
                to: Position::new(0),
            })
        );
        assert_eq!(store.values(), &["c", "b"]);
        assert_eq!(store.position(id(3)), Some(Position::new(0)));
        assert!(!store.contains(id(1)));
    }

    #[test]
    fn remove_last_relocates_nothing() {
        // Given
        let mut store = DenseStore::<&str, Id>::new();
        store.insert(id(1), "a").unwrap();
        store.insert(id(2), "b").unwrap();

        // When
        let removed = store.remove(id(2)).unwrap();

        // Then
        assert!(removed.relocation.is_none());
        assert_eq!(store.values(), &["a"]);
        assert!(store.remove(id(2)).is_none());
    }

    #[test]
    fn reserve_and_clear() {
        // Given
        let mut store = DenseStore::<u64, Id>::new();

        // When
        store.reserve(64);
        store.insert(id(1), 1).unwrap();

        // Then
        assert!(store.capacity() >= 64);

        // When
        store.clear();

        // Then
        assert!(store.is_empty());
        assert!(!store.contains(id(1)));
        assert!(store.get(id(1)).is_none());
    }

    #[test]
    fn drain_empties_in_dense_order() {
        // Given
        let mut store = DenseStore::<u32, Id>::new();
        store.insert(id(4), 40).unwrap();
        store.insert(id(5), 50).unwrap();

        // When
        let drained: Vec<_> = store.drain().collect();

        // Then
        assert_eq!(drained, vec![(id(4), 40), (id(5), 50)]);
        assert!(store.is_empty());
        assert!(!store.contains(id(4)));
    }

    #[test]
    fn dynamic_index_backend() {
        // Given
        let mut store: DenseStore<u32, Id, DynamicIndex<Id>> =
            DenseStore::with_index(DynamicIndex::new_with_block_size(8));

        // When
        for raw in 1..=20 {
            store.insert(id(raw), raw * 10).unwrap();
        }
        store.remove(id(3)).unwrap();

        // Then
        assert_eq!(store.len(), 19);
        assert_eq!(store.get(id(20)), Some(&200));
        assert_eq!(store.position(id(20)), Some(Position::new(2)));
    }

    #[test]
    fn packing_survives_random_churn() {
        // Given
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut store = DenseStore::<u64, Id>::new();
        let mut expected: HashMap<Id, u64> = HashMap::new();
        let mut inserts = 0usize;
        let mut removes = 0usize;

        // When
        for step in 0..4_000u64 {
            let key = id(rng.gen_range(1..300));
            if rng.gen_bool(0.6) {
                if store.insert(key, step).is_ok() {
                    expected.insert(key, step);
                    inserts += 1;
                }
            } else if store.remove(key).is_some() {
                expected.remove(&key);
                removes += 1;
            }
        }

        // Then
        assert_eq!(store.len(), inserts - removes);
        for (key, value) in &expected {
            assert_eq!(store.get(*key), Some(value));
        }
        for (key, value) in store.iter_indexed() {
            assert_eq!(expected.get(&key), Some(value));
        }
        for (slot, key) in store.indices().iter().enumerate() {
            assert_eq!(store.position(*key), Some(Position::new(slot)));
        }
    }

    #[test]
    fn large_drain_from_the_front() {
        // Given
        let mut store = DenseStore::<u32, Id>::new();
        for raw in 1..=20_000 {
            store.insert(id(raw), raw).unwrap();
        }

        // When - every removal relocates the last value to the front
        for _ in 1..20_000 {
            let front = store.indices()[0];
            let removed = store.remove(front).unwrap();
            assert_eq!(removed.relocation.map(|r| r.to), Some(Position::new(0)));
        }

        // Then
        assert_eq!(store.indices(), &[id(2)]);
        assert_eq!(store.position(id(2)), Some(Position::new(0)));
    }
}
