use std::collections::HashMap;
use std::hash::Hash;

use crate::ecs::storage::position::Position;

/// An identifier that can be laid out in indexable storage.
pub trait SparseId: Copy + Eq + Hash {
    /// Get the index of this id for use in indexable storage (e.g. Vec).
    fn index(&self) -> usize;
}

/// Trait for defining a sparse index mapping from sparse ids to dense positions.
///
/// This trait enables efficient lookup of dense storage locations for sparsely distributed
/// identifiers. The primary use case is mapping object ids (which may have large gaps after
/// recycling) to contiguous store positions.
///
/// # Example
///
/// ```ignore
/// use storage::index::{Index, HashIndex};
///
/// let mut index = HashIndex::new();
///
/// // Map sparse ids to dense positions
/// index.insert(Id::new(1), Position::new(0));
/// index.insert(Id::new(20), Position::new(1));
///
/// assert_eq!(index.get(Id::new(20)), Some(Position::new(1)));
/// assert_eq!(index.get(Id::new(999)), None);
/// ```
pub trait Index<K: SparseId> {
    /// Insert a position for the given id.
    ///
    /// If the id already exists, the old position is replaced.
    fn insert(&mut self, id: K, position: Position);

    /// Get the position for the given id if it exists.
    fn get(&self, id: K) -> Option<Position>;

    /// Remove the position for the given id.
    ///
    /// Returns the old position if it existed, or `None` if not present.
    fn remove(&mut self, id: K) -> Option<Position>;

    /// Remove every mapping.
    fn clear(&mut self);

    /// Check if the index contains a mapping for the given id.
    #[inline]
    fn contains(&self, id: K) -> bool {
        self.get(id).is_some()
    }
}

/// A block-based sparse index optimized for small, locally dense ids.
///
/// This index divides the sparse id space into fixed-size blocks, allocating memory only for
/// blocks that contain at least one entry. Within each block, a dense vector stores mappings,
/// allowing O(1) lookup with good cache locality.
///
/// Slot allocators issue ids sequentially from 1 and recycle released ids first, so the ids of
/// a table cluster tightly and this index rarely wastes blocks.
///
/// | Operation | Time | Memory |
/// |-----------|------|--------|
/// | `insert()` | O(1) amortized | Allocates block on first use |
/// | `get()` | O(1) | No allocation |
/// | `remove()` | O(1) | No deallocation (leaves `None`) |
#[derive(Debug, Clone)]
pub struct DynamicIndex<K> {
    /// The size of blocks to allocate when growing the index.
    block_size: usize,

    /// Outer Vec is indexed by `id / block_size`, inner Vec by `id % block_size`.
    maps: Vec<Option<Vec<Option<Position>>>>,

    _marker: std::marker::PhantomData<K>,
}

impl<K: SparseId> DynamicIndex<K> {
    /// Default block size balances memory usage and access speed for typical id patterns.
    pub const DEFAULT_BLOCK_SIZE: usize = 256;

    /// Create a new DynamicIndex with the default block size.
    #[inline]
    pub const fn new() -> Self {
        Self::new_with_block_size(Self::DEFAULT_BLOCK_SIZE)
    }

    /// Create a new DynamicIndex with a custom block size.
    ///
    /// # Panics
    ///
    /// Debug builds panic if block_size is 0.
    #[inline]
    pub const fn new_with_block_size(block_size: usize) -> Self {
        debug_assert!(block_size > 0, "block_size must be greater than 0");
        Self {
            block_size,
            maps: Vec::new(),
            _marker: std::marker::PhantomData,
        }
    }

    /// Calculate block and within-block indices for an id.
    #[inline]
    fn indices(&self, id: K) -> (usize, usize) {
        let index = id.index();
        (index / self.block_size, index % self.block_size)
    }

    /// Get the number of blocks (including unallocated slots).
    #[inline]
    pub fn block_count(&self) -> usize {
        self.maps.len()
    }

    /// Get the number of blocks that have been allocated (non-None).
    pub fn allocated_block_count(&self) -> usize {
        self.maps.iter().filter(|b| b.is_some()).count()
    }
}

impl<K: SparseId> Default for DynamicIndex<K> {
    /// Custom default to ensure we get the default block size.
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: SparseId> Index<K> for DynamicIndex<K> {
    fn insert(&mut self, id: K, position: Position) {
        let (block_index, within_block_index) = self.indices(id);

        if block_index >= self.maps.len() {
            self.maps.resize_with(block_index + 1, || None);
        }

        let block_size = self.block_size;
        let block = self.maps[block_index].get_or_insert_with(|| vec![None; block_size]);
        block[within_block_index] = Some(position);
    }

    fn get(&self, id: K) -> Option<Position> {
        let (block_index, within_block_index) = self.indices(id);
        let block = self.maps.get(block_index)?.as_ref()?;
        block[within_block_index]
    }

    fn remove(&mut self, id: K) -> Option<Position> {
        let (block_index, within_block_index) = self.indices(id);
        let block = self.maps.get_mut(block_index)?.as_mut()?;
        block[within_block_index].take()
    }

    fn clear(&mut self) {
        self.maps.clear();
    }
}

/// A HashMap-based sparse index.
///
/// Simpler than [`DynamicIndex`] and indifferent to how sparse the ids are. This is the
/// default index of a dense store.
#[derive(Debug, Clone)]
pub struct HashIndex<K> {
    map: HashMap<K, Position>,
}

impl<K: SparseId> Default for HashIndex<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: SparseId> HashIndex<K> {
    /// Create a new empty HashIndex.
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Create a new HashIndex with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: HashMap::with_capacity(capacity),
        }
    }

    /// Get the number of entries in the index.
    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if the index is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<K: SparseId> Index<K> for HashIndex<K> {
    fn insert(&mut self, id: K, position: Position) {
        self.map.insert(id, position);
    }

    fn get(&self, id: K) -> Option<Position> {
        self.map.get(&id).copied()
    }

    fn remove(&mut self, id: K) -> Option<Position> {
        self.map.remove(&id)
    }

    fn clear(&mut self) {
        self.map.clear();
    }
}
