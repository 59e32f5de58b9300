//! Slot id allocation.
//!
//! The [`Allocator`] issues small opaque numeric ids, recycles released ones before growing,
//! and lets callers pin specific ids ahead of time so that a previously known id can be
//! recreated (e.g. when replaying persisted state).
//!
//! # Id lifecycle
//!
//! ```text
//!            generate()                 release()
//!  unissued ───────────────► live ───────────────────► released
//!     │                       ▲  ▲                        │
//!     │ reserve()             │  └──── generate() ────────┘
//!     ▼                       │
//!  reserved ──── create_at ───┘
//! ```
//!
//! Zero is never issued; it is the invalid sentinel of every id type.

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

use crate::ecs::error::{Result, StorageError};
use crate::ecs::storage::index::SparseId;

/// A numeric id type that an [`Allocator`] can issue.
pub trait SlotId: Copy + Eq + Hash + fmt::Debug {
    /// The largest raw value representable by this id type.
    const MAX: u32;

    /// Short name used in error messages.
    const NAME: &'static str;

    /// Construct from a raw value. Callers guarantee `raw <= Self::MAX`.
    fn from_raw(raw: u32) -> Self;

    /// The raw value of this id.
    fn raw(self) -> u32;
}

/// An opaque object identifier. Zero is the invalid sentinel.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(u32);

impl Id {
    /// The invalid id.
    pub const INVALID: Self = Self(0);

    /// Construct a new id from a raw value.
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw value of this id.
    #[inline]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Check whether this is a valid (non-zero) id.
    #[inline]
    pub const fn is_valid(&self) -> bool {
        self.0 != 0
    }
}

impl From<u32> for Id {
    #[inline]
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<Id> for u32 {
    #[inline]
    fn from(value: Id) -> Self {
        value.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl SlotId for Id {
    const MAX: u32 = u32::MAX;
    const NAME: &'static str = "Id";

    #[inline]
    fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    fn raw(self) -> u32 {
        self.0
    }
}

impl SparseId for Id {
    #[inline]
    fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Issues and recycles ids of type `I`.
///
/// Released ids are reused (last released first) before the high-water mark grows. Reserved
/// ids are skipped by growth until they are released.
#[derive(Debug, Clone)]
pub struct Allocator<I: SlotId = Id> {
    /// Highest raw value ever issued by growth.
    last_id: u32,

    /// Ids pinned by a caller that growth must skip.
    reserved: HashSet<u32>,

    /// Ids available for immediate reuse, most recently released last.
    released: Vec<u32>,

    /// Mirror of `released` for O(1) membership checks.
    released_set: HashSet<u32>,

    _marker: std::marker::PhantomData<I>,
}

impl<I: SlotId> Default for Allocator<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: SlotId> Allocator<I> {
    /// Construct an empty allocator. The first generated id is 1.
    pub fn new() -> Self {
        Self {
            last_id: 0,
            reserved: HashSet::new(),
            released: Vec::new(),
            released_set: HashSet::new(),
            _marker: std::marker::PhantomData,
        }
    }

    /// Issue an id that is not currently live.
    ///
    /// A released id is reused if one exists, otherwise the high-water mark grows, skipping
    /// (and un-pinning) every reserved value it passes.
    pub fn generate(&mut self) -> Result<I> {
        if let Some(raw) = self.released.pop() {
            self.released_set.remove(&raw);
            return Ok(I::from_raw(raw));
        }

        loop {
            if self.last_id >= I::MAX {
                return Err(StorageError::Exhausted(I::NAME));
            }
            self.last_id += 1;
            // A reserved value is already live through its reservation, skip it.
            if !self.reserved.remove(&self.last_id) {
                return Ok(I::from_raw(self.last_id));
            }
        }
    }

    /// Return a live (or reserved) id to circulation.
    ///
    /// A reserved id above the high-water mark is simply un-pinned; growth will issue it in
    /// turn. Any other live id is queued for reuse.
    pub fn release(&mut self, id: I) -> Result<()> {
        let raw = id.raw();
        if !self.is_live(id) {
            return Err(StorageError::NotLive(raw));
        }

        let was_reserved = self.reserved.remove(&raw);
        if !(was_reserved && raw > self.last_id) {
            self.released.push(raw);
            self.released_set.insert(raw);
        }
        Ok(())
    }

    /// Pin `id` so that [`generate`](Self::generate) never returns it until it is released.
    ///
    /// A released id is taken out of the reuse queue. An id above the high-water mark is
    /// recorded so growth skips it.
    pub fn reserve(&mut self, id: I) -> Result<()> {
        let raw = id.raw();
        if raw == 0 {
            return Err(StorageError::InvalidId(raw));
        }
        if self.reserved.contains(&raw) {
            return Err(StorageError::ReservationConflict(raw));
        }

        if raw > self.last_id {
            self.reserved.insert(raw);
        } else if self.released_set.remove(&raw) {
            self.released.retain(|r| *r != raw);
        } else {
            return Err(StorageError::DuplicateId(raw));
        }
        Ok(())
    }

    /// Check whether `id` is currently issued or reserved.
    pub fn is_live(&self, id: I) -> bool {
        let raw = id.raw();
        raw != 0
            && (self.reserved.contains(&raw)
                || (raw <= self.last_id && !self.released_set.contains(&raw)))
    }

    /// Check whether `id` is pinned by a reservation that growth has not passed yet.
    #[inline]
    pub fn is_reserved(&self, id: I) -> bool {
        self.reserved.contains(&id.raw())
    }

    /// Check whether `id` has ever been issued or reserved by this allocator.
    #[inline]
    pub fn was_issued(&self, id: I) -> bool {
        let raw = id.raw();
        raw != 0 && (raw <= self.last_id || self.reserved.contains(&raw))
    }

    /// The high-water mark.
    #[inline]
    pub fn last_id(&self) -> u32 {
        self.last_id
    }

    /// Number of ids waiting for reuse.
    #[inline]
    pub fn released_count(&self) -> usize {
        self.released.len()
    }

    /// Reset to the empty state.
    pub fn clear(&mut self) {
        self.last_id = 0;
        self.reserved.clear();
        self.released.clear();
        self.released_set.clear();
    }
}
