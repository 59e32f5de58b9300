//! Non-owning references that survive relocation.
//!
//! A dense store moves values whenever it swap-removes. Anything that remembers where a value
//! lives must be told. The weak reference [`Registry`] indexes every live holder by the
//! [`Position`] it currently points at, and rewrites those holders when a value moves:
//!
//! ```text
//!  before remove(#1)                      after remove(#1)
//!  positions: [ #1 ][ #2 ][ #3 ]          positions: [ #3 ][ #2 ]
//!                            ▲                          ▲
//!  holders of #3 ────────────┘            holders of #3 ┘  (patched 2 -> 0)
//!  holders of #1 ──► [0]                  holders of #1 ──► empty (target destroyed)
//! ```
//!
//! Every registry is owned by exactly one table, there is no process-wide state. Holders are
//! [`WeakRef`]s; they register on creation and clone, unregister on drop and retarget, and are
//! only dereferenced through the table that issued them.
//!
//! The registry is single-threaded: it lives behind `Rc<RefCell<_>>` and is `!Send`.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::rc::{Rc, Weak};

use log::{trace, warn};

use crate::ecs::error::{Result, StorageError};
use crate::ecs::storage::position::Position;

/// Identity of one reference holder within a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HolderId(u64);

impl HolderId {
    /// Get the raw value of this holder id.
    #[inline]
    pub fn get(&self) -> u64 {
        self.0
    }
}

/// The shared cell through which a holder observes its target.
///
/// The registry keeps one strong handle per registered holder so it can patch the target in
/// place; the holder keeps the other.
#[derive(Debug)]
pub struct Link {
    holder: HolderId,
    target: Cell<Option<Position>>,
}

impl Link {
    fn new(holder: HolderId, target: Option<Position>) -> Self {
        Self {
            holder,
            target: Cell::new(target),
        }
    }

    /// The holder owning this link.
    #[inline]
    pub fn holder(&self) -> HolderId {
        self.holder
    }

    /// Where the holder currently points, `None` once the target is gone.
    #[inline]
    pub fn target(&self) -> Option<Position> {
        self.target.get()
    }
}

/// Index of all holders currently referencing each live position of one store.
#[derive(Debug, Default)]
pub struct Registry {
    instances: HashMap<Position, HashMap<HolderId, Rc<Link>>>,
    next_holder: u64,
}

impl Registry {
    /// Construct an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a link for a new holder pointing at `target`, registering it when set.
    pub fn link(&mut self, target: Option<Position>) -> Rc<Link> {
        self.next_holder += 1;
        let link = Rc::new(Link::new(HolderId(self.next_holder), target));
        self.register_instance(target, &link);
        link
    }

    /// Record that `link`'s holder points at `target`. No-op for an empty target.
    pub fn register_instance(&mut self, target: Option<Position>, link: &Rc<Link>) {
        let Some(position) = target else {
            return;
        };
        link.target.set(Some(position));
        self.instances
            .entry(position)
            .or_default()
            .insert(link.holder, Rc::clone(link));
    }

    /// Forget that `holder` points at `target`.
    ///
    /// Returns `StaleReference` if the holder is not registered there.
    pub fn unregister_instance(&mut self, target: Position, holder: HolderId) -> Result<()> {
        let holders = self
            .instances
            .get_mut(&target)
            .ok_or(StorageError::StaleReference)?;
        holders
            .remove(&holder)
            .ok_or(StorageError::StaleReference)?;
        if holders.is_empty() {
            self.instances.remove(&target);
        }
        Ok(())
    }

    /// Check whether any holder points at `target`.
    #[inline]
    pub fn is_instanced(&self, target: Position) -> bool {
        self.instances.contains_key(&target)
    }

    /// Holders currently pointing at `target`, in ascending order.
    pub fn instances(&self, target: Position) -> Vec<HolderId> {
        let mut holders: Vec<_> = self
            .instances
            .get(&target)
            .map(|holders| holders.keys().copied().collect())
            .unwrap_or_default();
        holders.sort_unstable();
        holders
    }

    /// A value moved from `from` to `to`: point every holder of `from` at `to`.
    ///
    /// `to` must not be instanced; the previous occupant is detached first.
    pub fn relocate(&mut self, from: Position, to: Position) {
        debug_assert!(!self.is_instanced(to), "relocating onto an instanced position");
        let Some(holders) = self.instances.remove(&from) else {
            return;
        };
        trace!(
            "patching {} weak reference(s) from {:?} to {:?}",
            holders.len(),
            from,
            to
        );
        for link in holders.values() {
            link.target.set(Some(to));
        }
        self.instances.insert(to, holders);
    }

    /// The value at `target` was destroyed: empty every holder pointing at it.
    ///
    /// Returns the number of holders detached.
    pub fn detach(&mut self, target: Position) -> usize {
        let Some(holders) = self.instances.remove(&target) else {
            return 0;
        };
        for link in holders.values() {
            link.target.set(None);
        }
        holders.len()
    }

    /// Detach every holder.
    pub fn clear(&mut self) {
        for (_, holders) in self.instances.drain() {
            for link in holders.values() {
                link.target.set(None);
            }
        }
    }

    /// Number of positions with at least one holder.
    #[inline]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Check whether no holder is registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Total number of registered holders.
    pub fn holder_count(&self) -> usize {
        self.instances.values().map(HashMap::len).sum()
    }
}

/// A non-owning reference to a value stored in a table.
///
/// The reference follows its target across relocations and becomes empty once the target is
/// removed. It is dereferenced through the issuing table (`Table::resolve`), which checks that
/// the reference belongs to it.
pub struct WeakRef<T> {
    link: Rc<Link>,
    registry: Weak<RefCell<Registry>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> WeakRef<T> {
    /// Construct an empty reference that belongs to no table.
    pub fn empty() -> Self {
        Self {
            link: Rc::new(Link::new(HolderId(0), None)),
            registry: Weak::new(),
            _marker: PhantomData,
        }
    }

    /// Create a reference registered in `registry` and pointing at `target`.
    pub(crate) fn new(registry: &Rc<RefCell<Registry>>, target: Position) -> Self {
        let link = registry.borrow_mut().link(Some(target));
        Self {
            link,
            registry: Rc::downgrade(registry),
            _marker: PhantomData,
        }
    }

    /// Check whether the reference no longer points at anything.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.link.target().is_none()
    }

    /// The position the reference currently points at.
    #[inline]
    pub fn position(&self) -> Option<Position> {
        self.link.target()
    }

    /// The holder identity of this reference.
    #[inline]
    pub fn holder(&self) -> HolderId {
        self.link.holder()
    }

    /// Check whether the reference was issued by the table owning `registry`.
    #[inline]
    pub(crate) fn belongs_to(&self, registry: &Rc<RefCell<Registry>>) -> bool {
        std::ptr::eq(self.registry.as_ptr(), Rc::as_ptr(registry))
    }

    /// Point the reference at `target` inside `registry`, unregistering the previous target.
    pub(crate) fn set(&mut self, registry: &Rc<RefCell<Registry>>, target: Position) {
        self.unregister();
        let link = registry.borrow_mut().link(Some(target));
        self.link = link;
        self.registry = Rc::downgrade(registry);
    }

    /// Remove this holder from its registry, if both are still alive.
    fn unregister(&self) {
        let Some(position) = self.link.target() else {
            return;
        };
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        match registry.try_borrow_mut() {
            Ok(mut registry) => {
                if registry
                    .unregister_instance(position, self.link.holder())
                    .is_err()
                {
                    warn!("weak reference {:?} was not registered", self.link.holder());
                }
            }
            Err(_) => warn!(
                "weak reference {:?} dropped while its registry is in use",
                self.link.holder()
            ),
        }
    }
}

impl<T> Default for WeakRef<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> Clone for WeakRef<T> {
    /// Clones register as a new holder of the same target.
    fn clone(&self) -> Self {
        match (self.link.target(), self.registry.upgrade()) {
            (Some(target), Some(registry)) => Self::new(&registry, target),
            _ => Self::empty(),
        }
    }
}

impl<T> Drop for WeakRef<T> {
    fn drop(&mut self) {
        self.unregister();
    }
}

impl<T> PartialEq for WeakRef<T> {
    /// References are equal when they point at the same position of the same table.
    fn eq(&self, other: &Self) -> bool {
        self.registry.ptr_eq(&other.registry) && self.position() == other.position()
    }
}

impl<T> fmt::Debug for WeakRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakRef")
            .field("holder", &self.link.holder())
            .field("target", &self.link.target())
            .finish()
    }
}
