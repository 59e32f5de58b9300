use std::any::{Any, TypeId};
use std::cell::{Ref, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::ecs::{
    error::{Result, StorageError},
    object::Object,
    storage::{
        allocator::{Allocator, Id, SlotId},
        index::SparseId,
        position::Position,
        sparse::{DenseStore, Removed},
        weak::{self, WeakRef},
    },
};

/// Produces the value for a freshly allocated id.
pub type CreateFn<T, K> = Box<dyn FnMut(K) -> T>;

/// Finalizes a value just before it leaves the table.
pub type DestroyFn<T> = Box<dyn FnMut(&mut T)>;

/// A generation-checked reference to a table slot.
///
/// Ids are recycled, so a bare id may outlive its value and later name an unrelated one. A handle
/// additionally records the slot generation at the time it was issued and fails to resolve once
/// the slot has been vacated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle<K = Id> {
    id: K,
    generation: u32,
}

impl<K: Copy> Handle<K> {
    /// The id this handle refers to.
    #[inline]
    pub fn id(&self) -> K {
        self.id
    }

    /// The slot generation observed when the handle was issued.
    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// A table owns every value of one type, its id allocator and the weak references into it.
///
/// Values are kept packed in a [`DenseStore`], so iteration is a linear scan. Ids come from the
/// table's own [`Allocator`]; creation and destruction run the table's hooks:
///
/// ```text
///  create()  : allocator.generate() -> create_fn(id) -> store.insert(id, value)
///  remove(id): destroy_fn(value) -> allocator.release(id) -> store.remove(id)
///              -> patch weak references (target emptied, swapped value relocated)
/// ```
///
/// # Example Usage
///
/// ```rust,ignore
/// use strata_engine::ecs::storage::Table;
///
/// let mut table = Table::<String>::new();
/// let first = table.create_with(|_| "first".to_string()).unwrap();
/// let second = table.create_with(|_| "second".to_string()).unwrap();
///
/// let reference = table.weak_ref(second).unwrap();
/// table.remove(first).unwrap(); // `second` moves into the vacated position
///
/// assert_eq!(table.resolve(&reference).unwrap(), "second");
/// ```
///
/// # Invariants
/// - every id live in the allocator is present in the store and vice versa
/// - every registered weak reference points at the position of a live value
pub struct Table<T, K: SlotId + SparseId = Id> {
    objects: DenseStore<T, K>,
    ids: Allocator<K>,
    create_fn: CreateFn<T, K>,
    destroy_fn: DestroyFn<T>,
    weak: Rc<RefCell<weak::Registry>>,
    generations: HashMap<K, u32>,
}

impl<T: Default + 'static, K: SlotId + SparseId + 'static> Default for Table<T, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static, K: SlotId + SparseId + 'static> Table<T, K> {
    /// Construct an empty table creating values with `T::default()`.
    pub fn new() -> Self
    where
        T: Default,
    {
        Self::with_hooks(|_| T::default(), |_| {})
    }

    /// Construct an empty table with explicit create and destroy hooks.
    pub fn with_hooks(
        create: impl FnMut(K) -> T + 'static,
        destroy: impl FnMut(&mut T) + 'static,
    ) -> Self {
        Self {
            objects: DenseStore::new(),
            ids: Allocator::new(),
            create_fn: Box::new(create),
            destroy_fn: Box::new(destroy),
            weak: Rc::new(RefCell::new(weak::Registry::new())),
            generations: HashMap::new(),
        }
    }

    /// Replace the hook producing new values.
    pub fn set_create_fn(&mut self, create: impl FnMut(K) -> T + 'static) {
        self.create_fn = Box::new(create);
    }

    /// Replace the hook finalizing removed values.
    pub fn set_destroy_fn(&mut self, destroy: impl FnMut(&mut T) + 'static) {
        self.destroy_fn = Box::new(destroy);
    }
}

impl<T, K: SlotId + SparseId> Table<T, K> {
    /// Allocate an id and store the value produced by the create hook.
    pub fn create(&mut self) -> Result<K> {
        let id = self.ids.generate()?;
        let value = (self.create_fn)(id);
        self.objects.insert(id, value)?;
        Ok(id)
    }

    /// Allocate an id and store the value produced by `f`.
    pub fn create_with(&mut self, f: impl FnOnce(K) -> T) -> Result<K> {
        let id = self.ids.generate()?;
        self.objects.insert(id, f(id))?;
        Ok(id)
    }

    /// Recreate a specific id with the create hook.
    ///
    /// Fails with `DuplicateId` if the id is live and `InvalidId` for the zero id.
    pub fn create_at(&mut self, id: K) -> Result<()> {
        self.claim(id)?;
        let value = (self.create_fn)(id);
        self.objects.insert(id, value)?;
        Ok(())
    }

    /// Store `value` under a specific id.
    pub fn insert(&mut self, id: K, value: T) -> Result<()> {
        self.claim(id)?;
        self.objects.insert(id, value)?;
        Ok(())
    }

    fn claim(&mut self, id: K) -> Result<()> {
        if self.objects.contains(id) {
            return Err(StorageError::DuplicateId(id.raw()));
        }
        self.ids.reserve(id)
    }

    /// Run the destroy hook on the value and remove it.
    pub fn remove(&mut self, id: K) -> Result<()> {
        let value = self
            .objects
            .get_mut(id)
            .ok_or(StorageError::InvalidId(id.raw()))?;
        (self.destroy_fn)(value);
        self.evict(id)
    }

    /// Remove a value, finalizing it with `destroy` instead of the table's hook.
    pub fn remove_with(&mut self, id: K, destroy: impl FnOnce(&mut T)) -> Result<()> {
        let value = self
            .objects
            .get_mut(id)
            .ok_or(StorageError::InvalidId(id.raw()))?;
        destroy(value);
        self.evict(id)
    }

    fn evict(&mut self, id: K) -> Result<()> {
        self.ids.release(id)?;
        let Some(Removed {
            value,
            position,
            relocation,
        }) = self.objects.remove(id)
        else {
            return Err(StorageError::InvalidId(id.raw()));
        };

        let generation = self.generations.entry(id).or_default();
        *generation = generation.wrapping_add(1);

        {
            let mut weak = self.weak.borrow_mut();
            weak.detach(position);
            if let Some(relocation) = relocation {
                weak.relocate(relocation.from, relocation.to);
            }
        }

        // The value may own weak references into this table; drop it with the registry released.
        drop(value);
        Ok(())
    }

    /// Destroy every value with the destroy hook and reset the allocator.
    pub fn clear(&mut self) {
        for value in self.objects.iter_mut() {
            (self.destroy_fn)(value);
        }
        self.reset();
    }

    /// Destroy every value with `destroy` and reset the allocator.
    pub fn clear_with(&mut self, mut destroy: impl FnMut(&mut T)) {
        for value in self.objects.iter_mut() {
            destroy(value);
        }
        self.reset();
    }

    fn reset(&mut self) {
        for id in self.objects.indices() {
            let generation = self.generations.entry(*id).or_default();
            *generation = generation.wrapping_add(1);
        }
        self.ids.clear();
        self.weak.borrow_mut().clear();
        self.objects.clear();
    }

    /// Get the value stored under `id`.
    pub fn get(&self, id: K) -> Result<&T> {
        self.objects
            .get(id)
            .ok_or(StorageError::InvalidId(id.raw()))
    }

    /// Get the mutable value stored under `id`.
    pub fn get_mut(&mut self, id: K) -> Result<&mut T> {
        self.objects
            .get_mut(id)
            .ok_or(StorageError::InvalidId(id.raw()))
    }

    #[inline]
    pub fn contains(&self, id: K) -> bool {
        self.objects.contains(id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Pre-size the store for `additional` more values.
    pub fn reserve(&mut self, additional: usize) {
        self.objects.reserve(additional);
    }

    /// Number of values the table holds without reallocating.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.objects.capacity()
    }

    /// The id allocator of this table.
    #[inline]
    pub fn allocator(&self) -> &Allocator<K> {
        &self.ids
    }

    /// Visit every value in dense order.
    pub fn for_each(&self, mut f: impl FnMut(&T)) {
        self.objects.iter().for_each(|value| f(value));
    }

    /// Visit every value mutably in dense order.
    pub fn for_each_mut(&mut self, mut f: impl FnMut(&mut T)) {
        self.objects.iter_mut().for_each(|value| f(value));
    }

    /// Visit every `(id, value)` pair in dense order.
    pub fn for_each_id_value(&self, mut f: impl FnMut(K, &T)) {
        self.objects
            .iter_indexed()
            .for_each(|(id, value)| f(id, value));
    }

    /// Iterate `(id, value)` pairs in dense order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &T)> {
        self.objects.iter_indexed()
    }

    /// Iterate `(id, value)` pairs mutably in dense order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (K, &mut T)> {
        self.objects.iter_indexed_mut()
    }

    /// All live ids in dense order.
    pub fn indexes(&self) -> Vec<K> {
        self.objects.indices().to_vec()
    }

    /// The id at the front of the dense order.
    pub fn first(&self) -> Option<K> {
        self.objects.indices().first().copied()
    }

    /// Create a weak reference to the value stored under `id`.
    pub fn weak_ref(&self, id: K) -> Result<WeakRef<T>> {
        let position = self
            .objects
            .position(id)
            .ok_or(StorageError::InvalidId(id.raw()))?;
        Ok(WeakRef::new(&self.weak, position))
    }

    /// Point an existing weak reference at the value stored under `id`.
    ///
    /// The reference must be empty or issued by this table.
    pub fn retarget(&self, reference: &mut WeakRef<T>, id: K) -> Result<()> {
        if !reference.is_empty() && !reference.belongs_to(&self.weak) {
            return Err(StorageError::ForeignReference);
        }
        let position = self
            .objects
            .position(id)
            .ok_or(StorageError::InvalidId(id.raw()))?;
        reference.set(&self.weak, position);
        Ok(())
    }

    fn locate(&self, reference: &WeakRef<T>) -> Result<Position> {
        let Some(position) = reference.position() else {
            return Err(StorageError::StaleReference);
        };
        if !reference.belongs_to(&self.weak) {
            return Err(StorageError::ForeignReference);
        }
        Ok(position)
    }

    /// Dereference a weak reference issued by this table.
    pub fn resolve(&self, reference: &WeakRef<T>) -> Result<&T> {
        let position = self.locate(reference)?;
        self.objects
            .get_at(position)
            .ok_or(StorageError::StaleReference)
    }

    /// Mutably dereference a weak reference issued by this table.
    pub fn resolve_mut(&mut self, reference: &WeakRef<T>) -> Result<&mut T> {
        let position = self.locate(reference)?;
        self.objects
            .get_at_mut(position)
            .ok_or(StorageError::StaleReference)
    }

    /// The id currently referenced by a weak reference issued by this table.
    pub fn resolve_id(&self, reference: &WeakRef<T>) -> Result<K> {
        let position = self.locate(reference)?;
        self.objects
            .index_at(position)
            .ok_or(StorageError::StaleReference)
    }

    /// Inspect the weak reference registry of this table.
    pub fn weak_registry(&self) -> Ref<'_, weak::Registry> {
        self.weak.borrow()
    }

    /// Issue a generation-checked handle to the value stored under `id`.
    pub fn handle(&self, id: K) -> Result<Handle<K>> {
        if !self.objects.contains(id) {
            return Err(StorageError::InvalidId(id.raw()));
        }
        Ok(Handle {
            id,
            generation: self.generation(id),
        })
    }

    /// Get the value a handle refers to, failing if its slot was vacated since.
    pub fn get_by_handle(&self, handle: Handle<K>) -> Result<&T> {
        self.check_handle(handle)?;
        self.get(handle.id)
    }

    /// Mutable variant of [`get_by_handle`](Self::get_by_handle).
    pub fn get_mut_by_handle(&mut self, handle: Handle<K>) -> Result<&mut T> {
        self.check_handle(handle)?;
        self.get_mut(handle.id)
    }

    fn check_handle(&self, handle: Handle<K>) -> Result<()> {
        if self.generation(handle.id) != handle.generation {
            return Err(StorageError::StaleReference);
        }
        Ok(())
    }

    #[inline]
    fn generation(&self, id: K) -> u32 {
        self.generations.get(&id).copied().unwrap_or_default()
    }
}

impl<T, K: SlotId + SparseId> Drop for Table<T, K> {
    /// Every remaining value is finalized when the table goes away.
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T: fmt::Debug, K: SlotId + SparseId> fmt::Debug for Table<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("objects", &self.objects)
            .field("ids", &self.ids)
            .finish_non_exhaustive()
    }
}

/// Type-erased access to a [`Table`] keyed by [`Id`].
///
/// A class-keyed database owns one table per class without knowing the value types; values are
/// handed out as [`Object`]s.
pub trait ErasedTable: Any {
    fn create(&mut self) -> Result<Id>;

    fn create_at(&mut self, id: Id) -> Result<()>;

    fn remove(&mut self, id: Id) -> Result<()>;

    fn clear(&mut self);

    fn get(&self, id: Id) -> Result<&dyn Object>;

    fn get_mut(&mut self, id: Id) -> Result<&mut dyn Object>;

    fn contains(&self, id: Id) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn reserve(&mut self, additional: usize);

    fn indexes(&self) -> Vec<Id>;

    fn first(&self) -> Option<Id>;

    /// Visit every `(id, value)` pair in dense order.
    fn for_each(&self, f: &mut dyn FnMut(Id, &dyn Object));

    /// Visit every `(id, value)` pair mutably in dense order.
    fn for_each_mut(&mut self, f: &mut dyn FnMut(Id, &mut dyn Object));

    /// The [`TypeId`] of the stored values.
    fn value_type(&self) -> TypeId;

    fn value_type_name(&self) -> &'static str;

    /// View the concrete table for downcasting.
    fn as_table_any(&self) -> &dyn Any;

    /// View the mutable concrete table for downcasting.
    fn as_table_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: 'static> ErasedTable for Table<T, Id> {
    fn create(&mut self) -> Result<Id> {
        Table::create(self)
    }

    fn create_at(&mut self, id: Id) -> Result<()> {
        Table::create_at(self, id)
    }

    fn remove(&mut self, id: Id) -> Result<()> {
        Table::remove(self, id)
    }

    fn clear(&mut self) {
        Table::clear(self);
    }

    fn get(&self, id: Id) -> Result<&dyn Object> {
        Table::get(self, id).map(|value| value as &dyn Object)
    }

    fn get_mut(&mut self, id: Id) -> Result<&mut dyn Object> {
        Table::get_mut(self, id).map(|value| value as &mut dyn Object)
    }

    fn contains(&self, id: Id) -> bool {
        Table::contains(self, id)
    }

    fn len(&self) -> usize {
        Table::len(self)
    }

    fn reserve(&mut self, additional: usize) {
        Table::reserve(self, additional);
    }

    fn indexes(&self) -> Vec<Id> {
        Table::indexes(self)
    }

    fn first(&self) -> Option<Id> {
        Table::first(self)
    }

    fn for_each(&self, f: &mut dyn FnMut(Id, &dyn Object)) {
        for (id, value) in Table::iter(self) {
            f(id, value);
        }
    }

    fn for_each_mut(&mut self, f: &mut dyn FnMut(Id, &mut dyn Object)) {
        for (id, value) in Table::iter_mut(self) {
            f(id, value);
        }
    }

    fn value_type(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn value_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn as_table_any(&self) -> &dyn Any {
        self
    }

    fn as_table_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
