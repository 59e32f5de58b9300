//! The class-keyed object database.
//!
//! An [`ObjectDatabase`] owns one [`Table`] per concrete class and creates it lazily, the first
//! time a value of that class is created. Values are reachable either through the class id and
//! the type-erased [`Object`] interface, or through their Rust type:
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use strata_engine::ecs::{class, database::ObjectDatabase};
//!
//! #[derive(Default)]
//! struct Mesh { vertices: u32 }
//!
//! let classes = Arc::new(class::Registry::new());
//! let object = classes.register_abstract("Object", None)?;
//! let mesh = classes.register::<Mesh>("Mesh", Some(object))?;
//!
//! let mut db = ObjectDatabase::new(Arc::clone(&classes));
//! let id = db.create(mesh)?;
//! db.get_mut_of::<Mesh>(id)?.vertices = 3;
//!
//! db.for_each_of_hierarchy(object, |class, id, value| {
//!     println!("{class} {id}: {}", value.type_name());
//! })?;
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{debug, warn};

use crate::ecs::{
    class::{self, ClassId},
    error::{Result, StorageError},
    object::Object,
    storage::{ErasedTable, Id, Table, WeakRef},
};

/// Database settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    initial_capacity: usize,
}

impl Config {
    /// Values reserved in every lazily created table.
    pub const DEFAULT_INITIAL_CAPACITY: usize = 1024;

    /// Set the number of values reserved in every lazily created table.
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    #[inline]
    pub fn initial_capacity(&self) -> usize {
        self.initial_capacity
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_capacity: Self::DEFAULT_INITIAL_CAPACITY,
        }
    }
}

/// Storage for objects of many classes, one table per class.
pub struct ObjectDatabase {
    classes: Arc<class::Registry>,
    tables: BTreeMap<ClassId, Box<dyn ErasedTable>>,
    config: Config,
}

impl ObjectDatabase {
    /// Construct an empty database over a class registry.
    pub fn new(classes: Arc<class::Registry>) -> Self {
        Self::with_config(classes, Config::default())
    }

    /// Construct an empty database with explicit settings.
    pub fn with_config(classes: Arc<class::Registry>, config: Config) -> Self {
        Self {
            classes,
            tables: BTreeMap::new(),
            config,
        }
    }

    /// The class registry this database was built over.
    #[inline]
    pub fn registry(&self) -> &Arc<class::Registry> {
        &self.classes
    }

    #[inline]
    pub fn initial_capacity(&self) -> usize {
        self.config.initial_capacity
    }

    /// Change the capacity reserved by tables created from now on.
    pub fn set_initial_capacity(&mut self, initial_capacity: usize) {
        self.config.initial_capacity = initial_capacity;
    }

    /// Get the table of `class`, creating it on first use.
    fn table_entry(&mut self, class: ClassId) -> Result<&mut dyn ErasedTable> {
        if !self.tables.contains_key(&class) {
            let mut table = self.classes.create_table(class)?;
            table.reserve(self.config.initial_capacity);
            debug!(
                "created table for {} ({}, capacity {})",
                class,
                table.value_type_name(),
                self.config.initial_capacity
            );
            self.tables.insert(class, table);
        }
        self.tables
            .get_mut(&class)
            .map(|table| &mut **table)
            .ok_or_else(|| StorageError::UnknownClass(class.to_string()))
    }

    /// Get the table of `class` if it exists. Unknown classes are an error.
    fn existing(&self, class: ClassId) -> Result<Option<&dyn ErasedTable>> {
        match self.tables.get(&class) {
            Some(table) => Ok(Some(&**table)),
            None => self.classes.get(class).map(|_| None),
        }
    }

    fn existing_mut(&mut self, class: ClassId) -> Result<Option<&mut dyn ErasedTable>> {
        if !self.tables.contains_key(&class) {
            self.classes.get(class)?;
        }
        Ok(self.tables.get_mut(&class).map(|table| &mut **table))
    }

    /// Create an object of `class` with the class's create hook.
    pub fn create(&mut self, class: ClassId) -> Result<Id> {
        self.table_entry(class)?.create()
    }

    /// Create an object of the class storing `T`.
    pub fn create_of<T: 'static>(&mut self) -> Result<Id> {
        let class = self.classes.of::<T>()?;
        self.create(class)
    }

    /// Recreate an object of `class` under a known id.
    pub fn create_at(&mut self, class: ClassId, id: Id) -> Result<()> {
        self.table_entry(class)?.create_at(id)
    }

    /// Get an object through the type-erased interface.
    pub fn get(&self, class: ClassId, id: Id) -> Result<&dyn Object> {
        self.existing(class)?
            .ok_or(StorageError::InvalidId(id.get()))?
            .get(id)
    }

    pub fn get_mut(&mut self, class: ClassId, id: Id) -> Result<&mut dyn Object> {
        self.existing_mut(class)?
            .ok_or(StorageError::InvalidId(id.get()))?
            .get_mut(id)
    }

    /// Get an object through its Rust type.
    pub fn get_of<T: 'static>(&self, id: Id) -> Result<&T> {
        self.table::<T>()?
            .ok_or(StorageError::InvalidId(id.get()))?
            .get(id)
    }

    /// Never creates the table of `T`; an id without one is `InvalidId`.
    pub fn get_mut_of<T: 'static>(&mut self, id: Id) -> Result<&mut T> {
        let class = self.classes.of::<T>()?;
        let table = self
            .existing_mut(class)?
            .ok_or(StorageError::InvalidId(id.get()))?;
        downcast_mut::<T>(table, class)?.get_mut(id)
    }

    /// Destroy an object with the class's destroy hook.
    pub fn remove(&mut self, class: ClassId, id: Id) -> Result<()> {
        let result = self
            .existing_mut(class)?
            .ok_or(StorageError::InvalidId(id.get()))
            .and_then(|table| table.remove(id));
        if let Err(error) = &result {
            warn!("cannot remove {} from {}: {}", id, class, error);
        }
        result
    }

    /// Check whether `class` holds an object under `id`.
    pub fn contains(&self, class: ClassId, id: Id) -> bool {
        self.tables
            .get(&class)
            .is_some_and(|table| table.contains(id))
    }

    /// Check whether the class storing `T` holds an object under `id`.
    pub fn contains_of<T: 'static>(&self, id: Id) -> bool {
        self.classes
            .of::<T>()
            .is_ok_and(|class| self.contains(class, id))
    }

    /// Check whether a table was ever created for `class`.
    #[inline]
    pub fn contains_class(&self, class: ClassId) -> bool {
        self.tables.contains_key(&class)
    }

    /// Number of objects of exactly `class`.
    pub fn count(&self, class: ClassId) -> Result<usize> {
        Ok(self.existing(class)?.map_or(0, |table| table.len()))
    }

    /// Total number of objects across every class.
    pub fn len(&self) -> usize {
        self.tables.values().map(|table| table.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids of every object of exactly `class`, in dense order.
    pub fn indexes(&self, class: ClassId) -> Result<Vec<Id>> {
        Ok(self
            .existing(class)?
            .map(|table| table.indexes())
            .unwrap_or_default())
    }

    /// The first object of exactly `class`, if any.
    pub fn first(&self, class: ClassId) -> Result<Option<Id>> {
        Ok(self.existing(class)?.and_then(|table| table.first()))
    }

    /// Visit every object of exactly `class`.
    pub fn for_each(&self, class: ClassId, mut f: impl FnMut(Id, &dyn Object)) -> Result<()> {
        if let Some(table) = self.existing(class)? {
            table.for_each(&mut f);
        }
        Ok(())
    }

    pub fn for_each_mut(
        &mut self,
        class: ClassId,
        mut f: impl FnMut(Id, &mut dyn Object),
    ) -> Result<()> {
        if let Some(table) = self.existing_mut(class)? {
            table.for_each_mut(&mut f);
        }
        Ok(())
    }

    /// Visit every object of the class storing `T`.
    pub fn for_each_of<T: 'static>(&self, mut f: impl FnMut(Id, &T)) -> Result<()> {
        if let Some(table) = self.table::<T>()? {
            table.for_each_id_value(|id, value| f(id, value));
        }
        Ok(())
    }

    /// Visit every object whose class is `base` or descends from it, class by class.
    pub fn for_each_of_hierarchy(
        &self,
        base: ClassId,
        mut f: impl FnMut(ClassId, Id, &dyn Object),
    ) -> Result<()> {
        for class in self.classes.descendants(base)? {
            if let Some(table) = self.tables.get(&class) {
                table.for_each(&mut |id, value| f(class, id, value));
            }
        }
        Ok(())
    }

    /// Classes that have a table, in class id order.
    pub fn classes(&self) -> Vec<ClassId> {
        self.tables.keys().copied().collect()
    }

    /// The concrete table storing `T`, `None` until the first `T` is created.
    pub fn table<T: 'static>(&self) -> Result<Option<&Table<T>>> {
        let class = self.classes.of::<T>()?;
        self.tables
            .get(&class)
            .map(|table| downcast::<T>(&**table, class))
            .transpose()
    }

    /// The concrete table storing `T`, created on first use.
    pub fn table_mut<T: 'static>(&mut self) -> Result<&mut Table<T>> {
        let class = self.classes.of::<T>()?;
        let table = self.table_entry(class)?;
        downcast_mut::<T>(table, class)
    }

    /// Create a weak reference to the `T` stored under `id`.
    pub fn weak_ref<T: 'static>(&self, id: Id) -> Result<WeakRef<T>> {
        self.table::<T>()?
            .ok_or(StorageError::InvalidId(id.get()))?
            .weak_ref(id)
    }

    /// Dereference a weak reference to a `T`.
    pub fn resolve<T: 'static>(&self, reference: &WeakRef<T>) -> Result<&T> {
        self.table::<T>()?
            .ok_or(StorageError::StaleReference)?
            .resolve(reference)
    }

    /// Destroy every object. Tables are kept and their allocators reset.
    pub fn clear(&mut self) {
        for table in self.tables.values_mut() {
            table.clear();
        }
    }
}

fn downcast<T: 'static>(table: &dyn ErasedTable, class: ClassId) -> Result<&Table<T>> {
    table
        .as_table_any()
        .downcast_ref::<Table<T>>()
        .ok_or_else(|| StorageError::ClassMismatch {
            class: class.to_string(),
            expected: std::any::type_name::<T>().to_string(),
        })
}

fn downcast_mut<T: 'static>(
    table: &mut dyn ErasedTable,
    class: ClassId,
) -> Result<&mut Table<T>> {
    table
        .as_table_any_mut()
        .downcast_mut::<Table<T>>()
        .ok_or_else(|| StorageError::ClassMismatch {
            class: class.to_string(),
            expected: std::any::type_name::<T>().to_string(),
        })
}
