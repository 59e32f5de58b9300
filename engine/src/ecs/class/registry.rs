use std::{
    any::TypeId,
    sync::{Arc, PoisonError, RwLock},
};

use dashmap::DashMap;
use fixedbitset::FixedBitSet;
use log::debug;

use crate::ecs::{
    class::{ClassId, Descriptor, TableFactory, ValueType},
    error::{Result, StorageError},
    storage::{ErasedTable, Id, Table},
};

/// A thread-safe class registry, populated at startup and shared by every database.
///
/// Lookups by name and by Rust type are lock-free reads through `DashMap`. Descriptors live in
/// a vector behind an `RwLock`, indexed by [`ClassId`]; registration takes the write lock for
/// its whole duration so ids are handed out in registration order.
///
/// Why thread-safe?
/// - Databases are single threaded, but each thread may own its own databases and they all
///   need to agree on class ids.
pub struct Registry {
    /// Map from class name to id.
    names: DashMap<String, ClassId>,

    /// Map from the value type of a concrete class to its id.
    types: DashMap<TypeId, ClassId>,

    /// Registered descriptors, indexed by class id.
    classes: RwLock<Vec<Arc<Descriptor>>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create an empty class registry.
    #[inline]
    pub fn new() -> Self {
        Self {
            names: DashMap::new(),
            types: DashMap::new(),
            classes: RwLock::new(Vec::new()),
        }
    }

    /// Register a class without storage of its own, e.g. the root of a hierarchy.
    pub fn register_abstract(&self, name: &str, parent: Option<ClassId>) -> Result<ClassId> {
        self.insert(name, parent, None)
    }

    /// Register a concrete class whose values are created with `T::default()`.
    pub fn register<T: Default + 'static>(
        &self,
        name: &str,
        parent: Option<ClassId>,
    ) -> Result<ClassId> {
        self.register_with::<T>(name, parent, |_| T::default(), |_| {})
    }

    /// Register a concrete class with explicit create and destroy hooks.
    pub fn register_with<T: 'static>(
        &self,
        name: &str,
        parent: Option<ClassId>,
        create: fn(Id) -> T,
        destroy: fn(&mut T),
    ) -> Result<ClassId> {
        let factory: TableFactory = Arc::new(move || -> Box<dyn ErasedTable> {
            Box::new(Table::<T>::with_hooks(create, destroy))
        });
        let value = ValueType {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            factory,
        };
        self.insert(name, parent, Some(value))
    }

    fn insert(
        &self,
        name: &str,
        parent: Option<ClassId>,
        value: Option<ValueType>,
    ) -> Result<ClassId> {
        let mut classes = self.classes.write().unwrap_or_else(PoisonError::into_inner);

        if self.names.contains_key(name) {
            return Err(StorageError::DuplicateClass(name.to_string()));
        }
        if let Some(value) = &value
            && self.types.contains_key(&value.type_id)
        {
            return Err(StorageError::DuplicateClass(value.type_name.to_string()));
        }

        let id = ClassId::new(classes.len() as u32);
        let ancestors = match parent {
            Some(parent) => {
                let parent_class = classes
                    .get(parent.index())
                    .ok_or_else(|| StorageError::UnknownClass(parent.to_string()))?;
                let mut ancestors = parent_class.ancestors.clone();
                ancestors.grow(id.index() + 1);
                ancestors.insert(parent.index());
                ancestors
            }
            None => FixedBitSet::with_capacity(id.index() + 1),
        };

        if let Some(value) = &value {
            self.types.insert(value.type_id, id);
        }
        self.names.insert(name.to_string(), id);
        classes.push(Arc::new(Descriptor::new(
            id,
            name.to_string(),
            parent,
            ancestors,
            value,
        )));

        debug!("registered {} `{}` (parent {:?})", id, name, parent);
        Ok(id)
    }

    /// Get the descriptor of a class.
    pub fn get(&self, id: ClassId) -> Result<Arc<Descriptor>> {
        let classes = self.classes.read().unwrap_or_else(PoisonError::into_inner);
        classes
            .get(id.index())
            .cloned()
            .ok_or_else(|| StorageError::UnknownClass(id.to_string()))
    }

    /// Get the descriptor of the class registered under `name`.
    pub fn by_name(&self, name: &str) -> Result<Arc<Descriptor>> {
        let id = self
            .names
            .get(name)
            .map(|entry| *entry.value())
            .ok_or_else(|| StorageError::UnknownClass(name.to_string()))?;
        self.get(id)
    }

    /// Get the id of the class storing values of type `T`.
    #[inline]
    pub fn of<T: 'static>(&self) -> Result<ClassId> {
        self.types
            .get(&TypeId::of::<T>())
            .map(|entry| *entry.value())
            .ok_or(StorageError::UnregisteredType(std::any::type_name::<T>()))
    }

    /// Get the descriptor of the class storing values of type `T`.
    pub fn class_of<T: 'static>(&self) -> Result<Arc<Descriptor>> {
        self.get(self.of::<T>()?)
    }

    /// Number of registered classes.
    pub fn len(&self) -> usize {
        self.classes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every registered descriptor, in class id order.
    pub fn iter(&self) -> impl Iterator<Item = Arc<Descriptor>> {
        self.classes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .into_iter()
    }

    /// Every class that is `base` or descends from it, in class id order.
    pub fn descendants(&self, base: ClassId) -> Result<Vec<ClassId>> {
        let classes = self.classes.read().unwrap_or_else(PoisonError::into_inner);
        if base.index() >= classes.len() {
            return Err(StorageError::UnknownClass(base.to_string()));
        }
        Ok(classes
            .iter()
            .filter(|class| class.is_a(base))
            .map(|class| class.id())
            .collect())
    }

    /// Check whether `class` is `base` or descends from it.
    pub fn is_a(&self, class: ClassId, base: ClassId) -> Result<bool> {
        Ok(self.get(class)?.is_a(base))
    }

    /// Build an empty table for a concrete class.
    pub fn create_table(&self, id: ClassId) -> Result<Box<dyn ErasedTable>> {
        let class = self.get(id)?;
        let factory = class
            .factory()
            .ok_or_else(|| StorageError::AbstractClass(class.name().to_string()))?;
        Ok(factory())
    }
}
